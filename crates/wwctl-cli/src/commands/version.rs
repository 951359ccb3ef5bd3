use clap::{ArgMatches, Command};
use miette::Result;

use super::{Context, WwCommand};

pub struct Version;

impl WwCommand for Version {
    fn command(&self) -> Command {
        Command::new("version")
            .about("Version information")
            .long_about("This command will print the installed version of wwctl.")
    }

    fn exec(&self, _matches: &ArgMatches, ctx: &Context<'_>) -> Result<()> {
        tracing::trace!("Running with log level {}", ctx.log_level);
        println!("wwctl version:\t{}", env!("CARGO_PKG_VERSION"));
        Ok(())
    }
}
