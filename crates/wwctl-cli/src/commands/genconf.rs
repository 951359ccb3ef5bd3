//! `wwctl genconf`: emit configuration files from the resolved state.

use clap::{ArgMatches, Command, FromArgMatches, Subcommand};
use miette::Result;

use wwctl_util::errors::WwError;

use super::{Context, WwCommand};

pub struct Genconf;

#[derive(Subcommand, Debug)]
enum GenconfAction {
    /// Generate the warewulf configuration
    Warewulfconf {
        #[command(subcommand)]
        action: WarewulfconfAction,
    },
}

#[derive(Subcommand, Debug)]
enum WarewulfconfAction {
    /// Print the configuration in effect, including dynamic defaults
    Print,
}

impl WwCommand for Genconf {
    fn command(&self) -> Command {
        GenconfAction::augment_subcommands(
            Command::new("genconf")
                .about("Generate various configurations")
                .subcommand_required(true),
        )
    }

    fn exec(&self, matches: &ArgMatches, ctx: &Context<'_>) -> Result<()> {
        let action = GenconfAction::from_arg_matches(matches).map_err(|e| WwError::Generic {
            message: e.to_string(),
        })?;
        match action {
            GenconfAction::Warewulfconf {
                action: WarewulfconfAction::Print,
            } => {
                if !ctx.conf.initialized() {
                    tracing::debug!("Configuration not loaded from a file, printing defaults");
                }
                print!("{}", ctx.conf.to_toml()?);
                Ok(())
            }
        }
    }
}
