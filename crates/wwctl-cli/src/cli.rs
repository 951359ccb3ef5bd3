//! Root command and the flags shared by every subcommand.
//!
//! The global flags are defined once with `clap` derive and attached to the
//! root as `global` arguments, so they are accepted before or after any
//! subcommand name. Flags that work but are not advertised carry `hide = true`.

use std::ffi::OsString;

use clap::{Args, Command};

use wwctl_util::log::LogLevel;

/// Flags accepted by every wwctl command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct GlobalFlags {
    /// Run with increased verbosity.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run with debugging messages enabled.
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Set log level to the given number
    #[arg(
        long,
        global = true,
        hide = true,
        default_value_t = LogLevel::INFO.value(),
        allow_negative_numbers = true
    )]
    pub loglevel: i32,

    /// Set the warewulf configuration file
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        default_value = "",
        hide_default_value = true
    )]
    pub warewulfconf: OsString,

    /// Allow empty configuration
    #[arg(long, global = true, hide = true)]
    pub emptyconf: bool,
}

impl GlobalFlags {
    pub fn log_level(&self) -> LogLevel {
        LogLevel::new(self.loglevel)
    }
}

impl Default for GlobalFlags {
    fn default() -> Self {
        Self {
            verbose: false,
            debug: false,
            loglevel: LogLevel::INFO.value(),
            warewulfconf: OsString::new(),
            emptyconf: false,
        }
    }
}

/// The bare root command with the global flags and no subcommands.
pub fn root_command() -> Command {
    let root = Command::new("wwctl")
        .about("Warewulf Control")
        .long_about("Control interface to the Warewulf Cluster Provisioning System.")
        .override_usage("wwctl COMMAND [OPTIONS]")
        .subcommand_required(true)
        .arg_required_else_help(true);
    GlobalFlags::augment_args(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::FromArgMatches;

    fn parse(args: &[&str]) -> GlobalFlags {
        let root = root_command().subcommand(Command::new("version"));
        let matches = root.try_get_matches_from(args).unwrap();
        GlobalFlags::from_arg_matches(&matches).unwrap()
    }

    #[test]
    fn defaults_when_no_flags_given() {
        assert_eq!(parse(&["wwctl", "version"]), GlobalFlags::default());
    }

    #[test]
    fn short_and_long_flags() {
        let flags = parse(&["wwctl", "-v", "--debug", "version"]);
        assert!(flags.verbose);
        assert!(flags.debug);

        let flags = parse(&["wwctl", "-d", "version"]);
        assert!(flags.debug);
        assert!(!flags.verbose);
    }

    #[test]
    fn flags_accepted_after_subcommand() {
        let flags = parse(&[
            "wwctl",
            "version",
            "--warewulfconf",
            "/tmp/ww.conf",
            "--emptyconf",
            "--loglevel",
            "7",
        ]);
        assert_eq!(flags.warewulfconf, "/tmp/ww.conf");
        assert!(flags.emptyconf);
        assert_eq!(flags.log_level(), LogLevel::new(7));
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_config_path_is_accepted() {
        use std::os::unix::ffi::OsStringExt;

        let path = OsString::from_vec(b"/tmp/ww\xff.conf".to_vec());
        let root = root_command().subcommand(Command::new("version"));
        let matches = root
            .try_get_matches_from([
                OsString::from("wwctl"),
                OsString::from("--warewulfconf"),
                path.clone(),
                OsString::from("version"),
            ])
            .unwrap();
        let flags = GlobalFlags::from_arg_matches(&matches).unwrap();
        assert_eq!(flags.warewulfconf, path);
    }

    #[test]
    fn negative_loglevel_passes_through() {
        let flags = parse(&["wwctl", "--loglevel", "-5", "version"]);
        assert_eq!(flags.loglevel, -5);
    }

    #[test]
    fn non_numeric_loglevel_is_rejected() {
        let root = root_command().subcommand(Command::new("version"));
        assert!(root
            .try_get_matches_from(["wwctl", "--loglevel", "loud", "version"])
            .is_err());
    }

    #[test]
    fn hidden_flags_are_not_advertised() {
        let root = root_command();
        let hidden: Vec<&str> = root
            .get_arguments()
            .filter(|a| a.is_hide_set())
            .map(|a| a.get_id().as_str())
            .collect();
        assert_eq!(hidden, vec!["loglevel", "emptyconf"]);

        let help = root_command().render_long_help().to_string();
        assert!(help.contains("--warewulfconf"), "got: {help}");
        assert!(help.contains("--verbose"), "got: {help}");
        assert!(!help.contains("--loglevel"), "got: {help}");
        assert!(!help.contains("--emptyconf"), "got: {help}");
    }
}
