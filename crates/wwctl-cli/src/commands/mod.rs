//! Command dispatch, the pre-execution hook, and the built-in handlers.

pub mod genconf;
pub mod version;

use std::ffi::OsString;

use clap::{ArgMatches, Command, FromArgMatches};
use miette::Result;

use wwctl_core::config::WarewulfConf;
use wwctl_core::resolve::ConfigResolver;
use wwctl_util::env::EnvLookup;
use wwctl_util::errors::WwError;
use wwctl_util::log::{select_level, LogLevel, LogSink};

use crate::cli::GlobalFlags;
use crate::registry::CommandRegistry;

/// State resolved before a command runs.
pub struct Context<'a> {
    pub conf: &'a WarewulfConf,
    pub log_level: LogLevel,
}

/// A subtree that can be attached under the root command.
pub trait WwCommand {
    /// The clap definition of this subtree. Its name must be unique among
    /// the root's children.
    fn command(&self) -> Command;

    /// Run the command with the matches for this subtree.
    fn exec(&self, matches: &ArgMatches, ctx: &Context<'_>) -> Result<()>;
}

/// Every subcommand attached to the root, in help-listing order.
pub fn registered() -> Vec<Box<dyn WwCommand>> {
    vec![Box::new(genconf::Genconf), Box::new(version::Version)]
}

/// Select the effective log level, then bring the configuration into a
/// usable state. Always in that order.
pub fn pre_run<E: EnvLookup>(
    flags: &GlobalFlags,
    sink: &mut dyn LogSink,
    resolver: &ConfigResolver<E>,
    conf: &mut WarewulfConf,
) -> Result<()> {
    sink.set_level(select_level(flags.debug, flags.verbose, flags.log_level()));
    resolver.resolve(conf, flags.emptyconf, &flags.warewulfconf)?;
    Ok(())
}

/// Parse `args`, run [`pre_run`], then hand off to the matched command.
///
/// Malformed arguments and `--help` are handled by clap, which prints usage
/// and exits. A failing hook is returned without running the command.
pub fn dispatch<I, T, E>(
    registry: &CommandRegistry,
    args: I,
    sink: &mut dyn LogSink,
    resolver: &ConfigResolver<E>,
    conf: &mut WarewulfConf,
) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    E: EnvLookup,
{
    let matches = registry.root().clone().get_matches_from(args);
    let flags = GlobalFlags::from_arg_matches(&matches).map_err(|e| WwError::Generic {
        message: e.to_string(),
    })?;

    pre_run(&flags, sink, resolver, conf)?;

    let (name, sub_matches) = matches.subcommand().ok_or_else(|| WwError::Generic {
        message: "No command given".to_string(),
    })?;
    let handler = registry.handler(name).ok_or_else(|| WwError::Generic {
        message: format!(
            "Unknown command '{name}' (registered: {})",
            registry.names().collect::<Vec<_>>().join(", ")
        ),
    })?;

    let ctx = Context {
        conf,
        log_level: sink.level(),
    };
    handler.exec(sub_matches, &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordingSink {
        levels: Vec<LogLevel>,
    }

    impl LogSink for RecordingSink {
        fn set_level(&mut self, level: LogLevel) {
            self.levels.push(level);
        }

        fn level(&self) -> LogLevel {
            self.levels.last().copied().unwrap_or_default()
        }
    }

    /// Records the context of every run.
    #[derive(Clone, Default)]
    struct Recorder {
        runs: Rc<RefCell<Vec<(LogLevel, bool)>>>,
    }

    impl WwCommand for Recorder {
        fn command(&self) -> Command {
            Command::new("record")
        }

        fn exec(&self, _matches: &ArgMatches, ctx: &Context<'_>) -> Result<()> {
            self.runs
                .borrow_mut()
                .push((ctx.log_level, ctx.conf.initialized()));
            Ok(())
        }
    }

    type EnvFn = fn(&str) -> Option<OsString>;

    fn no_env(_: &str) -> Option<OsString> {
        None
    }

    fn resolver_with_default(path: &std::path::Path) -> ConfigResolver<EnvFn> {
        ConfigResolver::with_default_path(no_env as EnvFn, path)
    }

    fn missing_default() -> ConfigResolver<EnvFn> {
        resolver_with_default(std::path::Path::new("/nonexistent/warewulf.conf"))
    }

    fn run(
        args: &[&str],
        conf_path: Option<&std::path::Path>,
    ) -> (Result<()>, Recorder, RecordingSink) {
        let recorder = Recorder::default();
        let registry = CommandRegistry::with_commands(vec![Box::new(recorder.clone())]).unwrap();
        let mut sink = RecordingSink::default();
        let mut conf = WarewulfConf::new();
        let resolver = match conf_path {
            Some(path) => resolver_with_default(path),
            None => missing_default(),
        };
        let result = dispatch(&registry, args, &mut sink, &resolver, &mut conf);
        (result, recorder, sink)
    }

    #[test]
    fn verbose_only_selects_verbose() {
        let (result, recorder, sink) = run(&["wwctl", "--emptyconf", "-v", "record"], None);
        result.unwrap();
        assert_eq!(sink.levels, vec![LogLevel::VERBOSE]);
        assert_eq!(recorder.runs.borrow().as_slice(), [(LogLevel::VERBOSE, false)]);
    }

    #[test]
    fn numeric_loglevel_overrides_debug_and_verbose() {
        let (result, recorder, _) = run(
            &["wwctl", "--emptyconf", "-d", "-v", "--loglevel", "7", "record"],
            None,
        );
        result.unwrap();
        assert_eq!(recorder.runs.borrow()[0].0, LogLevel::new(7));
    }

    #[test]
    fn hook_failure_skips_command() {
        let (result, recorder, sink) = run(&["wwctl", "record"], None);
        let err = result.unwrap_err();
        assert!(
            err.to_string().contains("/nonexistent/warewulf.conf"),
            "got: {err}"
        );
        assert!(recorder.runs.borrow().is_empty());
        assert_eq!(sink.levels, vec![LogLevel::INFO], "log level is set before loading");
    }

    #[test]
    fn emptyconf_runs_without_reading_a_file() {
        let (result, recorder, _) = run(&["wwctl", "record", "--emptyconf"], None);
        result.unwrap();
        assert_eq!(recorder.runs.borrow().as_slice(), [(LogLevel::INFO, false)]);
    }

    #[test]
    fn loaded_config_is_initialized_for_the_command() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("warewulf.conf");
        std::fs::write(&path, "ipaddr = \"10.0.0.1\"\n").unwrap();

        let (result, recorder, _) = run(&["wwctl", "record"], Some(&path));
        result.unwrap();
        assert_eq!(recorder.runs.borrow().as_slice(), [(LogLevel::INFO, true)]);
    }

    #[test]
    fn pre_run_twice_with_emptyconf_is_stable() {
        let flags = GlobalFlags {
            emptyconf: true,
            ..Default::default()
        };
        let mut sink = RecordingSink::default();
        let resolver = missing_default();
        let mut conf = WarewulfConf::new();
        conf.ipaddr = Some("10.0.0.1".parse().unwrap());

        pre_run(&flags, &mut sink, &resolver, &mut conf).unwrap();
        let first = conf.clone();
        pre_run(&flags, &mut sink, &resolver, &mut conf).unwrap();

        assert_eq!(conf, first);
        assert_eq!(sink.levels, vec![LogLevel::INFO, LogLevel::INFO]);
    }
}
