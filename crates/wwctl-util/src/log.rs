//! Log levels and the process logging sink.
//!
//! wwctl speaks in numeric log levels (lower is chattier). The effective level
//! is chosen once per invocation by [`select_level`] and pushed into a
//! [`LogSink`]; the production sink is [`TracingSink`], which drives a
//! reloadable `tracing` level filter.
//!
//! VERBOSE enables `debug!` events; DEBUG additionally enables `trace!`
//! events, which is where debug-only detail is emitted.

use std::fmt;
use std::io::IsTerminal;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, Registry};

/// A numeric log level.
///
/// The named constants cover the levels wwctl uses itself, but any integer is
/// a valid level: values given with `--loglevel` are passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogLevel(i32);

impl LogLevel {
    pub const DEBUG: Self = Self(10);
    pub const VERBOSE: Self = Self(15);
    pub const INFO: Self = Self(20);
    pub const WARN: Self = Self(30);
    pub const ERROR: Self = Self(40);
    pub const CRITICAL: Self = Self(50);

    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i32 {
        self.0
    }

    /// The level's name, if it is one of the named constants.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::DEBUG => Some("DEBUG"),
            Self::VERBOSE => Some("VERBOSE"),
            Self::INFO => Some("INFO"),
            Self::WARN => Some("WARN"),
            Self::ERROR => Some("ERROR"),
            Self::CRITICAL => Some("CRITICAL"),
            _ => None,
        }
    }

    /// Map onto the nearest `tracing` filter. Anything at or below DEBUG
    /// enables trace events; anything above WARN shows errors only.
    pub fn to_level_filter(self) -> LevelFilter {
        match self.0 {
            v if v <= Self::DEBUG.0 => LevelFilter::TRACE,
            v if v <= Self::VERBOSE.0 => LevelFilter::DEBUG,
            v if v <= Self::INFO.0 => LevelFilter::INFO,
            v if v <= Self::WARN.0 => LevelFilter::WARN,
            _ => LevelFilter::ERROR,
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::INFO
    }
}

impl From<i32> for LogLevel {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Pick the effective level from the verbosity flags.
///
/// `debug` beats `verbose`, which beats the INFO default. An explicit
/// `loglevel` that differs from INFO then replaces that choice, even when it
/// is less verbose than what the boolean flags asked for.
pub fn select_level(debug: bool, verbose: bool, loglevel: LogLevel) -> LogLevel {
    let mut level = if debug {
        LogLevel::DEBUG
    } else if verbose {
        LogLevel::VERBOSE
    } else {
        LogLevel::INFO
    };
    if loglevel != LogLevel::INFO {
        level = loglevel;
    }
    level
}

/// Holds the process-wide effective log level.
pub trait LogSink {
    fn set_level(&mut self, level: LogLevel);
    fn level(&self) -> LogLevel;
}

/// [`LogSink`] backed by the global `tracing` subscriber.
pub struct TracingSink {
    handle: reload::Handle<LevelFilter, Registry>,
    level: LogLevel,
}

impl TracingSink {
    /// Install the global subscriber, writing to stderr at INFO, and return
    /// the sink that controls its level.
    ///
    /// Must be called at most once per process.
    pub fn init() -> Self {
        let (filter, handle) = reload::Layer::new(LogLevel::INFO.to_level_filter());
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(std::io::stderr().is_terminal())
                    .with_target(false)
                    .without_time(),
            )
            .init();
        Self {
            handle,
            level: LogLevel::INFO,
        }
    }
}

impl LogSink for TracingSink {
    fn set_level(&mut self, level: LogLevel) {
        if let Err(e) = self.handle.modify(|filter| *filter = level.to_level_filter()) {
            eprintln!("Failed to update log level to {level}: {e}");
            return;
        }
        self.level = level;
        tracing::trace!("Log level set to {level}");
    }

    fn level(&self) -> LogLevel {
        self.level
    }
}
