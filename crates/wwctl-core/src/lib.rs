//! Core types for wwctl.
//!
//! This crate defines the warewulf configuration ([`config::WarewulfConf`]),
//! the dynamic defaults computed from the running host, and the resolver that
//! decides before every command whether and from where the configuration is
//! loaded.
//!
//! This crate is intentionally free of CLI parsing and logging setup.

/// Well-known location of the warewulf configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "/etc/warewulf/warewulf.conf";

/// Environment variable that overrides [`DEFAULT_CONFIG_FILE`].
pub const CONFIG_ENV_VAR: &str = "WAREWULFCONF";

pub mod config;
pub mod resolve;
