//! Decide whether and from where the configuration is loaded.
//!
//! Runs once per invocation, before any command body. When an empty
//! configuration is acceptable, or the configuration is already initialized,
//! only dynamic defaults are applied. Otherwise exactly one file is read,
//! chosen from the first non-empty of: the `--warewulfconf` value, the
//! `WAREWULFCONF` environment variable, the built-in default path.

use std::ffi::OsStr;
use std::path::PathBuf;

use wwctl_util::env::EnvLookup;

use crate::config::ConfigStore;
use crate::{CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE};

/// What the resolver did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No file was read; dynamic defaults were applied.
    Defaults,
    /// The configuration was loaded from this path.
    Loaded(PathBuf),
}

/// Resolves the configuration source for a single invocation.
pub struct ConfigResolver<E> {
    env: E,
    default_path: PathBuf,
}

impl<E: EnvLookup> ConfigResolver<E> {
    /// A resolver falling back to [`DEFAULT_CONFIG_FILE`].
    pub fn new(env: E) -> Self {
        Self::with_default_path(env, DEFAULT_CONFIG_FILE)
    }

    pub fn with_default_path(env: E, default_path: impl Into<PathBuf>) -> Self {
        Self {
            env,
            default_path: default_path.into(),
        }
    }

    /// The path a load would use. Later sources are only consulted when every
    /// earlier one is empty.
    pub fn source_path(&self, path_override: impl AsRef<OsStr>) -> PathBuf {
        let path_override = path_override.as_ref();
        if !path_override.is_empty() {
            return PathBuf::from(path_override);
        }
        if let Some(path) = self.env.var(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
            return PathBuf::from(path);
        }
        self.default_path.clone()
    }

    /// Bring `conf` into a usable state.
    ///
    /// A failed load is returned as-is; there is no fallback to defaults.
    pub fn resolve<S>(
        &self,
        conf: &mut S,
        allow_empty: bool,
        path_override: impl AsRef<OsStr>,
    ) -> miette::Result<Resolution>
    where
        S: ConfigStore + ?Sized,
    {
        if allow_empty || conf.is_initialized() {
            conf.set_dynamic_defaults()?;
            return Ok(Resolution::Defaults);
        }

        let path = self.source_path(path_override);
        tracing::debug!("Reading configuration from {}", path.display());
        conf.read_conf(&path)?;
        Ok(Resolution::Loaded(path))
    }
}
