//! Environment variable lookup.
//!
//! Configuration resolution reads a single environment variable. Going
//! through [`EnvLookup`] instead of `std::env` directly lets callers supply a
//! fixed environment, which keeps resolution deterministic under test.

use std::ffi::OsString;

/// Read access to environment variables.
pub trait EnvLookup {
    /// Returns the raw value of `key`, or `None` if it is unset. Values are
    /// not required to be valid unicode.
    fn var(&self, key: &str) -> Option<OsString>;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, key: &str) -> Option<OsString> {
        std::env::var_os(key)
    }
}

impl<F> EnvLookup for F
where
    F: Fn(&str) -> Option<OsString>,
{
    fn var(&self, key: &str) -> Option<OsString> {
        self(key)
    }
}
