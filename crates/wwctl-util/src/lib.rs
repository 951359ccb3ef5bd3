//! Shared utilities for wwctl.
//!
//! This crate provides the cross-cutting concerns used by the other wwctl
//! crates: the unified error type, log levels with the process logging sink,
//! and the environment lookup seam used during configuration resolution.

pub mod env;
pub mod errors;
pub mod log;
