//! wwctl binary.
//!
//! This is the entry point for the `wwctl` command-line tool. It installs the
//! `tracing` subscriber, builds the command tree, and dispatches the
//! invocation. Errors are rendered by `miette` without usage text.

mod cli;
mod commands;
mod registry;

use miette::Result;

use wwctl_core::config::WarewulfConf;
use wwctl_core::resolve::ConfigResolver;
use wwctl_util::env::ProcessEnv;
use wwctl_util::log::TracingSink;

use crate::registry::CommandRegistry;

fn main() -> Result<()> {
    let mut sink = TracingSink::init();
    let registry = CommandRegistry::build_root()?;
    let resolver = ConfigResolver::new(ProcessEnv);
    let mut conf = WarewulfConf::new();

    commands::dispatch(&registry, std::env::args_os(), &mut sink, &resolver, &mut conf)
}
