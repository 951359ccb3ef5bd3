//! Assembly of the command tree.

use clap::Command;

use wwctl_util::errors::WwError;

use crate::cli::root_command;
use crate::commands::{self, WwCommand};

/// The root command together with the handler for each top-level subcommand.
pub struct CommandRegistry {
    root: Command,
    handlers: Vec<(String, Box<dyn WwCommand>)>,
}

impl CommandRegistry {
    /// Build the full wwctl tree from [`commands::registered`].
    pub fn build_root() -> miette::Result<Self> {
        Self::with_commands(commands::registered())
    }

    /// Attach each command under the root, in order. A name registered twice
    /// is a wiring mistake and fails the whole build.
    pub fn with_commands(commands: Vec<Box<dyn WwCommand>>) -> miette::Result<Self> {
        let mut root = root_command();
        let mut handlers: Vec<(String, Box<dyn WwCommand>)> = Vec::with_capacity(commands.len());

        for handler in commands {
            let command = handler.command();
            let name = command.get_name().to_string();
            if handlers.iter().any(|(existing, _)| *existing == name) {
                return Err(WwError::Registration {
                    message: format!("subcommand '{name}' is registered more than once"),
                }
                .into());
            }
            root = root.subcommand(command);
            handlers.push((name, handler));
        }

        Ok(Self { root, handlers })
    }

    pub fn root(&self) -> &Command {
        &self.root
    }

    /// The handler registered under `name`.
    pub fn handler(&self, name: &str) -> Option<&dyn WwCommand> {
        self.handlers
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, handler)| handler.as_ref())
    }

    /// Registered subcommand names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|(name, _)| name.as_str())
    }
}
