//! Management command framework for the `inlines` binary.
//!
//! [`ManagementCommand`] defines one subcommand; [`CommandRegistry`] collects
//! them, builds the clap interface, and dispatches parsed arguments.
//!
//! ## Defining a Custom Command
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use inlines_cli::command::ManagementCommand;
//! use inlines_core::{InlinesError, Settings};
//!
//! struct DefaultsCommand;
//!
//! #[async_trait]
//! impl ManagementCommand for DefaultsCommand {
//!     fn name(&self) -> &str { "defaults" }
//!     fn help(&self) -> &str { "Print the inline defaults" }
//!
//!     async fn handle(
//!         &self,
//!         _matches: &clap::ArgMatches,
//!         settings: &Settings,
//!     ) -> Result<(), InlinesError> {
//!         println!("{:?}", settings.inlines);
//!         Ok(())
//!     }
//! }
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use inlines_core::{InlinesError, Settings};

/// Name of the global option pointing at a settings file.
pub const SETTINGS_ARG: &str = "settings";

/// A subcommand of the `inlines` binary.
#[async_trait]
pub trait ManagementCommand: Send + Sync {
    /// Returns the name used to invoke the command.
    fn name(&self) -> &str;

    /// Returns a short help description.
    fn help(&self) -> &str;

    /// Adds arguments to the clap command. The default adds none.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Runs the command.
    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> Result<(), InlinesError>;
}

/// The registered commands, keyed by name.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn ManagementCommand>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Registers a command, replacing any command of the same name.
    pub fn register(&mut self, command: Box<dyn ManagementCommand>) {
        let name = command.name().to_string();
        self.commands.insert(name, command);
    }

    /// Returns the command with the given name.
    pub fn get(&self, name: &str) -> Option<&dyn ManagementCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Returns the registered command names, sorted.
    pub fn list_commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds the top-level clap command with one subcommand per entry and
    /// a global `--settings <FILE>` option.
    pub fn build_cli(&self) -> clap::Command {
        let mut app = clap::Command::new("inlines")
            .about("admin-inlines management utility")
            .subcommand_required(true)
            .arg(
                clap::Arg::new(SETTINGS_ARG)
                    .long(SETTINGS_ARG)
                    .global(true)
                    .value_name("FILE")
                    .help("Settings file (.toml or .json); INLINES_* variables still apply"),
            );

        let mut entries: Vec<_> = self.commands.iter().collect();
        entries.sort_by_key(|(name, _)| (*name).clone());

        for (name, cmd) in entries {
            // clap wants `&'static str` names; commands are registered once at startup.
            let static_name: &'static str = Box::leak(name.clone().into_boxed_str());
            let subcmd = clap::Command::new(static_name).about(cmd.help().to_string());
            app = app.subcommand(cmd.add_arguments(subcmd));
        }

        app
    }

    /// Dispatches to the subcommand named in `matches`.
    ///
    /// # Errors
    ///
    /// Returns [`InlinesError::ConfigurationError`] when no known subcommand
    /// was given, or whatever the command itself returns.
    pub async fn execute(&self, matches: &clap::ArgMatches, settings: &Settings) -> Result<(), InlinesError> {
        let (name, sub_matches) = matches
            .subcommand()
            .ok_or_else(|| InlinesError::ConfigurationError("No subcommand specified".to_string()))?;

        let cmd = self
            .get(name)
            .ok_or_else(|| InlinesError::ConfigurationError(format!("Unknown command: {name}")))?;

        tracing::debug!(command = name, "running command");
        cmd.handle(sub_matches, settings).await
    }
}
