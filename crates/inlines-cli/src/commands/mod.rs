//! Built-in management commands.
//!
//! Each command implements
//! [`ManagementCommand`](crate::command::ManagementCommand).

pub mod check;
pub mod simulate;

pub use check::CheckCommand;
pub use simulate::SimulateCommand;

use crate::command::CommandRegistry;

/// Registers all built-in commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(SimulateCommand));
    registry.register(Box::new(CheckCommand));
}
