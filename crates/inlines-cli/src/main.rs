use std::path::Path;
use std::process::ExitCode;

use inlines_cli::command::{CommandRegistry, SETTINGS_ARG};
use inlines_cli::commands::register_builtin_commands;
use inlines_core::logging::setup_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);
    let matches = registry.build_cli().get_matches();

    let settings_path = matches.get_one::<String>(SETTINGS_ARG).map(Path::new);
    let settings = match inlines_cli::load_settings(settings_path) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("inlines: {err}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&settings);

    match registry.execute(&matches, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "command failed");
            eprintln!("inlines: {err}");
            ExitCode::FAILURE
        }
    }
}
