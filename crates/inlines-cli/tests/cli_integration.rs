//! Integration tests for the `inlines` command registry and settings files.

use std::io::Write;

use inlines_cli::command::CommandRegistry;
use inlines_cli::commands::register_builtin_commands;
use inlines_cli::commands::simulate::{simulate, SimulationPlan};
use inlines_cli::load_settings;

fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);
    registry
}

fn settings_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_builtin_commands_registered() {
    assert_eq!(registry().list_commands(), vec!["check", "simulate"]);
}

#[test]
fn test_load_settings_from_toml() {
    let file = settings_file(
        r#"
debug = false

[inlines]
add_text = "Add row"
transition_ms = 0
"#,
    );
    let settings = load_settings(Some(file.path())).unwrap();
    assert!(!settings.debug);
    assert_eq!(settings.inlines.add_text, "Add row");
    assert_eq!(settings.inlines.transition_ms, 0);
    assert_eq!(settings.inlines.delete_text, "Remove");
}

#[tokio::test]
async fn test_check_command_with_bad_settings_file() {
    let file = settings_file(
        r#"
[inlines]
form_css_class = "same"
empty_css_class = "same"
"#,
    );
    let settings = load_settings(Some(file.path())).unwrap();
    let registry = registry();
    let matches = registry
        .build_cli()
        .try_get_matches_from(["inlines", "check"])
        .unwrap();
    assert!(registry.execute(&matches, &settings).await.is_err());
}

#[tokio::test]
async fn test_simulate_plan_from_arguments() {
    let file = settings_file("[inlines]\ntransition_ms = 0\n");
    let settings = load_settings(Some(file.path())).unwrap();
    let registry = registry();
    let matches = registry
        .build_cli()
        .try_get_matches_from([
            "inlines",
            "simulate",
            "--layout",
            "stacked",
            "--prefix",
            "note",
            "--fields",
            "title,due:date",
            "--extra",
            "2",
            "--min",
            "1",
            "--max",
            "3",
            "--ops",
            "add,add,remove:0,remove:0,remove:0",
        ])
        .unwrap();
    let (_, sub) = matches.subcommand().unwrap();
    let plan = SimulationPlan::from_matches(sub, &settings).unwrap();
    assert_eq!(plan.fields.len(), 2);

    let report = simulate(&plan, &settings).await.unwrap();
    let totals: Vec<usize> = report.steps.iter().map(|s| s.total_forms).collect();
    // The second add hits MAX_NUM_FORMS; the last removal would cross MIN_NUM_FORMS.
    assert_eq!(totals, vec![2, 3, 3, 2, 1, 1]);
    assert!(!report.steps[5].applied);
    assert!(!report.steps[4].delete_visible);
    assert_eq!(report.steps[4].row_ids, vec!["note-0"]);
    // The one remaining row is blank, so it does not count toward the floor.
    assert_eq!(
        report.submission_error.as_deref(),
        Some("Validation error: Please submit at least 1 form.")
    );
    assert!(report.html.contains("#1"));

    assert!(registry.execute(&matches, &settings).await.is_ok());
}
