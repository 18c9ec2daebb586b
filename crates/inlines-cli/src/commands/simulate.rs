//! The `simulate` management command.
//!
//! Renders an inline formset page, attaches the managers the way a browser
//! would on load, replays a list of row operations, and reports the counters
//! and row indices after each step. The final page is checked with the
//! server-side submission rules.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use async_trait::async_trait;
use inlines_core::{InlinesError, InlinesResult, Settings};
use inlines_dom::Document;
use inlines_formset::markup::{FieldSpec, FormsetMarkup};
use inlines_formset::submission::FormsetSubmission;
use inlines_formset::{init_inline_formsets, FormsetManager, FormsetOptions, InlineType};
use serde::Serialize;

use crate::command::ManagementCommand;

/// Replays row operations against a rendered inline formset.
pub struct SimulateCommand;

/// One step of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "op", content = "index")]
pub enum Operation {
    /// Click the add control.
    Add,
    /// Click the delete control of the row at this index.
    Remove(usize),
}

impl FromStr for Operation {
    type Err = InlinesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "add" {
            return Ok(Self::Add);
        }
        s.strip_prefix("remove:")
            .and_then(|i| i.parse().ok())
            .map(Self::Remove)
            .ok_or_else(|| {
                InlinesError::ConfigurationError(format!(
                    "invalid operation '{s}', expected 'add' or 'remove:<index>'"
                ))
            })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove(i) => write!(f, "remove:{i}"),
        }
    }
}

/// Parses a comma-separated operation list such as `add,add,remove:0`.
pub fn parse_operations(list: &str) -> InlinesResult<Vec<Operation>> {
    list.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// What to render and replay.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    /// Inline layout.
    pub layout: InlineType,
    /// Formset prefix.
    pub prefix: String,
    /// Fields of each row.
    pub fields: Vec<FieldSpec>,
    /// Rows backed by saved objects.
    pub initial: usize,
    /// Blank rows.
    pub extra: usize,
    /// `MIN_NUM_FORMS`.
    pub min_num: usize,
    /// `MAX_NUM_FORMS`, zero for none.
    pub max_num: usize,
    /// Operations to replay.
    pub operations: Vec<Operation>,
}

/// The formset state after one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// The operation, `None` for the state right after attach.
    pub operation: Option<Operation>,
    /// Whether the operation changed anything.
    pub applied: bool,
    /// `TOTAL_FORMS` after the step.
    pub total_forms: usize,
    /// The ids of the rows in index order.
    pub row_ids: Vec<String>,
    /// Whether the add control is shown.
    pub add_visible: bool,
    /// Whether the delete controls are shown.
    pub delete_visible: bool,
}

/// The outcome of a simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// One entry per step, starting with the attached state.
    pub steps: Vec<StepReport>,
    /// The submission check result, `None` when the page would submit.
    pub submission_error: Option<String>,
    /// The final HTML of the formset group.
    pub html: String,
}

/// Renders the plan, replays its operations, and reports each step.
///
/// Removals wait for the configured transition on the tokio timer.
///
/// # Errors
///
/// Returns an error if the markup cannot be rendered or no manager could be
/// attached to it.
pub async fn simulate(plan: &SimulationPlan, settings: &Settings) -> InlinesResult<SimulationReport> {
    let mut doc = Document::new();
    let body = doc.body();
    let rendered = FormsetMarkup::new(plan.layout, plan.prefix.clone())
        .fields(plan.fields.clone())
        .initial(plan.initial)
        .extra(plan.extra)
        .min_num(plan.min_num)
        .max_num(plan.max_num)
        .build(&mut doc, body)?;

    let base = FormsetOptions::from_settings(settings);
    let mut manager = init_inline_formsets(&mut doc, &base)
        .into_iter()
        .next()
        .ok_or_else(|| {
            InlinesError::ImproperlyConfigured(format!("no formset attached for '{}'", plan.prefix))
        })?;

    let mut steps = vec![snapshot(&doc, &manager, None, true)];
    for op in &plan.operations {
        let applied = match *op {
            Operation::Add => manager.add_row(&mut doc).is_some(),
            Operation::Remove(index) => {
                let control = manager
                    .rows()
                    .get(index)
                    .and_then(|row| manager.delete_control(*row))
                    .filter(|c| doc.is_visible(*c));
                match control {
                    Some(control) => {
                        let started = manager.click_delete(&mut doc, control, Instant::now());
                        manager.settle(&mut doc).await;
                        started
                    }
                    None => false,
                }
            }
        };
        if !applied {
            tracing::info!(%op, "operation had no effect");
        }
        steps.push(snapshot(&doc, &manager, Some(*op), applied));
    }

    let submission_error = FormsetSubmission::new(plan.prefix.clone())
        .validate_document(&doc, rendered.group)
        .err()
        .map(|e| e.to_string());

    Ok(SimulationReport {
        steps,
        submission_error,
        html: doc.to_html(rendered.group),
    })
}

fn snapshot(doc: &Document, manager: &FormsetManager, operation: Option<Operation>, applied: bool) -> StepReport {
    StepReport {
        operation,
        applied,
        total_forms: manager.total_forms(),
        row_ids: manager
            .rows()
            .iter()
            .filter_map(|r| manager.row_node(*r))
            .filter_map(|n| doc.attr(n, "id").map(str::to_string))
            .collect(),
        add_visible: manager.is_add_visible(doc),
        delete_visible: manager.are_delete_controls_visible(doc),
    }
}

fn usize_arg(matches: &clap::ArgMatches, name: &str) -> usize {
    matches.get_one::<usize>(name).copied().unwrap_or_default()
}

impl SimulationPlan {
    /// Builds a plan from parsed `simulate` arguments.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown layout or a malformed operation.
    pub fn from_matches(matches: &clap::ArgMatches, settings: &Settings) -> InlinesResult<Self> {
        let layout = matches
            .get_one::<String>("layout")
            .map_or(Ok(InlineType::Tabular), |l| l.parse())?;
        let prefix = matches
            .get_one::<String>("prefix")
            .cloned()
            .unwrap_or_else(|| settings.inlines.prefix.clone());
        let fields = matches
            .get_one::<String>("fields")
            .map_or("title", String::as_str)
            .split(',')
            .filter(|f| !f.trim().is_empty())
            .map(|f| FieldSpec::parse(f.trim()))
            .collect();
        let operations = matches
            .get_one::<String>("ops")
            .map_or(Ok(Vec::new()), |ops| parse_operations(ops))?;

        Ok(Self {
            layout,
            prefix,
            fields,
            initial: usize_arg(matches, "initial"),
            extra: usize_arg(matches, "extra"),
            min_num: usize_arg(matches, "min"),
            max_num: usize_arg(matches, "max"),
            operations,
        })
    }
}

#[async_trait]
impl ManagementCommand for SimulateCommand {
    fn name(&self) -> &'static str {
        "simulate"
    }

    fn help(&self) -> &'static str {
        "Replay add/remove operations against an inline formset"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("layout")
                .long("layout")
                .value_parser(["tabular", "stacked"])
                .default_value("tabular")
                .help("Inline layout"),
        )
        .arg(
            clap::Arg::new("prefix")
                .long("prefix")
                .help("Formset prefix (defaults to the configured prefix)"),
        )
        .arg(
            clap::Arg::new("fields")
                .long("fields")
                .default_value("title")
                .help("Comma-separated fields, e.g. title,due:date,slug:slug=title"),
        )
        .arg(
            clap::Arg::new("initial")
                .long("initial")
                .value_parser(clap::value_parser!(usize))
                .default_value("0")
                .help("Rows backed by saved objects"),
        )
        .arg(
            clap::Arg::new("extra")
                .long("extra")
                .value_parser(clap::value_parser!(usize))
                .default_value("1")
                .help("Blank rows"),
        )
        .arg(
            clap::Arg::new("min")
                .long("min")
                .value_parser(clap::value_parser!(usize))
                .default_value("0")
                .help("MIN_NUM_FORMS"),
        )
        .arg(
            clap::Arg::new("max")
                .long("max")
                .value_parser(clap::value_parser!(usize))
                .default_value("1000")
                .help("MAX_NUM_FORMS, 0 for unbounded"),
        )
        .arg(
            clap::Arg::new("ops")
                .long("ops")
                .help("Comma-separated operations: add, remove:<index>"),
        )
        .arg(
            clap::Arg::new("html")
                .long("html")
                .action(clap::ArgAction::SetTrue)
                .help("Print the final HTML"),
        )
        .arg(
            clap::Arg::new("json")
                .long("json")
                .action(clap::ArgAction::SetTrue)
                .help("Print the report as JSON"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> Result<(), InlinesError> {
        let plan = SimulationPlan::from_matches(matches, settings)?;
        let report = simulate(&plan, settings).await?;

        if matches.get_flag("json") {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        for step in &report.steps {
            let label = step
                .operation
                .map_or_else(|| "attach".to_string(), |op| op.to_string());
            println!(
                "{label:<10} {} TOTAL_FORMS={} rows=[{}] add={} delete={}",
                if step.applied { "ok     " } else { "skipped" },
                step.total_forms,
                step.row_ids.join(", "),
                if step.add_visible { "shown" } else { "hidden" },
                if step.delete_visible { "shown" } else { "hidden" },
            );
        }
        match &report.submission_error {
            None => println!("submission: valid"),
            Some(err) => println!("submission: {err}"),
        }
        if matches.get_flag("html") {
            println!("{}", report.html);
        }
        Ok(())
    }
}
