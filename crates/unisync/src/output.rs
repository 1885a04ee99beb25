//! Output formatting: table or JSON.
//!
//! Tables use `tabled`, with `owo-colors` for outcome highlighting when the
//! terminal supports it. JSON goes straight through serde.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use unisync_core::{ApplyOutcome, CycleReport, FetchOutcome};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

#[derive(Clone, Copy)]
enum Tone {
    Good,
    Warn,
    Bad,
}

fn paint(text: &str, tone: Tone, color: bool) -> String {
    if !color {
        return text.to_owned();
    }
    match tone {
        Tone::Good => text.green().to_string(),
        Tone::Warn => text.yellow().to_string(),
        Tone::Bad => text.red().bold().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of rows: a table, or the rows themselves as JSON.
pub fn render_list<R>(format: OutputFormat, rows: &[R]) -> Result<String, CliError>
where
    R: Tabled + Serialize,
{
    match format {
        OutputFormat::Table => Ok(render_table(rows)),
        OutputFormat::Json => render_json(rows, false),
        OutputFormat::JsonCompact => render_json(rows, true),
    }
}

/// Render a cycle report.
pub fn render_report(
    format: OutputFormat,
    report: &CycleReport,
    color: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(report_table(report, color)),
        OutputFormat::Json => render_json(report, false),
        OutputFormat::JsonCompact => render_json(report, true),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(rendered)
}

// ── Cycle report table ───────────────────────────────────────────────

#[derive(Tabled)]
struct FetchRow {
    #[tabled(rename = "Controller")]
    controller: String,
    #[tabled(rename = "Fetch")]
    status: String,
    #[tabled(rename = "DNS")]
    dns: String,
    #[tabled(rename = "DHCP")]
    dhcp: String,
    #[tabled(rename = "Filtered")]
    filtered: String,
    #[tabled(rename = "Rejected")]
    rejected: String,
}

#[derive(Tabled)]
struct OperationRow {
    #[tabled(rename = "Controller")]
    controller: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Record")]
    record: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
}

fn report_table(report: &CycleReport, color: bool) -> String {
    let fetch_rows: Vec<FetchRow> = report
        .fetches
        .iter()
        .map(|(id, outcome)| match outcome {
            FetchOutcome::Fetched {
                dns_records,
                dhcp_records,
                filtered,
                rejected,
            } => FetchRow {
                controller: id.to_string(),
                status: paint("ok", Tone::Good, color),
                dns: dns_records.to_string(),
                dhcp: dhcp_records.to_string(),
                filtered: filtered.to_string(),
                rejected: rejected.to_string(),
            },
            FetchOutcome::Failed { error } => FetchRow {
                controller: id.to_string(),
                status: paint(&format!("failed: {error}"), Tone::Bad, color),
                dns: "-".into(),
                dhcp: "-".into(),
                filtered: "-".into(),
                rejected: "-".into(),
            },
        })
        .collect();

    let op_rows: Vec<OperationRow> = report
        .operations
        .iter()
        .flat_map(|(id, ops)| {
            ops.iter().map(move |op| OperationRow {
                controller: id.to_string(),
                action: op.action.to_string(),
                record: op.identity.to_string(),
                outcome: outcome_cell(&op.outcome, color),
            })
        })
        .collect();

    let mut out = render_table(&fetch_rows);
    out.push('\n');
    if op_rows.is_empty() {
        out.push_str("\nAll controllers are in sync.\n");
    } else {
        out.push('\n');
        out.push_str(&render_table(&op_rows));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&summary_line(report, color));
    out
}

fn outcome_cell(outcome: &ApplyOutcome, color: bool) -> String {
    match outcome {
        ApplyOutcome::Applied => paint("applied", Tone::Good, color),
        ApplyOutcome::Skipped { reason } => paint(&format!("skipped ({reason})"), Tone::Warn, color),
        ApplyOutcome::Failed { reason } => paint(&format!("failed: {reason}"), Tone::Bad, color),
    }
}

fn summary_line(report: &CycleReport, color: bool) -> String {
    let mode = if report.dry_run { " (dry run)" } else { "" };
    let failed = report.failed() + report.failed_controllers().len();
    let tone = if failed > 0 { Tone::Bad } else { Tone::Good };
    let counts = format!(
        "{} desired, {} applied, {} skipped, {} failed",
        report.desired_records,
        report.applied(),
        report.skipped(),
        report.failed(),
    );
    format!(
        "{}{mode} in {}ms",
        paint(&counts, tone, color),
        report.duration().num_milliseconds()
    )
}
