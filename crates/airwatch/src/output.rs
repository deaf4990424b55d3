//! Rendering for `--output`: rounded tables, JSON, YAML or bare ids.
//!
//! Lists and detail views go through [`render_list`] / [`render_single`].
//! `watch` streams one alert at a time through [`render_alert_line`].

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use airwatch_core::{Alert, Severity};

use crate::cli::{ColorMode, OutputFormat};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Color ────────────────────────────────────────────────────────────

/// `auto` colors only a terminal stdout, and honors `NO_COLOR`.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Severity label, colored by urgency when `color` is set.
pub fn severity_label(severity: Severity, color: bool) -> String {
    let label = severity.to_string();
    if !color {
        return label;
    }
    match severity {
        Severity::Critical => label.bright_red().bold().to_string(),
        Severity::High => label.red().to_string(),
        Severity::Medium => label.yellow().to_string(),
        Severity::Low => label.cyan().to_string(),
    }
}

pub fn timestamp(alert: &Alert) -> String {
    alert.created_at.format(TIME_FORMAT).to_string()
}

// ── Dispatchers ──────────────────────────────────────────────────────

/// Render a collection. Tables are built from `to_row`; an empty list
/// renders as nothing rather than a bare header.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
    R: Tabled,
{
    if let Some(out) = structured(format, data) {
        return out;
    }
    match format {
        OutputFormat::Table if data.is_empty() => String::new(),
        OutputFormat::Table => Table::new(data.iter().map(to_row))
            .with(Style::rounded())
            .to_string(),
        _ => data.iter().map(id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render one item. `detail_fn` supplies the human-readable view.
pub fn render_single<T: Serialize>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String {
    if let Some(out) = structured(format, data) {
        return out;
    }
    match format {
        OutputFormat::Table => detail_fn(data),
        _ => id_fn(data),
    }
}

/// One alert per line for streaming: NDJSON for both JSON formats,
/// `---`-separated documents for YAML.
pub fn render_alert_line(alert: &Alert, format: OutputFormat, color: bool) -> String {
    match format {
        OutputFormat::Table => format!(
            "{}  {}  {}  {}",
            timestamp(alert),
            severity_label(alert.severity, color),
            alert.id,
            alert.message
        ),
        OutputFormat::Json | OutputFormat::JsonCompact => to_json(alert, true),
        OutputFormat::Yaml => format!("---\n{}", to_yaml(alert).trim_end()),
        OutputFormat::Plain => alert.id.to_string(),
    }
}

/// Write to stdout unless quiet or empty.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Serde formats ────────────────────────────────────────────────────

fn structured<T: Serialize + ?Sized>(format: OutputFormat, data: &T) -> Option<String> {
    match format {
        OutputFormat::Json => Some(to_json(data, false)),
        OutputFormat::JsonCompact => Some(to_json(data, true)),
        OutputFormat::Yaml => Some(to_yaml(data)),
        OutputFormat::Table | OutputFormat::Plain => None,
    }
}

fn to_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.expect("serialization should not fail")
}

fn to_yaml<T: Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}
