//! Shared helpers for command handlers.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use tabled::Tabled;

use airwatch_config::{
    SourceMode, build_anonymizer, build_catalog, build_kismet_source, build_vendor_table,
    config_path,
};
use airwatch_core::{Alert, AlertQuery, AnySource, Engine, JsonFileSource, RuleKind, Severity};

use crate::cli::{FilterArgs, RuleArg, SeverityArg};
use crate::error::CliError;
use crate::output;

use super::Context;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Rule")]
    rule: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Ack")]
    acknowledged: String,
}

impl AlertRow {
    pub fn new(alert: &Alert, color: bool) -> Self {
        Self {
            id: alert.id.to_string(),
            created: output::timestamp(alert),
            severity: output::severity_label(alert.severity, color),
            rule: alert.rule.to_string(),
            source: alert.source.clone(),
            message: alert.message.clone(),
            acknowledged: if alert.is_acknowledged() { "yes" } else { "no" }.into(),
        }
    }
}

/// Render and print an alert list in the context's format.
pub fn print_alerts(alerts: &[Alert], ctx: &Context) {
    let out = output::render_list(
        ctx.format,
        alerts,
        |a| AlertRow::new(a, ctx.color),
        |a| a.id.to_string(),
    );
    output::print_output(&out, ctx.quiet());
}

// ── Engine construction ─────────────────────────────────────────────

/// Engine with the effective catalog and vendor table from config.
pub fn build_engine(ctx: &Context) -> Result<Engine, CliError> {
    let catalog = build_catalog(&ctx.config)?;
    let vendors = build_vendor_table(&ctx.config)?;
    Ok(Engine::new(catalog, vendors))
}

/// JSON file source, anonymizing if `[source] anonymize` is set.
pub fn build_source(path: &Path, ctx: &Context) -> JsonFileSource {
    let source = JsonFileSource::new(path);
    match build_anonymizer(&ctx.config.source) {
        Some(anonymizer) => source.with_anonymizer(anonymizer),
        None => source,
    }
}

/// An explicit path wins; otherwise `[source] mode` picks the configured
/// file or the Kismet server.
pub fn resolve_source(explicit: Option<&Path>, ctx: &Context) -> Result<AnySource, CliError> {
    if let Some(path) = explicit {
        return Ok(build_source(path, ctx).into());
    }
    match ctx.config.source.mode {
        SourceMode::File => match &ctx.config.source.path {
            Some(path) => Ok(build_source(path, ctx).into()),
            None => Err(CliError::NoSnapshot {
                config_path: ctx
                    .global
                    .config
                    .clone()
                    .unwrap_or_else(config_path)
                    .display()
                    .to_string(),
            }),
        },
        SourceMode::Kismet => Ok(build_kismet_source(&ctx.config.source)?.into()),
    }
}

// ── Argument conversion ─────────────────────────────────────────────

impl From<RuleArg> for RuleKind {
    fn from(arg: RuleArg) -> Self {
        match arg {
            RuleArg::RogueAp => Self::RogueAp,
            RuleArg::MacSpoofing => Self::MacSpoofing,
            RuleArg::WeakEncryption => Self::WeakEncryption,
        }
    }
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Low => Self::Low,
            SeverityArg::Medium => Self::Medium,
            SeverityArg::High => Self::High,
            SeverityArg::Critical => Self::Critical,
        }
    }
}

/// Parse an RFC 3339 timestamp. Offset-less values are taken as UTC.
pub fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, CliError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| CliError::Validation {
            field: field.into(),
            reason: format!("'{raw}' is not an ISO 8601 timestamp (e.g. 2024-05-01T12:00:00Z)"),
        })
}

pub fn build_query(args: &FilterArgs) -> Result<AlertQuery, CliError> {
    Ok(AlertQuery {
        severity: args.severity.map(Severity::from),
        rule: args.rule.map(RuleKind::from),
        acknowledged: args.acknowledged,
        since: args
            .since
            .as_deref()
            .map(|raw| parse_timestamp("--since", raw))
            .transpose()?,
        until: args
            .until
            .as_deref()
            .map(|raw| parse_timestamp("--until", raw))
            .transpose()?,
        limit: args.limit,
    })
}
