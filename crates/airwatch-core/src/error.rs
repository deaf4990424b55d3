// ── Core error types ──
//
// User-facing errors from airwatch-core. Skipped snapshot records are
// policy, not errors, and never show up here.

use thiserror::Error;

use crate::rules::RuleKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Alert lifecycle ──────────────────────────────────────────────
    #[error("Alert not found in the active set: {alert_id}")]
    AlertNotFound { alert_id: String },

    // ── Rule catalog ─────────────────────────────────────────────────
    #[error("Rule {rule} message references '{{{placeholder}}}' which its details do not provide")]
    TemplateRender {
        rule: RuleKind,
        placeholder: String,
    },

    #[error("Invalid message template for rule {rule}: {reason}")]
    InvalidTemplate { rule: RuleKind, reason: String },

    #[error("Invalid rule definition: {message}")]
    InvalidRule { message: String },

    // ── Snapshot source ──────────────────────────────────────────────
    #[error("Cannot load snapshot from {path}: {reason}")]
    Snapshot { path: String, reason: String },

    /// Kismet rejected the session key.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("MAC anonymization failed: {reason}")]
    Anonymize { reason: String },

    // ── Engine task ──────────────────────────────────────────────────
    #[error("Alert engine task has stopped")]
    EngineStopped,
}
