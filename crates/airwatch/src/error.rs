//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use airwatch_config::ConfigError;
use airwatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    #[allow(dead_code)]
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const SOURCE: i32 = 7;
    pub const CONFIG: i32 = 78;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Alerts ───────────────────────────────────────────────────────

    #[error("Alert '{alert_id}' is not active")]
    #[diagnostic(
        code(airwatch::not_found),
        help(
            "Only active alerts can be acknowledged; expired ones stay in history.\n\
             Run: airwatch analyze <SNAPSHOT> --show active -o plain"
        )
    )]
    NotFound { alert_id: String },

    // ── Snapshot source ──────────────────────────────────────────────

    #[error("Cannot load snapshot {path}")]
    #[diagnostic(
        code(airwatch::snapshot),
        help(
            "Expected a JSON document like {{\"devices\": [...], \"access_points\": [...]}}.\n\
             Cause: {reason}"
        )
    )]
    Snapshot { path: String, reason: String },

    #[error("No snapshot file given")]
    #[diagnostic(
        code(airwatch::no_snapshot),
        help(
            "Pass a path: airwatch watch <SNAPSHOT>\n\
             Or set `path` under [source] in {config_path},\n\
             or `mode = \"kismet\"` with `api_url` to poll a Kismet server"
        )
    )]
    NoSnapshot { config_path: String },

    #[error("Cannot reach snapshot source {url}")]
    #[diagnostic(
        code(airwatch::source_unreachable),
        help("Check `api_url` under [source] and that the server is running.\nCause: {reason}")
    )]
    SourceUnreachable { url: String, reason: String },

    #[error("Snapshot source rejected our credentials: {message}")]
    #[diagnostic(
        code(airwatch::source_auth),
        help(
            "Set the Kismet session key in the variable named by `api_key_env`\n\
             (default AIRWATCH_KISMET_API_KEY)"
        )
    )]
    SourceAuth { message: String },

    #[error("MAC anonymization failed: {reason}")]
    #[diagnostic(code(airwatch::anonymize))]
    Anonymize { reason: String },

    // ── Engine ───────────────────────────────────────────────────────

    #[error("Alert engine stopped unexpectedly")]
    #[diagnostic(code(airwatch::engine_stopped))]
    EngineStopped,

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(airwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Invalid rule configuration: {message}")]
    #[diagnostic(
        code(airwatch::rule),
        help("Check the [rules.*] tables in your config. Run: airwatch config show")
    )]
    InvalidRule { message: String },

    #[error("Invalid config value {field}: {reason}")]
    #[diagnostic(
        code(airwatch::config_validation),
        help("Run: airwatch config show")
    )]
    ConfigValidation { field: String, reason: String },

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(airwatch::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(airwatch::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    #[diagnostic(code(airwatch::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NoSnapshot { .. } | Self::ConfigExists { .. } => {
                exit_code::USAGE
            }
            Self::Snapshot { .. }
            | Self::SourceUnreachable { .. }
            | Self::SourceAuth { .. }
            | Self::Anonymize { .. }
            | Self::Io(_) => exit_code::SOURCE,
            Self::InvalidRule { .. }
            | Self::ConfigValidation { .. }
            | Self::Config(_)
            | Self::Toml(_) => exit_code::CONFIG,
            Self::EngineStopped => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AlertNotFound { alert_id } => CliError::NotFound { alert_id },
            CoreError::Snapshot { path, reason } => CliError::Snapshot { path, reason },
            CoreError::Authentication { message } => CliError::SourceAuth { message },
            CoreError::Transport(e) => CliError::SourceUnreachable {
                url: e
                    .url()
                    .map_or_else(|| "(unknown)".to_owned(), ToString::to_string),
                reason: e.to_string(),
            },
            CoreError::InvalidUrl(e) => CliError::ConfigValidation {
                field: "source.api_url".into(),
                reason: e.to_string(),
            },
            CoreError::Anonymize { reason } => CliError::Anonymize { reason },
            CoreError::EngineStopped => CliError::EngineStopped,
            err @ (CoreError::TemplateRender { .. }
            | CoreError::InvalidTemplate { .. }
            | CoreError::InvalidRule { .. }) => CliError::InvalidRule {
                message: err.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => {
                CliError::ConfigValidation { field, reason }
            }
            ConfigError::Rule(core) => CliError::from(core),
            ConfigError::Io(io) => CliError::Io(io),
            other => CliError::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use airwatch_core::{KismetSource, RuleKind};
    use std::time::Duration;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let not_found = CliError::from(CoreError::AlertNotFound {
            alert_id: "rogue_ap_x".into(),
        });
        assert_eq!(not_found.exit_code(), exit_code::NOT_FOUND);

        let snapshot = CliError::from(CoreError::Snapshot {
            path: "a.json".into(),
            reason: "missing".into(),
        });
        assert_eq!(snapshot.exit_code(), exit_code::SOURCE);

        let template = CliError::from(ConfigError::Rule(CoreError::TemplateRender {
            rule: RuleKind::RogueAp,
            placeholder: "vendor".into(),
        }));
        assert_eq!(template.exit_code(), exit_code::CONFIG);
    }

    #[test]
    fn source_errors_are_source_exit() {
        let auth = CliError::from(CoreError::Authentication {
            message: "401".into(),
        });
        assert_eq!(auth.exit_code(), exit_code::SOURCE);

        let bad_url = KismetSource::new("no scheme", None, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(bad_url, CoreError::InvalidUrl(_)));
        let bad_url = CliError::from(bad_url);
        assert!(matches!(&bad_url, CliError::ConfigValidation { field, .. } if field == "source.api_url"));
        assert_eq!(bad_url.exit_code(), exit_code::CONFIG);
    }

    #[test]
    fn config_validation_is_config_exit() {
        let err = CliError::from(ConfigError::Validation {
            field: "vendors.x".into(),
            reason: "bad".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONFIG);
        assert_eq!(exit_code::SUCCESS, 0);
    }
}
