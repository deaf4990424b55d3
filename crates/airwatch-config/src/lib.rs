//! Configuration for the airwatch CLI.
//!
//! TOML file + `AIRWATCH_` environment overlay, per-rule overrides that
//! are validated into an `airwatch_core::RuleCatalog`, extra vendor
//! prefixes, snapshot source selection (file or Kismet), and secret
//! resolution for the anonymization salt and Kismet API key
//! (env var → plaintext).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;

use airwatch_core::anonymize::DEFAULT_SECRET;
use airwatch_core::{
    CoreError, DetectionRule, Encryption, KismetSource, MacAnonymizer, MacSpoofingThresholds,
    RogueApThresholds, RuleCatalog, RuleKind, Severity, Thresholds, VendorTable,
    WeakEncryptionThresholds,
};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error(transparent)]
    Rule(#[from] CoreError),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Output and color defaults for the CLI.
    #[serde(default)]
    pub defaults: Defaults,

    /// Where snapshots come from and how they are cleaned.
    #[serde(default)]
    pub source: SourceConfig,

    /// Per-rule overrides keyed by rule id (`rogue_ap`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rules: BTreeMap<String, RuleOverride>,

    /// Extra `OUI = "Vendor"` entries layered over the built-in table.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vendors: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// Where `analyze` and `watch` read snapshots from when no file is given.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// The JSON file at `path`.
    #[default]
    File,
    /// A Kismet server's device view at `api_url`.
    Kismet,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub mode: SourceMode,

    /// Snapshot JSON file used when no path is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Kismet server base URL, e.g. `http://localhost:2501`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Environment variable holding the Kismet session key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Kismet session key (plaintext; prefer `api_key_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// HTTP timeout for Kismet requests, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Seconds between polls in `watch` mode.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Replace device MACs with daily-salted identifiers on load.
    #[serde(default)]
    pub anonymize: bool,

    /// Environment variable holding the anonymization secret.
    #[serde(default = "default_salt_env")]
    pub salt_env: String,

    /// Anonymization secret (plaintext; prefer `salt_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::default(),
            path: None,
            api_url: None,
            api_key_env: default_api_key_env(),
            api_key: None,
            timeout_secs: default_timeout(),
            poll_interval_secs: default_poll_interval(),
            anonymize: false,
            salt_env: default_salt_env(),
            salt: None,
        }
    }
}

impl SourceConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

fn default_poll_interval() -> u64 {
    30
}
fn default_salt_env() -> String {
    "AIRWATCH_HASH_SALT".into()
}
fn default_api_key_env() -> String {
    "AIRWATCH_KISMET_API_KEY".into()
}
fn default_timeout() -> u64 {
    30
}

/// Optional overrides for one rule. Threshold keys only apply to the
/// rule family that defines them.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct RuleOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppress_after_hours: Option<u32>,

    // rogue_ap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_blacklist: Option<Vec<String>>,

    // mac_spoofing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_vendor_macs: Option<usize>,

    // weak_encryption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weak_encryption_types: Option<Vec<String>>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("rs", "airwatch", "airwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("airwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from defaults + file + environment.
///
/// `path` overrides the platform location. A missing file is not an
/// error; the defaults and environment still apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("AIRWATCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it, returning the path written.
pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(path)
}

// ── Rule catalog ────────────────────────────────────────────────────

/// Build the effective rule catalog: built-in rules with overrides applied.
///
/// Every override is validated here, so a bad template or threshold
/// never reaches alert rendering.
pub fn build_catalog(cfg: &Config) -> Result<RuleCatalog, ConfigError> {
    for name in cfg.rules.keys() {
        RuleKind::from_str(name).map_err(|_| ConfigError::Validation {
            field: format!("rules.{name}"),
            reason: "unknown rule; expected rogue_ap, mac_spoofing or weak_encryption".into(),
        })?;
    }

    let mut catalog = RuleCatalog::empty();
    for kind in RuleKind::iter() {
        let rule = match cfg.rules.get(&kind.to_string()) {
            Some(over) => apply_override(kind, over)?,
            None => DetectionRule::builtin(kind),
        };
        catalog.insert(rule);
    }
    Ok(catalog)
}

fn apply_override(kind: RuleKind, over: &RuleOverride) -> Result<DetectionRule, ConfigError> {
    let base = DetectionRule::builtin(kind);

    let severity = match &over.severity {
        Some(raw) => Severity::from_str(raw).map_err(|_| ConfigError::Validation {
            field: format!("rules.{kind}.severity"),
            reason: format!("expected low, medium, high or critical, got '{raw}'"),
        })?,
        None => base.severity,
    };
    let message = over
        .message
        .clone()
        .unwrap_or_else(|| base.template().as_str().to_owned());
    let hours = over
        .suppress_after_hours
        .unwrap_or_else(|| base.suppress_after_hours());
    let thresholds = merge_thresholds(kind, base.thresholds(), over)?;

    let rule = DetectionRule::new(severity, &message, hours, thresholds)?
        .with_enabled(over.enabled.unwrap_or(base.enabled));
    Ok(rule)
}

fn merge_thresholds(
    kind: RuleKind,
    base: &Thresholds,
    over: &RuleOverride,
) -> Result<Thresholds, ConfigError> {
    let foreign = |key: &str| ConfigError::Validation {
        field: format!("rules.{kind}.{key}"),
        reason: format!("not a {kind} threshold"),
    };

    let merged = match base {
        Thresholds::RogueAp(t) => {
            if over.same_vendor_macs.is_some() {
                return Err(foreign("same_vendor_macs"));
            }
            if over.weak_encryption_types.is_some() {
                return Err(foreign("weak_encryption_types"));
            }
            Thresholds::RogueAp(RogueApThresholds {
                signal_strength_dbm: over.signal_strength.unwrap_or(t.signal_strength_dbm),
                encryption_blacklist: match &over.encryption_blacklist {
                    Some(list) => parse_encryptions(kind, "encryption_blacklist", list)?,
                    None => t.encryption_blacklist.clone(),
                },
            })
        }
        Thresholds::MacSpoofing(t) => {
            if over.signal_strength.is_some() || over.encryption_blacklist.is_some() {
                return Err(foreign("encryption_blacklist/signal_strength"));
            }
            if over.weak_encryption_types.is_some() {
                return Err(foreign("weak_encryption_types"));
            }
            Thresholds::MacSpoofing(MacSpoofingThresholds {
                same_vendor_macs: over.same_vendor_macs.unwrap_or(t.same_vendor_macs),
            })
        }
        Thresholds::WeakEncryption(t) => {
            if over.signal_strength.is_some() || over.encryption_blacklist.is_some() {
                return Err(foreign("encryption_blacklist/signal_strength"));
            }
            if over.same_vendor_macs.is_some() {
                return Err(foreign("same_vendor_macs"));
            }
            Thresholds::WeakEncryption(WeakEncryptionThresholds {
                weak_encryption_types: match &over.weak_encryption_types {
                    Some(list) => parse_encryptions(kind, "weak_encryption_types", list)?,
                    None => t.weak_encryption_types.clone(),
                },
            })
        }
    };
    Ok(merged)
}

fn parse_encryptions(
    kind: RuleKind,
    key: &str,
    raw: &[String],
) -> Result<Vec<Encryption>, ConfigError> {
    raw.iter()
        .map(|name| {
            Encryption::from_str(name.trim()).map_err(|_| ConfigError::Validation {
                field: format!("rules.{kind}.{key}"),
                reason: format!("unknown encryption '{name}'"),
            })
        })
        .collect()
}

// ── Vendors ─────────────────────────────────────────────────────────

/// Built-in vendor table with `[vendors]` entries layered on top.
pub fn build_vendor_table(cfg: &Config) -> Result<VendorTable, ConfigError> {
    let mut table = VendorTable::builtin();
    for (oui, vendor) in &cfg.vendors {
        if !table.insert(oui, vendor.clone()) {
            return Err(ConfigError::Validation {
                field: format!("vendors.{oui}"),
                reason: "expected a colon-separated prefix like 00:1B:63".into(),
            });
        }
    }
    Ok(table)
}

// ── Secret resolution ───────────────────────────────────────────────

/// Read `env_var` if set and non-empty, else fall back to `plaintext`.
fn resolve_secret(env_var: &str, plaintext: Option<&str>) -> Option<SecretString> {
    if let Ok(val) = std::env::var(env_var) {
        if !val.is_empty() {
            return Some(SecretString::from(val));
        }
    }
    plaintext.map(|val| SecretString::from(val.to_owned()))
}

/// Resolve the anonymization secret: `salt_env` variable, then plaintext.
pub fn resolve_salt(source: &SourceConfig) -> Option<SecretString> {
    resolve_secret(&source.salt_env, source.salt.as_deref())
}

/// Resolve the Kismet session key: `api_key_env` variable, then plaintext.
pub fn resolve_api_key(source: &SourceConfig) -> Option<SecretString> {
    resolve_secret(&source.api_key_env, source.api_key.as_deref())
}

/// Anonymizer for the configured source, if anonymization is enabled.
pub fn build_anonymizer(source: &SourceConfig) -> Option<MacAnonymizer> {
    source.anonymize.then(|| {
        let secret = resolve_salt(source)
            .unwrap_or_else(|| SecretString::from(DEFAULT_SECRET.to_owned()));
        MacAnonymizer::new(secret)
    })
}

// ── Kismet ──────────────────────────────────────────────────────────

/// Live source for `[source] mode = "kismet"`.
pub fn build_kismet_source(source: &SourceConfig) -> Result<KismetSource, ConfigError> {
    let api_url = source
        .api_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ConfigError::Validation {
            field: "source.api_url".into(),
            reason: "required when source.mode is kismet".into(),
        })?;

    let api_key = resolve_api_key(source);
    let kismet = KismetSource::new(api_url.trim(), api_key.as_ref(), source.timeout())
        .map_err(|e| match e {
            CoreError::InvalidUrl(err) => ConfigError::Validation {
                field: "source.api_url".into(),
                reason: err.to_string(),
            },
            other => ConfigError::Rule(other),
        })?;
    Ok(match build_anonymizer(source) {
        Some(anonymizer) => kismet.with_anonymizer(anonymizer),
        None => kismet,
    })
}
