// ── Alert domain types ──

use std::borrow::Borrow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::identity::Oui;
use super::snapshot::Encryption;
use crate::rules::RuleKind;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Deterministic alert identity: one per (rule, offending entity) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(String);

impl AlertId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for AlertId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AlertId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Contextual fields attached to an alert, one shape per rule family.
///
/// Serialized flat (untagged) so consumers see a plain field map.
/// Variants are ordered most-specific first for untagged decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlertDetails {
    MacSpoofing {
        vendor: String,
        oui: Oui,
        device_count: usize,
        mac_addresses: Vec<String>,
    },
    WeakEncryption {
        ssid: String,
        bssid: String,
        encryption: Encryption,
    },
    RogueAp {
        ssid: String,
        bssid: String,
    },
}

impl AlertDetails {
    /// The rule family these details belong to.
    pub fn rule(&self) -> RuleKind {
        match self {
            Self::RogueAp { .. } => RuleKind::RogueAp,
            Self::WeakEncryption { .. } => RuleKind::WeakEncryption,
            Self::MacSpoofing { .. } => RuleKind::MacSpoofing,
        }
    }

    /// Render a single field for message substitution.
    pub fn field(&self, name: &str) -> Option<String> {
        match (self, name) {
            (Self::RogueAp { ssid, .. } | Self::WeakEncryption { ssid, .. }, "ssid") => {
                Some(ssid.clone())
            }
            (Self::RogueAp { bssid, .. } | Self::WeakEncryption { bssid, .. }, "bssid") => {
                Some(bssid.clone())
            }
            (Self::WeakEncryption { encryption, .. }, "encryption") => Some(encryption.to_string()),
            (Self::MacSpoofing { vendor, .. }, "vendor") => Some(vendor.clone()),
            (Self::MacSpoofing { oui, .. }, "oui") => Some(oui.to_string()),
            (Self::MacSpoofing { device_count, .. }, "device_count") => {
                Some(device_count.to_string())
            }
            (Self::MacSpoofing { mac_addresses, .. }, "mac_addresses") => {
                Some(mac_addresses.join(", "))
            }
            _ => None,
        }
    }
}

/// A raised security or operational alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub rule: RuleKind,
    pub severity: Severity,
    pub message: String,
    /// Engine-assigned at first detection; never refreshed by re-detection.
    pub created_at: DateTime<Utc>,
    /// The BSSID or OUI implicated.
    pub source: String,
    pub details: AlertDetails,
    pub(crate) acknowledged: bool,
}

impl Alert {
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// Mark reviewed. One-way: there is no path back to unacknowledged.
    pub(crate) fn acknowledge(&mut self) {
        self.acknowledged = true;
    }
}
