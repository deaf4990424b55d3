// ── Rule catalog ──
//
// Static table of detection rules. Built once at startup (optionally with
// host-supplied overrides) and shared read-only by the detector and the
// alert store's expiry pass.

mod template;

pub use template::MessageTemplate;

use chrono::{DateTime, TimeDelta, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::CoreError;
use crate::model::{Alert, AlertDetails, AlertId, Encryption, Severity};

/// Suppression window applied to alerts whose rule is no longer in the catalog.
pub const FALLBACK_SUPPRESS_HOURS: u32 = 24;

// ── RuleKind ─────────────────────────────────────────────────────────

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
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleKind {
    RogueAp,
    MacSpoofing,
    WeakEncryption,
}

impl RuleKind {
    /// Detail fields the detector populates for this rule, i.e. every
    /// placeholder a template for it may reference.
    pub fn detail_fields(self) -> &'static [&'static str] {
        match self {
            Self::RogueAp => &["ssid", "bssid"],
            Self::WeakEncryption => &["ssid", "bssid", "encryption"],
            Self::MacSpoofing => &["vendor", "oui", "device_count", "mac_addresses"],
        }
    }

    /// Deterministic alert identity for an offending entity (BSSID or OUI).
    pub fn alert_id(self, entity: &str) -> AlertId {
        let prefix = match self {
            Self::RogueAp => "rogue_ap",
            Self::WeakEncryption => "weak_enc",
            Self::MacSpoofing => "mac_spoofing",
        };
        AlertId::new(format!("{prefix}_{entity}"))
    }
}

// ── Thresholds ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RogueApThresholds {
    /// Carried for reporting; rogue detection is driven by SSID/BSSID conflicts alone.
    pub signal_strength_dbm: i32,
    pub encryption_blacklist: Vec<Encryption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacSpoofingThresholds {
    /// Distinct identifiers under one OUI that trigger the alert.
    pub same_vendor_macs: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeakEncryptionThresholds {
    pub weak_encryption_types: Vec<Encryption>,
}

/// Per-family detection parameters. The variant determines the rule's kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Thresholds {
    RogueAp(RogueApThresholds),
    MacSpoofing(MacSpoofingThresholds),
    WeakEncryption(WeakEncryptionThresholds),
}

impl Thresholds {
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::RogueAp(_) => RuleKind::RogueAp,
            Self::MacSpoofing(_) => RuleKind::MacSpoofing,
            Self::WeakEncryption(_) => RuleKind::WeakEncryption,
        }
    }

    pub fn default_for(kind: RuleKind) -> Self {
        match kind {
            RuleKind::RogueAp => Self::RogueAp(RogueApThresholds {
                signal_strength_dbm: -70,
                encryption_blacklist: vec![Encryption::None, Encryption::Wep],
            }),
            RuleKind::MacSpoofing => Self::MacSpoofing(MacSpoofingThresholds {
                same_vendor_macs: 3,
            }),
            RuleKind::WeakEncryption => Self::WeakEncryption(WeakEncryptionThresholds {
                weak_encryption_types: vec![Encryption::Wep, Encryption::Wpa],
            }),
        }
    }
}

// ── DetectionRule ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct DetectionRule {
    pub id: RuleKind,
    pub enabled: bool,
    pub severity: Severity,
    #[serde(rename = "message")]
    template: MessageTemplate,
    suppress_after_hours: u32,
    thresholds: Thresholds,
}

impl DetectionRule {
    /// Build a rule, validating its template against the fields the
    /// detector supplies for the rule's family.
    pub fn new(
        severity: Severity,
        message: &str,
        suppress_after_hours: u32,
        thresholds: Thresholds,
    ) -> Result<Self, CoreError> {
        let id = thresholds.kind();
        let template = MessageTemplate::parse(message)
            .map_err(|reason| CoreError::InvalidTemplate { rule: id, reason })?;

        if let Some(missing) = template
            .placeholders()
            .find(|p| !id.detail_fields().contains(p))
        {
            return Err(CoreError::TemplateRender {
                rule: id,
                placeholder: missing.to_owned(),
            });
        }

        if let Thresholds::MacSpoofing(t) = &thresholds {
            if t.same_vendor_macs == 0 {
                return Err(CoreError::InvalidRule {
                    message: "mac_spoofing.same_vendor_macs must be at least 1".into(),
                });
            }
        }

        Ok(Self {
            id,
            enabled: true,
            severity,
            template,
            suppress_after_hours,
            thresholds,
        })
    }

    /// The built-in definition of a rule family.
    pub fn builtin(kind: RuleKind) -> Self {
        let (severity, message, hours) = match kind {
            RuleKind::RogueAp => (
                Severity::High,
                "Rogue access point detected: {ssid} ({bssid})",
                24,
            ),
            RuleKind::MacSpoofing => (
                Severity::High,
                "Possible MAC address spoofing detected for vendor {vendor}",
                1,
            ),
            RuleKind::WeakEncryption => (
                Severity::Medium,
                "Weak encryption detected: {ssid} uses {encryption}",
                24,
            ),
        };
        Self::new(severity, message, hours, Thresholds::default_for(kind))
            .expect("built-in rule definitions are valid")
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn template(&self) -> &MessageTemplate {
        &self.template
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn suppress_after_hours(&self) -> u32 {
        self.suppress_after_hours
    }

    pub fn suppress_after(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.suppress_after_hours))
    }

    /// Build a fresh, unacknowledged alert for `entity` (BSSID or OUI).
    pub(crate) fn raise(
        &self,
        entity: &str,
        details: AlertDetails,
        now: DateTime<Utc>,
    ) -> Result<Alert, CoreError> {
        if details.rule() != self.id {
            return Err(CoreError::InvalidRule {
                message: format!("{} details passed to rule {}", details.rule(), self.id),
            });
        }
        let message = self.template.render(self.id, &details)?;
        Ok(Alert {
            id: self.id.alert_id(entity),
            rule: self.id,
            severity: self.severity,
            message,
            created_at: now,
            source: entity.to_owned(),
            details,
            acknowledged: false,
        })
    }
}

// ── RuleCatalog ──────────────────────────────────────────────────────

/// Read-only registry of detection rules, keyed by family.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    rules: IndexMap<RuleKind, DetectionRule>,
}

impl RuleCatalog {
    pub fn empty() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }

    /// The three built-in rule families with their default parameters.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for kind in [RuleKind::RogueAp, RuleKind::MacSpoofing, RuleKind::WeakEncryption] {
            catalog.insert(DetectionRule::builtin(kind));
        }
        catalog
    }

    /// Add or replace the rule for its family. Returns the replaced rule.
    pub fn insert(&mut self, rule: DetectionRule) -> Option<DetectionRule> {
        self.rules.insert(rule.id, rule)
    }

    pub fn get(&self, kind: RuleKind) -> Option<&DetectionRule> {
        self.rules.get(&kind)
    }

    /// The rule for `kind`, only if it exists and is enabled.
    pub fn enabled(&self, kind: RuleKind) -> Option<&DetectionRule> {
        self.get(kind).filter(|r| r.enabled)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectionRule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Expiry window for alerts raised by `kind`.
    pub fn suppress_after(&self, kind: RuleKind) -> TimeDelta {
        self.get(kind).map_or_else(
            || TimeDelta::hours(i64::from(FALLBACK_SUPPRESS_HOURS)),
            DetectionRule::suppress_after,
        )
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn builtin_catalog_matches_reference_table() {
        let catalog = RuleCatalog::builtin();
        assert_eq!(catalog.len(), 3);

        let rogue = catalog.get(RuleKind::RogueAp).unwrap();
        assert_eq!(rogue.severity, Severity::High);
        assert_eq!(rogue.suppress_after_hours(), 24);

        let spoof = catalog.get(RuleKind::MacSpoofing).unwrap();
        assert_eq!(spoof.suppress_after_hours(), 1);
        assert_eq!(
            spoof.thresholds(),
            &Thresholds::MacSpoofing(MacSpoofingThresholds { same_vendor_macs: 3 })
        );

        let weak = catalog.get(RuleKind::WeakEncryption).unwrap();
        assert_eq!(weak.severity, Severity::Medium);
    }

    #[test]
    fn builtin_templates_only_reference_supplied_fields() {
        for kind in RuleKind::iter() {
            let rule = DetectionRule::builtin(kind);
            for placeholder in rule.template().placeholders() {
                assert!(kind.detail_fields().contains(&placeholder), "{kind}: {placeholder}");
            }
        }
    }

    #[test]
    fn new_rejects_placeholder_the_rule_cannot_fill() {
        let err = DetectionRule::new(
            Severity::High,
            "Rogue {vendor}",
            24,
            Thresholds::default_for(RuleKind::RogueAp),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::TemplateRender { rule: RuleKind::RogueAp, .. }));
    }

    #[test]
    fn new_rejects_zero_spoofing_threshold() {
        let err = DetectionRule::new(
            Severity::High,
            "spoof {oui}",
            1,
            Thresholds::MacSpoofing(MacSpoofingThresholds { same_vendor_macs: 0 }),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidRule { .. }));
    }

    #[test]
    fn disabled_rules_are_hidden_from_enabled_lookup() {
        let mut catalog = RuleCatalog::builtin();
        catalog.insert(DetectionRule::builtin(RuleKind::RogueAp).with_enabled(false));
        assert!(catalog.get(RuleKind::RogueAp).is_some());
        assert!(catalog.enabled(RuleKind::RogueAp).is_none());
    }

    #[test]
    fn suppress_after_falls_back_for_missing_rule() {
        let catalog = RuleCatalog::empty();
        assert_eq!(catalog.suppress_after(RuleKind::MacSpoofing), TimeDelta::hours(24));
    }

    #[test]
    fn alert_ids_are_prefixed_per_family() {
        assert_eq!(RuleKind::RogueAp.alert_id("AA").as_str(), "rogue_ap_AA");
        assert_eq!(RuleKind::WeakEncryption.alert_id("AA").as_str(), "weak_enc_AA");
        assert_eq!(RuleKind::MacSpoofing.alert_id("00:1B:63").as_str(), "mac_spoofing_00:1B:63");
    }

    #[test]
    fn raise_renders_message() {
        let rule = DetectionRule::builtin(RuleKind::RogueAp);
        let now = Utc::now();
        let alert = rule
            .raise(
                "AA:AA:AA:AA:AA:02",
                AlertDetails::RogueAp {
                    ssid: "Cafe".into(),
                    bssid: "AA:AA:AA:AA:AA:02".into(),
                },
                now,
            )
            .unwrap();
        assert_eq!(alert.message, "Rogue access point detected: Cafe (AA:AA:AA:AA:AA:02)");
        assert_eq!(alert.created_at, now);
        assert!(!alert.is_acknowledged());
    }
}
