// ── Alert queries ──
//
// Filtering for alert listings (active set or history). Bounds are
// inclusive; results are newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Alert, Severity};
use crate::rules::RuleKind;

pub const DEFAULT_LIMIT: usize = 100;
pub const MAX_LIMIT: usize = 1000;

/// Query over a list of alerts. Every `None` field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<RuleKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl AlertQuery {
    pub fn matches(&self, alert: &Alert) -> bool {
        if self.severity.is_some_and(|s| alert.severity != s) {
            return false;
        }
        if self.rule.is_some_and(|r| alert.rule != r) {
            return false;
        }
        if self
            .acknowledged
            .is_some_and(|ack| alert.is_acknowledged() != ack)
        {
            return false;
        }
        if self.since.is_some_and(|since| alert.created_at < since) {
            return false;
        }
        if self.until.is_some_and(|until| alert.created_at > until) {
            return false;
        }
        true
    }

    /// Requested limit, defaulted and capped.
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
    }

    /// Keep matching alerts, newest first, truncated to the limit.
    pub fn apply(&self, alerts: impl IntoIterator<Item = Alert>) -> Vec<Alert> {
        let mut selected: Vec<Alert> = alerts.into_iter().filter(|a| self.matches(a)).collect();
        // Stable sort keeps admission order among equal timestamps.
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        selected.truncate(self.effective_limit());
        selected
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::AlertDetails;
    use crate::rules::DetectionRule;
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;

    fn weak(bssid: &str, created_at: DateTime<Utc>) -> Alert {
        DetectionRule::builtin(RuleKind::WeakEncryption)
            .raise(
                bssid,
                AlertDetails::WeakEncryption {
                    ssid: "Shop".into(),
                    bssid: bssid.into(),
                    encryption: crate::model::Encryption::Wep,
                },
                created_at,
            )
            .unwrap()
    }

    fn rogue(bssid: &str, created_at: DateTime<Utc>) -> Alert {
        DetectionRule::builtin(RuleKind::RogueAp)
            .raise(
                bssid,
                AlertDetails::RogueAp {
                    ssid: "Shop".into(),
                    bssid: bssid.into(),
                },
                created_at,
            )
            .unwrap()
    }

    fn ids(alerts: &[Alert]) -> Vec<&str> {
        alerts.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn default_query_sorts_newest_first() {
        let t0 = Utc::now();
        let alerts = vec![
            rogue("01", t0),
            weak("02", t0 + TimeDelta::minutes(2)),
            rogue("03", t0 + TimeDelta::minutes(1)),
        ];
        let out = AlertQuery::default().apply(alerts);
        assert_eq!(ids(&out), vec!["weak_enc_02", "rogue_ap_03", "rogue_ap_01"]);
    }

    #[test]
    fn filters_by_rule_and_severity() {
        let t0 = Utc::now();
        let alerts = vec![rogue("01", t0), weak("02", t0)];

        let by_rule = AlertQuery {
            rule: Some(RuleKind::WeakEncryption),
            ..AlertQuery::default()
        };
        assert_eq!(ids(&by_rule.apply(alerts.clone())), vec!["weak_enc_02"]);

        let by_severity = AlertQuery {
            severity: Some(Severity::High),
            ..AlertQuery::default()
        };
        assert_eq!(ids(&by_severity.apply(alerts)), vec!["rogue_ap_01"]);
    }

    #[test]
    fn time_bounds_are_inclusive() {
        let t0 = Utc::now();
        let alerts = vec![
            rogue("01", t0),
            rogue("02", t0 + TimeDelta::hours(1)),
            rogue("03", t0 + TimeDelta::hours(2)),
        ];
        let query = AlertQuery {
            since: Some(t0 + TimeDelta::hours(1)),
            until: Some(t0 + TimeDelta::hours(2)),
            ..AlertQuery::default()
        };
        assert_eq!(ids(&query.apply(alerts)), vec!["rogue_ap_03", "rogue_ap_02"]);
    }

    #[test]
    fn acknowledged_filter() {
        let mut acked = rogue("01", Utc::now());
        acked.acknowledge();
        let alerts = vec![acked, rogue("02", Utc::now())];

        let query = AlertQuery {
            acknowledged: Some(false),
            ..AlertQuery::default()
        };
        assert_eq!(ids(&query.apply(alerts)), vec!["rogue_ap_02"]);
    }

    #[test]
    fn limit_defaults_and_caps() {
        assert_eq!(AlertQuery::default().effective_limit(), DEFAULT_LIMIT);
        let huge = AlertQuery {
            limit: Some(50_000),
            ..AlertQuery::default()
        };
        assert_eq!(huge.effective_limit(), MAX_LIMIT);
    }

    #[test]
    fn limit_applies_after_sorting() {
        let t0 = Utc::now();
        let alerts = vec![rogue("old", t0), rogue("new", t0 + TimeDelta::minutes(1))];
        let query = AlertQuery {
            limit: Some(1),
            ..AlertQuery::default()
        };
        assert_eq!(ids(&query.apply(alerts)), vec!["rogue_ap_new"]);
    }
}
