// ── Alert lifecycle store ──
//
// Owns every admitted alert. The active map deduplicates by `AlertId`;
// history records each admission once and is never pruned. Callers
// serialize access (single owner, external lock, or the engine task).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::{Alert, AlertId};
use crate::rules::RuleCatalog;

#[derive(Debug, Default)]
pub struct AlertStore {
    active: IndexMap<AlertId, Alert>,
    history: Vec<Alert>,
    acknowledged: HashSet<AlertId>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit candidate alerts, returning only the newly raised ones.
    ///
    /// A candidate whose id is already active is dropped untouched: the
    /// existing record keeps its `created_at` and acknowledgment.
    pub fn admit(&mut self, candidates: Vec<Alert>) -> Vec<Alert> {
        let mut raised = Vec::new();
        for alert in candidates {
            if self.active.contains_key(&alert.id) {
                continue;
            }
            info!(
                alert_id = %alert.id,
                rule = %alert.rule,
                severity = %alert.severity,
                "[ALERT] {} - {}",
                alert.rule,
                alert.message
            );
            self.active.insert(alert.id.clone(), alert.clone());
            self.history.push(alert.clone());
            raised.push(alert);
        }
        raised
    }

    /// Retire active alerts older than their rule's suppression window.
    ///
    /// Returns the retired alerts. History and the acknowledged-id set
    /// are left untouched.
    pub fn expire_stale(&mut self, catalog: &RuleCatalog, now: DateTime<Utc>) -> Vec<Alert> {
        let stale: Vec<AlertId> = self
            .active
            .values()
            .filter(|a| now - a.created_at > catalog.suppress_after(a.rule))
            .map(|a| a.id.clone())
            .collect();

        let mut expired = Vec::with_capacity(stale.len());
        for id in stale {
            if let Some(alert) = self.active.shift_remove(&id) {
                debug!(alert_id = %id, "alert expired from active set");
                expired.push(alert);
            }
        }
        expired
    }

    /// Mark an active alert as reviewed.
    ///
    /// Only the active set is consulted; an id that exists solely in
    /// history (already expired) is `AlertNotFound`. Repeated calls
    /// succeed and leave the alert unchanged.
    pub fn acknowledge(&mut self, alert_id: &str) -> Result<Alert, CoreError> {
        let alert = self
            .active
            .get_mut(alert_id)
            .ok_or_else(|| CoreError::AlertNotFound {
                alert_id: alert_id.to_owned(),
            })?;

        if !alert.is_acknowledged() {
            alert.acknowledge();
            let created_at = alert.created_at;
            // Keep the history copy of this admission in sync.
            if let Some(entry) = self
                .history
                .iter_mut()
                .rev()
                .find(|h| h.id.as_str() == alert_id && h.created_at == created_at)
            {
                entry.acknowledge();
            }
            debug!(alert_id, "alert acknowledged");
        }
        self.acknowledged.insert(alert.id.clone());
        Ok(alert.clone())
    }

    pub fn get(&self, alert_id: &str) -> Option<&Alert> {
        self.active.get(alert_id)
    }

    /// Active alerts in admission order.
    pub fn active(&self) -> Vec<Alert> {
        self.active.values().cloned().collect()
    }

    /// Every alert ever admitted, in admission order.
    pub fn history(&self) -> &[Alert] {
        &self.history
    }

    /// Whether any admission of `alert_id` was ever acknowledged. Like
    /// history, this survives expiry; a re-raised alert still starts out
    /// unacknowledged on its own record.
    pub fn is_acknowledged(&self, alert_id: &str) -> bool {
        self.acknowledged.contains(alert_id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn history_count(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::AlertDetails;
    use crate::rules::{DetectionRule, RuleKind};
    use chrono::TimeDelta;

    fn spoofing_alert(oui: &str, created_at: DateTime<Utc>) -> Alert {
        DetectionRule::builtin(RuleKind::MacSpoofing)
            .raise(
                oui,
                AlertDetails::MacSpoofing {
                    vendor: "Apple".into(),
                    oui: oui.parse().unwrap(),
                    device_count: 3,
                    mac_addresses: Vec::new(),
                },
                created_at,
            )
            .unwrap()
    }

    fn rogue_alert(bssid: &str, created_at: DateTime<Utc>) -> Alert {
        DetectionRule::builtin(RuleKind::RogueAp)
            .raise(
                bssid,
                AlertDetails::RogueAp {
                    ssid: "Cafe".into(),
                    bssid: bssid.into(),
                },
                created_at,
            )
            .unwrap()
    }

    #[test]
    fn admit_deduplicates_by_id() {
        let mut store = AlertStore::new();
        let first = Utc::now();
        let raised = store.admit(vec![rogue_alert("AA:01", first)]);
        assert_eq!(raised.len(), 1);

        let later = first + TimeDelta::minutes(5);
        let raised = store.admit(vec![rogue_alert("AA:01", later), rogue_alert("AA:02", later)]);
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].id.as_str(), "rogue_ap_AA:02");

        assert_eq!(store.active_count(), 2);
        assert_eq!(store.history_count(), 2);
        assert_eq!(store.get("rogue_ap_AA:01").unwrap().created_at, first);
    }

    #[test]
    fn duplicate_candidates_in_one_batch_admit_once() {
        let mut store = AlertStore::new();
        let now = Utc::now();
        let raised = store.admit(vec![rogue_alert("AA:01", now), rogue_alert("AA:01", now)]);
        assert_eq!(raised.len(), 1);
        assert_eq!(store.history_count(), 1);
    }

    #[test]
    fn expire_stale_retires_active_but_keeps_history() {
        let mut store = AlertStore::new();
        let now = Utc::now();
        store.admit(vec![
            spoofing_alert("00:1B:63", now - TimeDelta::hours(2)),
            rogue_alert("AA:01", now - TimeDelta::hours(2)),
        ]);

        let expired = store.expire_stale(&RuleCatalog::builtin(), now);
        assert_eq!(expired.len(), 1);
        assert!(store.get("mac_spoofing_00:1B:63").is_none());
        assert!(store.get("rogue_ap_AA:01").is_some());
        assert_eq!(store.history_count(), 2);
    }

    #[test]
    fn expiry_window_is_exclusive() {
        let mut store = AlertStore::new();
        let now = Utc::now();
        store.admit(vec![spoofing_alert("00:1B:63", now - TimeDelta::hours(1))]);
        assert!(store.expire_stale(&RuleCatalog::builtin(), now).is_empty());
        assert_eq!(store.active_count(), 1);
    }

    #[test]
    fn expired_alert_can_be_raised_again() {
        let mut store = AlertStore::new();
        let now = Utc::now();
        store.admit(vec![spoofing_alert("00:1B:63", now - TimeDelta::hours(3))]);
        store.expire_stale(&RuleCatalog::builtin(), now);

        let raised = store.admit(vec![spoofing_alert("00:1B:63", now)]);
        assert_eq!(raised.len(), 1);
        assert_eq!(store.history_count(), 2);
    }

    #[test]
    fn acknowledged_ids_survive_expiry_like_history() {
        let mut store = AlertStore::new();
        let now = Utc::now();
        store.admit(vec![spoofing_alert("00:1B:63", now - TimeDelta::hours(3))]);
        store.acknowledge("mac_spoofing_00:1B:63").unwrap();

        store.expire_stale(&RuleCatalog::builtin(), now);
        assert!(store.is_acknowledged("mac_spoofing_00:1B:63"));
        assert!(store.history()[0].is_acknowledged());

        store.admit(vec![spoofing_alert("00:1B:63", now)]);
        assert!(!store.get("mac_spoofing_00:1B:63").unwrap().is_acknowledged());
        assert!(!store.history()[1].is_acknowledged());
        assert!(store.is_acknowledged("mac_spoofing_00:1B:63"));
    }

    #[test]
    fn acknowledge_unknown_id_is_not_found() {
        let mut store = AlertStore::new();
        let err = store.acknowledge("rogue_ap_nope").unwrap_err();
        assert!(matches!(err, CoreError::AlertNotFound { alert_id } if alert_id == "rogue_ap_nope"));
    }

    #[test]
    fn acknowledge_expired_id_is_not_found() {
        let mut store = AlertStore::new();
        let now = Utc::now();
        store.admit(vec![spoofing_alert("00:1B:63", now - TimeDelta::hours(2))]);
        store.expire_stale(&RuleCatalog::builtin(), now);
        assert!(store.acknowledge("mac_spoofing_00:1B:63").is_err());
    }

    #[test]
    fn acknowledge_is_idempotent_and_mirrors_history() {
        let mut store = AlertStore::new();
        store.admit(vec![rogue_alert("AA:01", Utc::now())]);

        let first = store.acknowledge("rogue_ap_AA:01").unwrap();
        assert!(first.is_acknowledged());
        let second = store.acknowledge("rogue_ap_AA:01").unwrap();
        assert_eq!(first, second);

        assert!(store.is_acknowledged("rogue_ap_AA:01"));
        assert!(store.history()[0].is_acknowledged());
    }

    #[test]
    fn readmission_does_not_reset_acknowledgment() {
        let mut store = AlertStore::new();
        let now = Utc::now();
        store.admit(vec![rogue_alert("AA:01", now)]);
        store.acknowledge("rogue_ap_AA:01").unwrap();

        store.admit(vec![rogue_alert("AA:01", now + TimeDelta::minutes(1))]);
        assert!(store.get("rogue_ap_AA:01").unwrap().is_acknowledged());
    }
}
