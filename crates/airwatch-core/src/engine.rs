// ── Analysis engine ──
//
// Composition root: detector → alert store, followed by an expiry pass
// on every cycle so the active set heals itself.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::detector::Detector;
use crate::error::CoreError;
use crate::model::{AccessPointRecord, Alert, DeviceRecord, Snapshot};
use crate::rules::RuleCatalog;
use crate::store::AlertStore;
use crate::vendor::VendorTable;

/// Owns the alert store and runs analysis cycles against it.
///
/// Not internally synchronized. Concurrent hosts either wrap it in a
/// lock or hand it to [`EngineHandle`](crate::EngineHandle).
pub struct Engine {
    catalog: Arc<RuleCatalog>,
    detector: Detector,
    store: AlertStore,
}

impl Engine {
    pub fn new(catalog: RuleCatalog, vendors: VendorTable) -> Self {
        let catalog = Arc::new(catalog);
        Self {
            detector: Detector::new(Arc::clone(&catalog), vendors),
            catalog,
            store: AlertStore::new(),
        }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &AlertStore {
        &self.store
    }

    /// Run one analysis cycle at the current wall-clock time.
    pub fn analyze(
        &mut self,
        devices: &[DeviceRecord],
        access_points: &[AccessPointRecord],
    ) -> Vec<Alert> {
        self.analyze_at(devices, access_points, Utc::now())
    }

    /// Run one analysis cycle with an explicit clock reading.
    pub fn analyze_at(
        &mut self,
        devices: &[DeviceRecord],
        access_points: &[AccessPointRecord],
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        let candidates = self.detector.evaluate(devices, access_points, now);
        let candidate_count = candidates.len();
        let raised = self.store.admit(candidates);
        let expired = self.store.expire_stale(&self.catalog, now);

        debug!(
            devices = devices.len(),
            access_points = access_points.len(),
            candidates = candidate_count,
            raised = raised.len(),
            expired = expired.len(),
            active = self.store.active_count(),
            "analysis cycle complete"
        );
        raised
    }

    pub fn analyze_snapshot(&mut self, snapshot: &Snapshot) -> Vec<Alert> {
        self.analyze(&snapshot.devices, &snapshot.access_points)
    }

    /// Retire stale alerts without running detection.
    pub fn expire_stale(&mut self, now: DateTime<Utc>) -> Vec<Alert> {
        self.store.expire_stale(&self.catalog, now)
    }

    pub fn acknowledge(&mut self, alert_id: &str) -> Result<Alert, CoreError> {
        self.store.acknowledge(alert_id)
    }

    pub fn list_active(&self) -> Vec<Alert> {
        self.store.active()
    }

    pub fn list_history(&self) -> Vec<Alert> {
        self.store.history().to_vec()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(RuleCatalog::builtin(), VendorTable::builtin())
    }
}
