// ── Rule evaluation ──
//
// Scans one snapshot against the rule catalog and returns candidate
// alerts. The detector is stateless: it neither reads nor mutates the
// alert store, so every call re-emits conditions that are still present.
// Deduplication happens on admission.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{AccessPointRecord, Alert, AlertDetails, DeviceRecord, Oui};
use crate::rules::{RuleCatalog, RuleKind, Thresholds};
use crate::vendor::VendorTable;

/// Sample identifiers attached to a MAC-spoofing alert, first-seen order.
pub const MAX_SAMPLE_ADDRESSES: usize = 5;

pub struct Detector {
    catalog: Arc<RuleCatalog>,
    vendors: VendorTable,
}

impl Detector {
    pub fn new(catalog: Arc<RuleCatalog>, vendors: VendorTable) -> Self {
        Self { catalog, vendors }
    }

    /// Evaluate every enabled rule against one snapshot.
    ///
    /// Access-point candidates come first in input order (rogue before
    /// weak-encryption for the same AP), followed by one candidate per
    /// offending OUI group in first-seen order.
    pub fn evaluate(
        &self,
        devices: &[DeviceRecord],
        access_points: &[AccessPointRecord],
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        let mut candidates = Vec::new();
        self.scan_access_points(access_points, now, &mut candidates);
        self.scan_devices(devices, now, &mut candidates);
        candidates
    }

    fn scan_access_points(
        &self,
        access_points: &[AccessPointRecord],
        now: DateTime<Utc>,
        out: &mut Vec<Alert>,
    ) {
        let rogue = self.catalog.enabled(RuleKind::RogueAp);
        let weak = self
            .catalog
            .enabled(RuleKind::WeakEncryption)
            .and_then(|rule| match rule.thresholds() {
                Thresholds::WeakEncryption(t) => Some((rule, t)),
                _ => None,
            });

        if rogue.is_none() && weak.is_none() {
            return;
        }

        // First BSSID seen for each SSID is canonical.
        let mut canonical: HashMap<&str, &str> = HashMap::new();

        for ap in access_points {
            if ap.ssid.is_empty() || ap.bssid.is_empty() {
                debug!(bssid = %ap.bssid, ssid = %ap.ssid, "skipping access point without identity");
                continue;
            }

            if let Some(rule) = rogue {
                match canonical.get(ap.ssid.as_str()) {
                    Some(first) if *first != ap.bssid => {
                        let details = AlertDetails::RogueAp {
                            ssid: ap.ssid.clone(),
                            bssid: ap.bssid.clone(),
                        };
                        push_candidate(out, rule.raise(&ap.bssid, details, now));
                    }
                    Some(_) => {}
                    None => {
                        canonical.insert(&ap.ssid, &ap.bssid);
                    }
                }
            }

            if let Some((rule, thresholds)) = weak {
                if thresholds.weak_encryption_types.contains(&ap.encryption) {
                    let details = AlertDetails::WeakEncryption {
                        ssid: ap.ssid.clone(),
                        bssid: ap.bssid.clone(),
                        encryption: ap.encryption,
                    };
                    push_candidate(out, rule.raise(&ap.bssid, details, now));
                }
            }
        }
    }

    fn scan_devices(&self, devices: &[DeviceRecord], now: DateTime<Utc>, out: &mut Vec<Alert>) {
        let Some((rule, threshold)) = self
            .catalog
            .enabled(RuleKind::MacSpoofing)
            .and_then(|rule| match rule.thresholds() {
                Thresholds::MacSpoofing(t) => Some((rule, t.same_vendor_macs)),
                _ => None,
            })
        else {
            return;
        };

        let mut groups: IndexMap<Oui, IndexSet<String>> = IndexMap::new();
        for device in devices {
            let Some(oui) = Oui::from_identifier(&device.mac) else {
                debug!(mac = %device.mac, "skipping device without vendor prefix");
                continue;
            };
            groups
                .entry(oui)
                .or_default()
                .insert(device.mac.trim().to_ascii_uppercase());
        }

        for (oui, macs) in &groups {
            if macs.len() < threshold {
                continue;
            }
            let details = AlertDetails::MacSpoofing {
                vendor: self.vendors.display_name(oui),
                oui: oui.clone(),
                device_count: macs.len(),
                mac_addresses: macs.iter().take(MAX_SAMPLE_ADDRESSES).cloned().collect(),
            };
            push_candidate(out, rule.raise(oui.as_str(), details, now));
        }
    }
}

/// Keep a successfully built candidate; log and drop a broken one.
fn push_candidate(out: &mut Vec<Alert>, candidate: Result<Alert, CoreError>) {
    match candidate {
        Ok(alert) => out.push(alert),
        Err(e) => warn!(error = %e, "dropping alert candidate"),
    }
}
