// ── Domain model ──
//
// Snapshot inputs (devices, access points) and the alerts derived from
// them. Snapshot records are immutable once normalized; alerts are owned
// by the `AlertStore` after admission.

pub mod alert;
pub mod identity;
pub mod snapshot;

// ── Re-exports ──────────────────────────────────────────────────────

pub use alert::{Alert, AlertDetails, AlertId, Severity};
pub use identity::{MacAddress, Oui};
pub use snapshot::{AccessPointRecord, DeviceRecord, DeviceType, Encryption, Snapshot, Zone};
