//! Alert detection and lifecycle engine for wireless snapshots.
//!
//! Feed the engine periodic snapshots of nearby client devices and
//! access points; it evaluates a small rule catalog and keeps a
//! deduplicated, expiring set of security alerts:
//!
//! - **[`RuleCatalog`]**: Built-in `rogue_ap`, `mac_spoofing` and
//!   `weak_encryption` rules with severities, message templates,
//!   suppression windows and typed thresholds. Templates are validated
//!   when a rule is built, so rendering cannot fail at alert time.
//!
//! - **[`Detector`]**: Stateless evaluation of one snapshot against the
//!   catalog, producing candidate [`Alert`]s with deterministic ids.
//!
//! - **[`AlertStore`]**: Active set keyed by [`AlertId`] plus an
//!   append-only history. Handles admission, acknowledgment and
//!   time-window expiry.
//!
//! - **[`Engine`]**: Detector → store on each cycle. Wrap it in an
//!   [`EngineHandle`] to share it between tasks over an `mpsc` channel.
//!
//! - **[`source`]**: [`SnapshotSource`] trait with a JSON file source and
//!   a live [`KismetSource`]. Both normalize raw collector output,
//!   optionally anonymizing MACs with a [`MacAnonymizer`].

pub mod anonymize;
pub mod detector;
pub mod engine;
pub mod error;
pub mod filter;
pub mod handle;
pub mod model;
pub mod rules;
pub mod source;
pub mod store;
pub mod vendor;

// ── Primary re-exports ──────────────────────────────────────────────
pub use anonymize::MacAnonymizer;
pub use detector::Detector;
pub use engine::Engine;
pub use error::CoreError;
pub use filter::AlertQuery;
pub use handle::EngineHandle;
pub use rules::{
    DetectionRule, MacSpoofingThresholds, MessageTemplate, RogueApThresholds, RuleCatalog,
    RuleKind, Thresholds, WeakEncryptionThresholds,
};
pub use source::{AnySource, JsonFileSource, KismetSource, SnapshotSource};
pub use store::AlertStore;
pub use vendor::VendorTable;

pub use model::{
    AccessPointRecord, Alert, AlertDetails, AlertId, DeviceRecord, DeviceType, Encryption,
    MacAddress, Oui, Severity, Snapshot, Zone,
};
