// ── Alert storage ──
//
// Active set keyed by alert identity plus an append-only history log.

mod alert_store;

pub use alert_store::AlertStore;
