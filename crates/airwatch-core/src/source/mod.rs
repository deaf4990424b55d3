// ── Snapshot sources ──
//
// Where device/access-point observations come from. The engine only
// sees normalized `Snapshot`s; sources own reading, decoding, cleaning
// and (optionally) anonymizing.

mod kismet;
mod raw;

use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::anonymize::MacAnonymizer;
use crate::error::CoreError;
use crate::model::{AccessPointRecord, DeviceRecord, Snapshot};

use raw::{RawAccessPoint, RawDevice, RawDocument, RawSnapshot};

pub use kismet::{DEVICES_PATH, KismetSource};

/// Produces one snapshot per call.
pub trait SnapshotSource: Send + Sync {
    fn load(&self) -> impl Future<Output = Result<Snapshot, CoreError>> + Send;
}

// ── JsonFileSource ───────────────────────────────────────────────

/// Reads `{ "devices": [...], "access_points": [...] }` from a file on
/// every `load`, so an external collector can rewrite it between cycles.
#[derive(Debug)]
pub struct JsonFileSource {
    path: PathBuf,
    anonymizer: Option<MacAnonymizer>,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            anonymizer: None,
        }
    }

    /// Replace device MACs with daily-salted identifiers on load.
    pub fn with_anonymizer(mut self, anonymizer: MacAnonymizer) -> Self {
        self.anonymizer = Some(anonymizer);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode and normalize a snapshot document.
    pub fn decode(&self, bytes: &[u8]) -> Result<Snapshot, CoreError> {
        decode_snapshot(
            bytes,
            &self.path.display().to_string(),
            self.anonymizer.as_ref(),
        )
    }
}

impl SnapshotSource for JsonFileSource {
    async fn load(&self) -> Result<Snapshot, CoreError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| CoreError::Snapshot {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;
        self.decode(&bytes)
    }
}

// ── AnySource ────────────────────────────────────────────────────

/// Whichever source the configuration selected.
#[derive(Debug)]
pub enum AnySource {
    File(JsonFileSource),
    Kismet(KismetSource),
}

impl AnySource {
    /// Where snapshots come from, for logs and banners.
    pub fn describe(&self) -> String {
        match self {
            Self::File(source) => source.path().display().to_string(),
            Self::Kismet(source) => source.devices_url().to_string(),
        }
    }
}

impl SnapshotSource for AnySource {
    async fn load(&self) -> Result<Snapshot, CoreError> {
        match self {
            Self::File(source) => source.load().await,
            Self::Kismet(source) => source.load().await,
        }
    }
}

impl From<JsonFileSource> for AnySource {
    fn from(source: JsonFileSource) -> Self {
        Self::File(source)
    }
}

impl From<KismetSource> for AnySource {
    fn from(source: KismetSource) -> Self {
        Self::Kismet(source)
    }
}

// ── Decoding ─────────────────────────────────────────────────────

/// Parse a snapshot document (object or bare device array), clean every
/// record and anonymize device MACs. `origin` names the file or URL in
/// errors and logs.
fn decode_snapshot(
    bytes: &[u8],
    origin: &str,
    anonymizer: Option<&MacAnonymizer>,
) -> Result<Snapshot, CoreError> {
    let raw: RawSnapshot = serde_json::from_slice::<RawDocument>(bytes)
        .map_err(|e| CoreError::Snapshot {
            path: origin.to_owned(),
            reason: e.to_string(),
        })?
        .into();

    let mut devices: Vec<DeviceRecord> = decode_records::<RawDevice, _>(raw.devices, "device");
    let access_points: Vec<AccessPointRecord> =
        decode_records::<RawAccessPoint, _>(raw.access_points, "access point");

    if let Some(anonymizer) = anonymizer {
        for device in devices.iter_mut().filter(|d| !d.mac.is_empty()) {
            device.mac = anonymizer.anonymize(&device.mac)?;
        }
    }

    debug!(
        origin,
        devices = devices.len(),
        access_points = access_points.len(),
        "snapshot loaded"
    );
    Ok(Snapshot {
        devices,
        access_points,
    })
}

/// Decode each raw record, dropping the ones that do not fit the shape.
fn decode_records<R, T>(values: Vec<serde_json::Value>, kind: &str) -> Vec<T>
where
    R: serde::de::DeserializeOwned,
    T: From<R>,
{
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<R>(value) {
            Ok(raw) => Some(T::from(raw)),
            Err(e) => {
                warn!(index, kind, error = %e, "dropping undecodable record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Encryption;
    use secrecy::SecretString;
    use std::io::Write;

    const DOC: &str = r#"{
        "devices": [
            { "mac": "00:1b:63:00:00:01", "signal_strength": -40, "ssids": ["Cafe"], "device_type": "phone", "zone": "cafe" },
            { "mac": "00:1b:63:00:00:02", "ssids": "not-a-list" },
            { "mac": "bogus" }
        ],
        "access_points": [
            { "bssid": "aa:aa:aa:aa:aa:01", "ssid": "Cafe", "encryption": "wep", "channel": 6, "signal_strength": -50 }
        ]
    }"#;

    fn write_doc(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn loads_and_normalizes_file() {
        let file = write_doc(DOC);
        let snapshot = JsonFileSource::new(file.path()).load().await.unwrap();

        assert_eq!(snapshot.devices.len(), 2);
        assert_eq!(snapshot.devices[0].mac, "00:1B:63:00:00:01");
        assert_eq!(snapshot.devices[1].mac, "");
        assert_eq!(snapshot.access_points[0].encryption, Encryption::Wep);
    }

    #[tokio::test]
    async fn missing_arrays_are_empty() {
        let file = write_doc("{}");
        let snapshot = JsonFileSource::new(file.path()).load().await.unwrap();
        assert_eq!(snapshot, Snapshot::default());
    }

    #[tokio::test]
    async fn missing_file_is_snapshot_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonFileSource::new(dir.path().join("absent.json"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Snapshot { .. }));
    }

    #[test]
    fn malformed_document_is_snapshot_error() {
        let err = JsonFileSource::new("inline.json")
            .decode(b"[not json")
            .unwrap_err();
        assert!(matches!(err, CoreError::Snapshot { path, .. } if path == "inline.json"));
    }

    #[test]
    fn bare_device_array_has_no_access_points() {
        let snapshot = JsonFileSource::new("inline.json")
            .decode(br#"[{ "mac": "00:1b:63:00:00:09", "zone": "lab" }]"#)
            .unwrap();
        assert_eq!(snapshot.devices.len(), 1);
        assert_eq!(snapshot.devices[0].mac, "00:1B:63:00:00:09");
        assert!(snapshot.access_points.is_empty());
    }

    #[test]
    fn anonymizer_keeps_vendor_prefix() {
        let source = JsonFileSource::new("inline.json")
            .with_anonymizer(MacAnonymizer::new(SecretString::from("test".to_owned())));
        let snapshot = source.decode(DOC.as_bytes()).unwrap();

        assert!(snapshot.devices[0].mac.starts_with("00:1B:63:"));
        assert_ne!(snapshot.devices[0].mac, "00:1B:63:00:00:01");
        assert_eq!(snapshot.devices[1].mac, "");
    }
}
