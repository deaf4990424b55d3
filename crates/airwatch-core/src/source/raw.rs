// ── Raw snapshot records ──
//
// Wire shapes as collectors emit them, plus the `From` impls that clean
// them into domain records. Every field is optional and loosely typed;
// normalization clamps or defaults instead of failing.

use indexmap::IndexSet;
use serde::Deserialize;
use serde_json::Value;

use crate::model::{AccessPointRecord, DeviceRecord, DeviceType, Encryption, MacAddress, Zone};

const SIGNAL_MIN: i64 = -120;
const SIGNAL_MAX: i64 = 0;
const SIGNAL_DEFAULT: i32 = -100;
const CHANNEL_MIN: i64 = 1;
const CHANNEL_MAX: i64 = 165;
const CHANNEL_DEFAULT: u16 = 1;
const SSID_MAX_LEN: usize = 32;

/// Top-level document. Records stay untyped so one bad entry can be
/// dropped without failing the whole snapshot.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSnapshot {
    #[serde(default)]
    pub devices: Vec<Value>,
    #[serde(default)]
    pub access_points: Vec<Value>,
}

/// Either a full snapshot object or a bare device array, which is what
/// Kismet's device view returns.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawDocument {
    Devices(Vec<Value>),
    Snapshot(RawSnapshot),
}

impl From<RawDocument> for RawSnapshot {
    fn from(doc: RawDocument) -> Self {
        match doc {
            RawDocument::Devices(devices) => Self {
                devices,
                access_points: Vec::new(),
            },
            RawDocument::Snapshot(snapshot) => snapshot,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDevice {
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub signal_strength: Option<Value>,
    #[serde(default)]
    pub ssids: Vec<Value>,
    #[serde(default)]
    pub device_type: Option<Value>,
    #[serde(default)]
    pub zone: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawAccessPoint {
    #[serde(default)]
    pub bssid: Option<String>,
    #[serde(default)]
    pub ssid: Option<Value>,
    #[serde(default)]
    pub encryption: Option<Value>,
    #[serde(default)]
    pub channel: Option<Value>,
    #[serde(default)]
    pub signal_strength: Option<Value>,
}

// ── Helpers ────────────────────────────────────────────────────────

/// Integer view of a JSON value: numbers and numeric strings.
fn int_value(raw: Option<&Value>) -> Option<i64> {
    match raw? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Lowercased text of a scalar JSON value.
fn text_value(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(s)) => s.trim().to_ascii_lowercase(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string().to_ascii_lowercase(),
    }
}

/// Canonical `AA:BB:CC:DD:EE:FF`, or empty when not a 48-bit address.
pub(crate) fn normalize_mac(raw: Option<&str>) -> String {
    raw.and_then(MacAddress::parse)
        .map(|mac| mac.to_string())
        .unwrap_or_default()
}

pub(crate) fn normalize_signal(raw: Option<&Value>) -> i32 {
    int_value(raw)
        .map(|v| v.clamp(SIGNAL_MIN, SIGNAL_MAX))
        .and_then(|v| i32::try_from(v).ok())
        .unwrap_or(SIGNAL_DEFAULT)
}

pub(crate) fn normalize_channel(raw: Option<&Value>) -> u16 {
    int_value(raw)
        .map(|v| v.clamp(CHANNEL_MIN, CHANNEL_MAX))
        .and_then(|v| u16::try_from(v).ok())
        .unwrap_or(CHANNEL_DEFAULT)
}

/// Printable ASCII only, trimmed, at most 32 characters. Non-strings
/// clean to empty.
pub(crate) fn clean_ssid(raw: Option<&Value>) -> String {
    let Some(Value::String(s)) = raw else {
        return String::new();
    };
    let printable: String = s.chars().filter(|c| (' '..='~').contains(c)).collect();
    printable.trim().chars().take(SSID_MAX_LEN).collect()
}

pub(crate) fn normalize_device_type(raw: Option<&Value>) -> DeviceType {
    match text_value(raw).as_str() {
        "phone" | "smartphone" => DeviceType::Smartphone,
        "tablet" => DeviceType::Tablet,
        "laptop" => DeviceType::Laptop,
        "desktop" | "computer" => DeviceType::Computer,
        "iot" => DeviceType::Iot,
        "printer" => DeviceType::Printer,
        "tv" | "smart-tv" | "smart_tv" => DeviceType::SmartTv,
        "watch" | "smart_watch" => DeviceType::SmartWatch,
        _ => DeviceType::Unknown,
    }
}

pub(crate) fn normalize_zone(raw: Option<&Value>) -> Zone {
    text_value(raw).parse().unwrap_or(Zone::Unknown)
}

// ── Conversions ────────────────────────────────────────────────────

impl From<RawDevice> for DeviceRecord {
    fn from(raw: RawDevice) -> Self {
        let ssids: IndexSet<String> = raw
            .ssids
            .iter()
            .map(|s| clean_ssid(Some(s)))
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            mac: normalize_mac(raw.mac.as_deref()),
            signal_strength: normalize_signal(raw.signal_strength.as_ref()),
            ssids,
            device_type: normalize_device_type(raw.device_type.as_ref()),
            zone: normalize_zone(raw.zone.as_ref()),
        }
    }
}

impl From<RawAccessPoint> for AccessPointRecord {
    fn from(raw: RawAccessPoint) -> Self {
        let encryption = match raw.encryption.as_ref() {
            Some(Value::String(s)) => Encryption::normalize(s),
            _ => Encryption::Unknown,
        };

        Self {
            bssid: normalize_mac(raw.bssid.as_deref()),
            ssid: clean_ssid(raw.ssid.as_ref()),
            encryption,
            channel: normalize_channel(raw.channel.as_ref()),
            signal_strength: normalize_signal(raw.signal_strength.as_ref()),
        }
    }
}
