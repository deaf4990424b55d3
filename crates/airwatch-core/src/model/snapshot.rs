// ── Snapshot input records ──

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Link-layer encryption advertised by an access point.
///
/// Parsing is case-insensitive; anything outside the vocabulary is
/// `Unknown` rather than an error.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Encryption {
    #[serde(rename = "NONE")]
    #[strum(serialize = "NONE")]
    None,
    #[serde(rename = "OPEN")]
    #[strum(serialize = "OPEN")]
    Open,
    #[serde(rename = "WEP")]
    #[strum(serialize = "WEP")]
    Wep,
    #[serde(rename = "WPA")]
    #[strum(serialize = "WPA")]
    Wpa,
    #[serde(rename = "WPA2")]
    #[strum(serialize = "WPA2")]
    Wpa2,
    #[serde(rename = "WPA3")]
    #[strum(serialize = "WPA3")]
    Wpa3,
    #[serde(rename = "WPA2-ENTERPRISE")]
    #[strum(serialize = "WPA2-ENTERPRISE")]
    Wpa2Enterprise,
    #[serde(rename = "WPA3-ENTERPRISE")]
    #[strum(serialize = "WPA3-ENTERPRISE")]
    Wpa3Enterprise,
    #[default]
    #[serde(rename = "UNKNOWN")]
    #[strum(serialize = "UNKNOWN")]
    Unknown,
}

impl Encryption {
    /// Lenient parse: trims, ignores case, maps unrecognized values to `Unknown`.
    pub fn normalize(raw: &str) -> Self {
        raw.trim().parse().unwrap_or(Self::Unknown)
    }
}

impl<'de> Deserialize<'de> for Encryption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::normalize(&raw))
    }
}

/// Coarse device classification supplied by the snapshot source.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceType {
    Smartphone,
    Tablet,
    Laptop,
    Computer,
    Iot,
    Printer,
    SmartTv,
    SmartWatch,
    #[default]
    Unknown,
}

/// Physical zone in which a device was observed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Zone {
    Entry,
    Exit,
    Lobby,
    Shop,
    Cafe,
    Office,
    Meeting,
    Conference,
    #[default]
    Unknown,
}

/// A nearby client device observed in one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Hardware identifier, already anonymized upstream. Opaque to the
    /// core except for its vendor prefix.
    pub mac: String,
    /// Received signal strength in dBm.
    pub signal_strength: i32,
    /// SSIDs probed for or associated with, first-seen order.
    pub ssids: IndexSet<String>,
    pub device_type: DeviceType,
    pub zone: Zone,
}

/// An access point observed in one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPointRecord {
    pub bssid: String,
    pub ssid: String,
    #[serde(default)]
    pub encryption: Encryption,
    pub channel: u16,
    pub signal_strength: i32,
}

/// One point-in-time batch of observations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
    #[serde(default)]
    pub access_points: Vec<AccessPointRecord>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn encryption_parses_case_insensitively() {
        assert_eq!(Encryption::normalize("wep"), Encryption::Wep);
        assert_eq!(Encryption::normalize(" Wpa2-Enterprise "), Encryption::Wpa2Enterprise);
        assert_eq!(Encryption::normalize("TKIP"), Encryption::Unknown);
    }

    #[test]
    fn encryption_display_matches_wire_form() {
        assert_eq!(Encryption::Wpa3Enterprise.to_string(), "WPA3-ENTERPRISE");
        assert_eq!(
            serde_json::to_string(&Encryption::Wep).unwrap(),
            "\"WEP\""
        );
    }

    #[test]
    fn access_point_deserializes_unknown_encryption() {
        let ap: AccessPointRecord = serde_json::from_str(
            r#"{"bssid":"AA:AA:AA:AA:AA:01","ssid":"Cafe","encryption":"wpa9","channel":6,"signal_strength":-40}"#,
        )
        .unwrap();
        assert_eq!(ap.encryption, Encryption::Unknown);
    }

    #[test]
    fn device_type_round_trips_snake_case() {
        assert_eq!(DeviceType::SmartTv.to_string(), "smart_tv");
        assert_eq!("smart_watch".parse::<DeviceType>().unwrap(), DeviceType::SmartWatch);
    }
}
