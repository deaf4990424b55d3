// ── Hardware address identity types ──
//
// `MacAddress` is the strict, normalized form produced by the snapshot
// source. `Oui` is the vendor prefix the detector groups devices by; it
// is extracted leniently from whatever identifier the snapshot carries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── MacAddress ──────────────────────────────────────────────────────

/// MAC address, normalized to uppercase colon-separated format (AA:BB:CC:DD:EE:FF).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddress(String);

impl MacAddress {
    /// Parse any common MAC notation (colons, dashes, dots, bare hex).
    ///
    /// Separators are stripped; exactly 12 hex digits must remain.
    pub fn parse(raw: impl AsRef<str>) -> Option<Self> {
        let digits: String = raw
            .as_ref()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let octets: Vec<&str> = (0..12)
            .step_by(2)
            .filter_map(|i| digits.get(i..i + 2))
            .collect();
        Some(Self(octets.join(":")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 12 hex digits without separators.
    pub fn hex_digits(&self) -> String {
        self.0.replace(':', "")
    }

    pub fn oui(&self) -> Oui {
        Oui(self.0.get(..8).unwrap_or_default().to_owned())
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Oui ─────────────────────────────────────────────────────────────

/// Organizationally Unique Identifier: the first three octet groups of a
/// hardware address, uppercase and colon-joined (e.g. `00:1B:63`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Oui(String);

impl Oui {
    /// Extract the vendor prefix from a device identifier.
    ///
    /// Only six colon-separated hex octets qualify (`00:1b:63:aa:bb:cc`);
    /// anything else returns `None` and is skipped by vendor grouping.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let groups = octet_groups(identifier)?;
        if groups.len() != 6 {
            return None;
        }
        Some(Self(groups.get(..3)?.join(":")))
    }

    /// Parse a bare three-octet prefix such as `00:1B:63`.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        let groups = octet_groups(prefix)?;
        if groups.len() != 3 {
            return None;
        }
        Some(Self(groups.join(":")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Oui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Oui {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_prefix(s).ok_or_else(|| format!("'{s}' is not a vendor prefix"))
    }
}

/// Uppercase colon groups, or `None` unless every group is two hex digits.
fn octet_groups(raw: &str) -> Option<Vec<String>> {
    raw.trim()
        .split(':')
        .map(|group| {
            (group.len() == 2 && group.chars().all(|c| c.is_ascii_hexdigit()))
                .then(|| group.to_ascii_uppercase())
        })
        .collect()
}
