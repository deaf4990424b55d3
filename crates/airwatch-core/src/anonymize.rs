// ── MAC anonymization ──
//
// Replaces the device-specific half of a MAC with digits from a
// daily-salted SHA-256 digest. The vendor prefix survives so spoofing
// detection can still group by OUI. Same MAC on the same UTC day maps
// to the same identifier; the mapping rotates at midnight.

use chrono::{NaiveDate, Utc};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::model::MacAddress;

/// Default secret when none is configured.
pub const DEFAULT_SECRET: &str = "airwatch-salt";

#[derive(Debug)]
pub struct MacAnonymizer {
    secret: SecretString,
}

impl MacAnonymizer {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Anonymize using today's (UTC) salt.
    pub fn anonymize(&self, mac: &str) -> Result<String, CoreError> {
        self.anonymize_on(mac, Utc::now().date_naive())
    }

    /// Anonymize using the salt for `date`.
    pub fn anonymize_on(&self, mac: &str, date: NaiveDate) -> Result<String, CoreError> {
        let parsed = MacAddress::parse(mac).ok_or_else(|| CoreError::Anonymize {
            reason: format!("'{mac}' is not a 48-bit MAC address"),
        })?;

        let mut hasher = Sha256::new();
        hasher.update(self.salt_for(date).as_bytes());
        hasher.update(parsed.hex_digits().to_ascii_lowercase().as_bytes());
        let digest = hex::encode_upper(hasher.finalize());

        let tail: Vec<&str> = (0..6)
            .step_by(2)
            .filter_map(|i| digest.get(i..i + 2))
            .collect();
        Ok(format!("{}:{}", parsed.oui(), tail.join(":")))
    }

    fn salt_for(&self, date: NaiveDate) -> String {
        format!("{}-{}", self.secret.expose_secret(), date.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn anonymizer(secret: &str) -> MacAnonymizer {
        MacAnonymizer::new(SecretString::from(secret.to_owned()))
    }

    #[test]
    fn keeps_vendor_prefix_and_shape() {
        let out = anonymizer("s3cret")
            .anonymize_on("00:1b:63:12:34:56", day(1))
            .unwrap();
        assert!(out.starts_with("00:1B:63:"));
        assert_eq!(out.len(), 17);
        assert!(MacAddress::parse(&out).is_some());
    }

    #[test]
    fn stable_within_a_day_and_notation_independent() {
        let anon = anonymizer("s3cret");
        let a = anon.anonymize_on("00:1B:63:12:34:56", day(1)).unwrap();
        let b = anon.anonymize_on("00-1b-63-12-34-56", day(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rotates_daily_and_per_secret() {
        let anon = anonymizer("s3cret");
        let today = anon.anonymize_on("00:1B:63:12:34:56", day(1)).unwrap();
        let tomorrow = anon.anonymize_on("00:1B:63:12:34:56", day(2)).unwrap();
        let other = anonymizer("other")
            .anonymize_on("00:1B:63:12:34:56", day(1))
            .unwrap();
        assert_ne!(today, tomorrow);
        assert_ne!(today, other);
    }

    #[test]
    fn rejects_malformed_input() {
        let err = anonymizer("s3cret").anonymize("not-a-mac").unwrap_err();
        assert!(matches!(err, CoreError::Anonymize { .. }));
    }
}
