// ── Vendor lookup ──
//
// Small static OUI → vendor table. Not a real registry; hosts can layer
// extra entries on top of the built-in set.

use std::collections::HashMap;

use crate::model::Oui;

const BUILTIN_VENDORS: &[(&str, &str)] = &[
    ("00:1A:2B", "Cisco"),
    ("00:0C:29", "VMware"),
    ("00:50:56", "VMware"),
    ("00:1C:42", "Parallels"),
    ("08:00:27", "Oracle VirtualBox"),
    ("08:00:0B", "Intel"),
    ("00:1B:63", "Apple"),
    ("00:03:93", "Apple"),
    ("00:0A:27", "Apple"),
    ("00:1D:4F", "Apple"),
    ("00:1E:52", "Apple"),
];

#[derive(Debug, Clone)]
pub struct VendorTable {
    entries: HashMap<Oui, String>,
}

impl VendorTable {
    pub fn builtin() -> Self {
        let entries = BUILTIN_VENDORS
            .iter()
            .filter_map(|(oui, name)| Some((Oui::from_prefix(oui)?, (*name).to_owned())))
            .collect();
        Self { entries }
    }

    /// Add or replace an entry. Returns `false` if `oui` is not a valid prefix.
    pub fn insert(&mut self, oui: &str, vendor: impl Into<String>) -> bool {
        match Oui::from_prefix(oui) {
            Some(key) => {
                self.entries.insert(key, vendor.into());
                true
            }
            None => false,
        }
    }

    pub fn lookup(&self, oui: &Oui) -> Option<&str> {
        self.entries.get(oui).map(String::as_str)
    }

    /// Vendor name, or `OUI {oui}` when the prefix is unknown.
    pub fn display_name(&self, oui: &Oui) -> String {
        self.lookup(oui)
            .map_or_else(|| format!("OUI {oui}"), str::to_owned)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for VendorTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup_is_case_insensitive_via_oui() {
        let table = VendorTable::builtin();
        let oui = Oui::from_identifier("00:1b:63:01:02:03").unwrap();
        assert_eq!(table.lookup(&oui), Some("Apple"));
        assert_eq!(table.len(), BUILTIN_VENDORS.len());
    }

    #[test]
    fn unknown_prefix_falls_back_to_literal() {
        let table = VendorTable::builtin();
        let oui = Oui::from_identifier("DE:AD:BE:EF:00:01").unwrap();
        assert_eq!(table.display_name(&oui), "OUI DE:AD:BE");
    }

    #[test]
    fn insert_overrides_and_validates() {
        let mut table = VendorTable::builtin();
        assert!(table.insert("de:ad:be", "Lab Gear"));
        assert!(!table.insert("nonsense", "Nobody"));
        let oui = Oui::from_identifier("DE:AD:BE:00:00:00").unwrap();
        assert_eq!(table.display_name(&oui), "Lab Gear");
    }
}
