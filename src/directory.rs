//! Address directory: canonical chain address <-> display name.
//!
//! Entries keep their declared order; when two entries share a display
//! name, reverse lookup returns the first one declared. The directory is
//! read-only at request time and safe to share across requests.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One directory entry: a canonical chain address and its display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub address: String,
    pub name: String,
}

/// Ordered mapping between chain addresses and human-friendly names.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressDirectory {
    #[serde(default, rename = "entry")]
    entries: Vec<DirectoryEntry>,
}

impl AddressDirectory {
    /// Build a directory, keeping the first entry for a duplicated address.
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        let mut kept: Vec<DirectoryEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            if kept.iter().any(|e| e.address == entry.address) {
                tracing::warn!(address = %entry.address, "duplicate directory address ignored");
                continue;
            }
            kept.push(entry);
        }
        Self { entries: kept }
    }

    /// Convenience constructor from `(address, name)` pairs.
    pub fn from_pairs<A, N>(pairs: impl IntoIterator<Item = (A, N)>) -> Self
    where
        A: Into<String>,
        N: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(address, name)| DirectoryEntry {
                    address: address.into(),
                    name: name.into(),
                })
                .collect(),
        )
    }

    /// Load a directory from a TOML file of `[[entry]]` tables, e.g.
    ///
    /// ```toml
    /// [[entry]]
    /// address = "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984"
    /// name = "Ananya"
    /// ```
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::AddressBook {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let parsed: AddressDirectory =
            toml::from_str(&raw).map_err(|e| ConfigError::AddressBook {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::new(parsed.entries))
    }

    /// Reverse lookup: display name -> address, case-insensitive,
    /// first match wins in declared order.
    pub fn address_for(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.address.as_str())
    }

    /// Forward lookup: address -> display name.
    pub fn display_name(&self, address: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.address == address)
            .map(|e| e.name.as_str())
    }

    pub fn contains_address(&self, address: &str) -> bool {
        self.entries.iter().any(|e| e.address == address)
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> AddressDirectory {
        AddressDirectory::from_pairs([
            ("0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", "Ananya"),
            ("So1anaAddr1111111111111111111111111", "Ravi"),
        ])
    }

    #[test]
    fn reverse_lookup_is_case_insensitive() {
        let dir = sample();
        assert_eq!(
            dir.address_for("ananya"),
            Some("0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA")
        );
        assert_eq!(dir.address_for("RAVI"), Some("So1anaAddr1111111111111111111111111"));
        assert_eq!(dir.address_for("nobody"), None);
    }

    #[test]
    fn duplicate_display_name_resolves_to_first_declared() {
        let dir = AddressDirectory::from_pairs([("addr-one", "Sam"), ("addr-two", "Sam")]);
        assert_eq!(dir.address_for("Sam"), Some("addr-one"));
    }

    #[test]
    fn duplicate_address_keeps_first_entry() {
        let dir = AddressDirectory::from_pairs([("addr", "First"), ("addr", "Second")]);
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.display_name("addr"), Some("First"));
    }

    #[test]
    fn forward_lookup_is_exact() {
        let dir = sample();
        assert_eq!(
            dir.display_name("0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"),
            Some("Ananya")
        );
        assert_eq!(dir.display_name("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"), None);
    }

    #[test]
    fn loads_entries_in_declared_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[[entry]]
address = "addr-b"
name = "Shared"

[[entry]]
address = "addr-a"
name = "Shared"
"#
        )
        .unwrap();

        let dir = AddressDirectory::load(file.path()).unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.address_for("shared"), Some("addr-b"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = AddressDirectory::load(Path::new("/nonexistent/book.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::AddressBook { .. }));
    }
}
