//! Vault document model.
//!
//! The vault is an insertion-ordered map from normalized service name to an
//! entry holding the username and the password ciphertext. It is persisted
//! as a pretty-printed JSON object whose keys keep that order.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use lockbox_common::{Error, Result, ServiceName};

/// Indentation of the persisted JSON document.
const JSON_INDENT: &[u8] = b"    ";

/// A stored credential record. `password` is ciphertext text, never plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEntry {
    pub username: String,
    pub password: String,
}

/// Insertion-ordered mapping of service name to entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vault {
    entries: Vec<(ServiceName, VaultEntry)>,
}

impl Vault {
    /// Create an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, service: &ServiceName) -> Option<usize> {
        self.entries.iter().position(|(name, _)| name == service)
    }

    pub fn contains(&self, service: &ServiceName) -> bool {
        self.position(service).is_some()
    }

    pub fn get(&self, service: &ServiceName) -> Option<&VaultEntry> {
        self.position(service).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, service: &ServiceName) -> Option<&mut VaultEntry> {
        self.position(service).map(move |i| &mut self.entries[i].1)
    }

    /// Insert an entry, replacing any existing entry for the same service.
    ///
    /// A replaced entry keeps its position; a new one is appended. Returns
    /// the replaced entry.
    pub fn insert(&mut self, service: ServiceName, entry: VaultEntry) -> Option<VaultEntry> {
        match self.position(&service) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, entry)),
            None => {
                self.entries.push((service, entry));
                None
            }
        }
    }

    /// Remove an entry, preserving the order of the rest.
    pub fn remove(&mut self, service: &ServiceName) -> Option<VaultEntry> {
        self.position(service).map(|i| self.entries.remove(i).1)
    }

    /// Service names in insertion order.
    pub fn services(&self) -> impl Iterator<Item = &ServiceName> {
        self.entries.iter().map(|(name, _)| name)
    }

    /// Serialize to the pretty-printed on-disk form.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(out)
    }

    /// Deserialize from the on-disk form.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::Serialization(e.to_string()))
    }
}

impl Serialize for Vault {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

struct VaultVisitor;

impl<'de> Visitor<'de> for VaultVisitor {
    type Value = Vault;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of service name to vault entry")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Vault, A::Error> {
        let mut vault = Vault::new();
        // Keys that collide after normalization collapse into one entry.
        while let Some((name, entry)) = access.next_entry::<ServiceName, VaultEntry>()? {
            vault.insert(name, entry);
        }
        Ok(vault)
    }
}

impl<'de> Deserialize<'de> for Vault {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(VaultVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ServiceName {
        ServiceName::new(s)
    }

    fn entry(user: &str, pw: &str) -> VaultEntry {
        VaultEntry {
            username: user.to_string(),
            password: pw.to_string(),
        }
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut vault = Vault::new();
        vault.insert(name("zeta"), entry("z", "c1"));
        vault.insert(name("alpha"), entry("a", "c2"));
        vault.insert(name("mid"), entry("m", "c3"));

        let services: Vec<_> = vault.services().map(|s| s.as_str()).collect();
        assert_eq!(services, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut vault = Vault::new();
        vault.insert(name("gmail"), entry("old", "c1"));
        vault.insert(name("github"), entry("gh", "c2"));

        let replaced = vault.insert(name("GMAIL"), entry("new", "c3"));

        assert_eq!(replaced, Some(entry("old", "c1")));
        assert_eq!(vault.len(), 2);
        assert_eq!(vault.get(&name("gmail")), Some(&entry("new", "c3")));
        assert_eq!(vault.services().next(), Some(&name("gmail")));
    }

    #[test]
    fn test_remove() {
        let mut vault = Vault::new();
        vault.insert(name("a"), entry("1", "x"));
        vault.insert(name("b"), entry("2", "y"));
        vault.insert(name("c"), entry("3", "z"));

        assert!(vault.remove(&name("b")).is_some());
        assert!(vault.remove(&name("b")).is_none());

        let services: Vec<_> = vault.services().map(|s| s.as_str()).collect();
        assert_eq!(services, ["a", "c"]);
    }

    #[test]
    fn test_json_shape_and_order() {
        let mut vault = Vault::new();
        vault.insert(name("zeta"), entry("z@x.com", "CT1"));
        vault.insert(name("alpha"), entry("a@x.com", "CT2"));

        let json = String::from_utf8(vault.to_json().unwrap()).unwrap();

        let expected = "{\n    \"zeta\": {\n        \"username\": \"z@x.com\",\n        \"password\": \"CT1\"\n    },\n    \"alpha\": {\n        \"username\": \"a@x.com\",\n        \"password\": \"CT2\"\n    }\n}";
        assert_eq!(json, expected);
        assert_eq!(Vault::from_json(json.as_bytes()).unwrap(), vault);
    }

    #[test]
    fn test_from_json_normalizes_keys() {
        let json = br#"{" GitHub ": {"username": "me", "password": "CT"}}"#;
        let vault = Vault::from_json(json).unwrap();

        assert!(vault.contains(&name("github")));
    }

    #[test]
    fn test_from_json_accepts_empty_key() {
        let json = br#"{"": {"username": "u", "password": "CT0"}, "gmail": {"username": "g", "password": "CT1"}}"#;
        let vault = Vault::from_json(json).unwrap();

        assert_eq!(vault.len(), 2);
        assert_eq!(vault.get(&name("")), Some(&entry("u", "CT0")));
        assert_eq!(vault.get(&name("gmail")), Some(&entry("g", "CT1")));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(matches!(
            Vault::from_json(b"[1, 2]"),
            Err(Error::Serialization(_))
        ));
        assert!(matches!(
            Vault::from_json(br#"{"gmail": {"username": "x"}}"#),
            Err(Error::Serialization(_))
        ));
    }
}
