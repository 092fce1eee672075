use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Destination catalog entry from the backend's `/destinations/` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: i64,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub province: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Resolves the different spellings of a location to one canonical key.
///
/// Flights reference places either by code (`UIO`) or by display name
/// (`Quito`, `Quito - Ecuador`). The directory is built once per snapshot
/// from the destination catalog so comparisons only see canonical keys.
#[derive(Debug, Clone, Default)]
pub struct LocationDirectory {
    aliases: HashMap<String, String>,
}

impl LocationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_destinations<'a, I>(destinations: I) -> Self
    where
        I: IntoIterator<Item = &'a Destination>,
    {
        let mut directory = Self::new();
        for destination in destinations {
            directory.register(&destination.code, &destination.name);
        }
        directory
    }

    /// Register a code and its display name. Inactive destinations are
    /// registered too; flights to them must stay findable.
    pub fn register(&mut self, code: &str, name: &str) {
        let key = normalize(code);
        if key.is_empty() {
            return;
        }
        let name = normalize(name);
        if !name.is_empty() {
            self.aliases.entry(name).or_insert_with(|| key.clone());
        }
        self.aliases.insert(key.clone(), key);
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Canonical key for a raw location string.
    pub fn canonical(&self, raw: &str) -> String {
        let normalized = normalize(raw);
        if let Some(key) = self.aliases.get(&normalized) {
            return key.clone();
        }
        // "Quito - Ecuador" style labels
        if let Some((head, _)) = normalized.split_once(" - ") {
            if let Some(key) = self.aliases.get(head.trim()) {
                return key.clone();
            }
        }
        normalized
    }

    pub fn same_location(&self, a: &str, b: &str) -> bool {
        self.canonical(a) == self.canonical(b)
    }
}

/// Trimmed, lowercased form used for every location comparison.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destination(code: &str, name: &str, is_active: bool) -> Destination {
        Destination {
            id: 1,
            name: name.to_string(),
            code: code.to_string(),
            province: "Pichincha".to_string(),
            is_active,
            image_url: None,
        }
    }

    #[test]
    fn test_code_and_name_resolve_to_same_key() {
        let catalog = vec![
            destination("UIO", "Quito", true),
            destination("GYE", "Guayaquil", false),
        ];
        let directory = LocationDirectory::from_destinations(&catalog);

        assert!(directory.same_location("UIO", " quito "));
        assert!(directory.same_location("Quito - Ecuador", "uio"));
        assert!(directory.same_location("GUAYAQUIL", "gye"));
        assert!(!directory.same_location("UIO", "GYE"));
    }

    #[test]
    fn test_empty_directory_is_case_insensitive_equality() {
        let directory = LocationDirectory::new();
        assert!(directory.is_empty());
        assert!(directory.same_location("  Manta ", "MANTA"));
        assert!(!directory.same_location("Manta", "MEC"));
        assert_eq!(directory.canonical(" Quito - Ecuador "), "quito - ecuador");
    }

    #[test]
    fn test_blank_code_is_ignored() {
        let mut directory = LocationDirectory::new();
        directory.register("  ", "Nowhere");
        assert!(directory.is_empty());
    }
}
