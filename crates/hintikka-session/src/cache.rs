//! Content-addressed description cache.
//!
//! Descriptions are keyed by the SHA-256 of their canonical JSON, so loading
//! the same model twice yields the same entry regardless of where it came from.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::description::ModelDescription;
use crate::error::Result;

/// A SHA-256 hex digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Fingerprint(hex_encode(&hasher.finalize()))
    }

    pub fn of(description: &ModelDescription) -> Result<Self> {
        description.fingerprint()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first `len` hex digits, for display.
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// In-memory map from fingerprint to description.
#[derive(Debug, Clone, Default)]
pub struct DescriptionCache {
    entries: HashMap<Fingerprint, ModelDescription>,
}

impl DescriptionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `description`, returning its fingerprint. Re-inserting identical
    /// content is a no-op.
    pub fn insert(&mut self, description: ModelDescription) -> Result<Fingerprint> {
        let key = description.fingerprint()?;
        self.entries.entry(key.clone()).or_insert(description);
        Ok(key)
    }

    pub fn get(&self, key: &Fingerprint) -> Option<&ModelDescription> {
        self.entries.get(key)
    }

    /// Parse `text` unless an identical description is already cached.
    pub fn get_or_insert(&mut self, text: &str) -> Result<(Fingerprint, &ModelDescription)> {
        let description = ModelDescription::from_json(text)?;
        let key = description.fingerprint()?;
        let entry = self.entries.entry(key.clone()).or_insert(description);
        Ok((key, entry))
    }

    pub fn contains(&self, key: &Fingerprint) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
