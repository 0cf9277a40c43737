// src/matching/reference.rs

use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::matching::normalize::NormalizedKey;

/// Canonical names a query can resolve to.
///
/// Entries keep their insertion order and original text. Each normalized
/// form maps to the first entry that produced it, so later duplicates are
/// never returned.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    entries: Vec<String>,
    keys: Vec<NormalizedKey>,
    first_by_key: HashMap<NormalizedKey, usize>,
    /// Entry indices of the first occurrence of every distinct key, in order.
    distinct: Vec<usize>,
}

impl ReferenceSet {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        let keys: Vec<NormalizedKey> = entries.iter().map(|e| NormalizedKey::new(e)).collect();

        let mut first_by_key = HashMap::with_capacity(keys.len());
        let mut distinct = Vec::with_capacity(keys.len());
        for (idx, key) in keys.iter().enumerate() {
            if !first_by_key.contains_key(key) {
                first_by_key.insert(key.clone(), idx);
                distinct.push(idx);
            }
        }

        Self {
            entries,
            keys,
            first_by_key,
            distinct,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn distinct_len(&self) -> usize {
        self.distinct.len()
    }

    pub fn entry(&self, idx: usize) -> Option<&str> {
        self.entries.get(idx).map(String::as_str)
    }

    /// Original text of the first entry whose normalized form is `key`.
    pub fn first_with_key(&self, key: &NormalizedKey) -> Option<&str> {
        self.first_by_key
            .get(key)
            .map(|&idx| self.entries[idx].as_str())
    }

    /// `(original, normalized)` pairs in insertion order, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NormalizedKey)> {
        self.entries
            .iter()
            .map(String::as_str)
            .zip(self.keys.iter())
    }

    /// Entry indices of each distinct normalized form, in first-occurrence order.
    pub fn distinct_indices(&self) -> &[usize] {
        &self.distinct
    }

    /// Normalized forms of the distinct entries, in first-occurrence order.
    pub fn distinct_keys(&self) -> Vec<&str> {
        self.distinct
            .iter()
            .map(|&idx| self.keys[idx].as_str())
            .collect()
    }

    /// SHA-256 over the raw entries, used to tie a run summary to its input.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for entry in &self.entries {
            hasher.update(entry.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }
}

impl<S: Into<String>> FromIterator<S> for ReferenceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ReferenceSet::new(iter)
    }
}
