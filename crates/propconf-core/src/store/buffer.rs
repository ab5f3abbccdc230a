//! Staging area between backend files and property contexts.

use std::collections::HashMap;

use crate::value::Value;

/// One staged key.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferEntry {
    pub key: String,
    pub page: String,
    pub value: Value,
}

/// Insertion-ordered key → (page, value) map filled by backend preloads.
///
/// Re-inserting a key replaces its value (and page) in place, so later files
/// override earlier ones without changing the original position.
#[derive(Debug, Default)]
pub struct ConfigBuffer {
    entries: Vec<BufferEntry>,
    index: HashMap<String, usize>,
}

impl ConfigBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `value` for `key`. Returns the replaced value, if any.
    pub fn insert(&mut self, key: &str, page: &str, value: Value) -> Option<Value> {
        match self.index.get(key) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                entry.page = page.to_string();
                Some(std::mem::replace(&mut entry.value, value))
            }
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push(BufferEntry {
                    key: key.to_string(),
                    page: page.to_string(),
                    value,
                });
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entry(key).map(|e| &e.value)
    }

    pub fn entry(&self, key: &str) -> Option<&BufferEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &BufferEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}
