//! Ordered, key-indexed collection of property contexts.

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::property::context::PropertyContext;

/// Property contexts of one configuration set, in declaration order.
///
/// Lookup by key is O(1); iteration follows insertion order so that saves
/// and layouts are deterministic.
#[derive(Debug, Default)]
pub struct PropertyTable {
    entries: Vec<PropertyContext>,
    index: HashMap<String, usize>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a context.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyExists`] when the key is already present.
    pub fn insert(&mut self, ctx: PropertyContext) -> Result<(), ConfigError> {
        if self.index.contains_key(ctx.key()) {
            return Err(ConfigError::AlreadyExists(ctx.key().to_string()));
        }
        self.index.insert(ctx.key().to_string(), self.entries.len());
        self.entries.push(ctx);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&PropertyContext> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut PropertyContext> {
        match self.index.get(key) {
            Some(&i) => self.entries.get_mut(i),
            None => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyContext> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PropertyContext> {
        self.entries.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(PropertyContext::key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
