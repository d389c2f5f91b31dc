//! Per-call mapping state.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{MappingError, Result};
use crate::store::PairKey;

/// State carried through one mapping call: caller-supplied items that
/// resolvers and expressions can read, and the current nesting depth.
#[derive(Debug, Clone, Default)]
pub struct MappingContext {
    items: HashMap<String, Value>,
    depth: usize,
}

impl MappingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.items.insert(key.into(), value.into());
    }

    pub fn item(&self, key: &str) -> Option<&Value> {
        self.items.get(key)
    }

    /// Decode an item into a typed value
    pub fn item_as<T: DeserializeOwned>(&self, key: &str) -> serde_json::Result<Option<T>> {
        self.items.get(key).map(|value| T::deserialize(value)).transpose()
    }

    /// Number of object mappings currently in progress
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn enter(&mut self, pair: PairKey, max_depth: usize) -> Result<()> {
        if self.depth >= max_depth {
            return Err(MappingError::MaxDepthExceeded { pair, max_depth });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
