//! The list of known areas (camera names), stored as `{"areas": [...]}`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::json;
use crate::error::Result;

/// Camera locations recognition may run in (`areas.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaList {
    areas: Vec<String>,
}

impl AreaList {
    /// Build from names, dropping duplicates.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        for name in names {
            list.add(name);
        }
        list
    }

    /// Load from disk; a missing file or a missing `areas` key is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        json::read_or_default(path)
    }

    /// Write to disk, replacing the previous contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        json::write_pretty(path, self)
    }

    /// Whether `name` is a known area. Matching is exact.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.areas.iter().any(|a| a == name)
    }

    /// Append `name` unless present. Returns `true` if it was added.
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.areas.push(name);
        true
    }

    /// Remove `name`. Returns `true` if it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.areas.len();
        self.areas.retain(|a| a != name);
        self.areas.len() != before
    }

    /// Area names in file order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.areas
    }

    /// Whether there are no areas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}
