//! Name→role assignments and the role→area access matrix.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::json;
use crate::error::Result;

/// Role shown for a recognized face whose name has no role entry.
pub const UNKNOWN_ROLE: &str = "Unknown Role";

/// Maps each registered identity to its role (`roles.json`).
///
/// Entries are kept sorted by name, so a saved file lists names in
/// alphabetical order whatever order they were written in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleBook(BTreeMap<String, String>);

impl RoleBook {
    /// Load from disk; a missing file is an empty book.
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

    /// Assign or replace the role of `name`.
    pub fn assign(&mut self, name: impl Into<String>, role: impl Into<String>) {
        self.0.insert(name.into(), role.into());
    }

    /// Role of `name`, if any.
    #[must_use]
    pub fn role_of(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Role of `name`, or [`UNKNOWN_ROLE`].
    #[must_use]
    pub fn role_or_unknown(&self, name: &str) -> &str {
        self.role_of(name).unwrap_or(UNKNOWN_ROLE)
    }

    /// Remove `name`, returning its role.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    /// Number of identities with a role.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the book is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(name, role)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, r)| (n.as_str(), r.as_str()))
    }
}

/// Per-role, per-area permissions (`roles_access.json`).
///
/// Anything not listed is denied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessMatrix(BTreeMap<String, BTreeMap<String, bool>>);

impl AccessMatrix {
    /// Load from disk; a missing file denies everything.
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

    /// Whether `role` may be seen in `area`.
    #[must_use]
    pub fn is_allowed(&self, role: &str, area: &str) -> bool {
        self.0
            .get(role)
            .and_then(|areas| areas.get(area))
            .copied()
            .unwrap_or(false)
    }

    /// Set the permission of `role` in `area`.
    pub fn set(&mut self, role: impl Into<String>, area: impl Into<String>, allowed: bool) {
        self.0
            .entry(role.into())
            .or_default()
            .insert(area.into(), allowed);
    }

    /// Drop every entry for `area`. Roles left without entries are removed.
    pub fn remove_area(&mut self, area: &str) {
        for areas in self.0.values_mut() {
            areas.remove(area);
        }
        self.0.retain(|_, areas| !areas.is_empty());
    }

    /// Whether no permissions are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(role, area, allowed)` triples in role then area order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, bool)> {
        self.0.iter().flat_map(|(role, areas)| {
            areas
                .iter()
                .map(move |(area, allowed)| (role.as_str(), area.as_str(), *allowed))
        })
    }
}
