//! On-disk registry of identities, roles, areas and face crops.
//!
//! Everything lives under one data directory:
//!
//! - `roles.json` - name → role
//! - `roles_access.json` - role → area → allowed
//! - `areas.json` - `{"areas": [...]}`
//! - `registered_faces/<name>.jpg` - one grayscale crop per identity
//!
//! Missing files load as empty documents. Documents are rewritten whole on
//! every change.

pub mod areas;
pub mod faces;
pub mod json;
pub mod roles;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};

pub use areas::AreaList;
pub use faces::{validate_name, FaceStore, StoredFace};
pub use roles::{AccessMatrix, RoleBook, UNKNOWN_ROLE};

/// File holding the name → role mapping.
pub const ROLES_FILE: &str = "roles.json";

/// File holding the role → area permissions.
pub const ROLES_ACCESS_FILE: &str = "roles_access.json";

/// File holding the list of areas.
pub const AREAS_FILE: &str = "areas.json";

/// Directory holding the face crops.
pub const FACES_DIR: &str = "registered_faces";

/// All persistent state, loaded into memory.
#[derive(Debug, Clone)]
pub struct Registry {
    data_dir: PathBuf,
    /// Name → role.
    pub roles: RoleBook,
    /// Role → area → allowed.
    pub access: AccessMatrix,
    /// Known areas.
    pub areas: AreaList,
    /// Stored face crops.
    pub faces: FaceStore,
}

impl Registry {
    /// Load every document under `data_dir`, creating the crop directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created or an existing
    /// document cannot be parsed.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir).map_err(|source| Error::DirectoryCreate {
                path: data_dir.clone(),
                source,
            })?;
        }

        let registry = Self {
            roles: RoleBook::load(&data_dir.join(ROLES_FILE))?,
            access: AccessMatrix::load(&data_dir.join(ROLES_ACCESS_FILE))?,
            areas: AreaList::load(&data_dir.join(AREAS_FILE))?,
            faces: FaceStore::open(data_dir.join(FACES_DIR))?,
            data_dir,
        };

        info!(
            "Registry loaded from {} ({} roles, {} areas)",
            registry.data_dir.display(),
            registry.roles.len(),
            registry.areas.names().len()
        );
        Ok(registry)
    }

    /// The data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of `roles.json`.
    #[must_use]
    pub fn roles_path(&self) -> PathBuf {
        self.data_dir.join(ROLES_FILE)
    }

    /// Path of `roles_access.json`.
    #[must_use]
    pub fn access_path(&self) -> PathBuf {
        self.data_dir.join(ROLES_ACCESS_FILE)
    }

    /// Path of `areas.json`.
    #[must_use]
    pub fn areas_path(&self) -> PathBuf {
        self.data_dir.join(AREAS_FILE)
    }

    /// Persist `roles.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_roles(&self) -> Result<()> {
        self.roles.save(&self.roles_path())
    }

    /// Persist `roles_access.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_access(&self) -> Result<()> {
        self.access.save(&self.access_path())
    }

    /// Persist `areas.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_areas(&self) -> Result<()> {
        self.areas.save(&self.areas_path())
    }

    /// Fail with [`Error::UnknownArea`] unless `area` is listed.
    ///
    /// # Errors
    ///
    /// Returns an error if the area is not in `areas.json`.
    pub fn require_area(&self, area: &str) -> Result<()> {
        if self.areas.contains(area) {
            Ok(())
        } else {
            Err(Error::unknown_area(area, self.areas.names()))
        }
    }

    /// Record `role` for `name` and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or `roles.json` cannot be written.
    pub fn set_role(&mut self, name: &str, role: &str) -> Result<()> {
        validate_name(name)?;
        self.roles.assign(name, role);
        self.save_roles()?;
        debug!("Role of {} set to {}", name, role);
        Ok(())
    }

    /// Forget an identity: its role and its crop.
    ///
    /// Returns `true` if anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or a file cannot be written.
    pub fn remove_identity(&mut self, name: &str) -> Result<bool> {
        let had_crop = self.faces.remove(name)?;
        let had_role = self.roles.remove(name).is_some();
        if had_role {
            self.save_roles()?;
        }
        Ok(had_crop || had_role)
    }

    /// Add an area and persist it. Returns `true` if it was new.
    ///
    /// # Errors
    ///
    /// Returns an error if `areas.json` cannot be written.
    pub fn add_area(&mut self, area: &str) -> Result<bool> {
        let added = self.areas.add(area);
        if added {
            self.save_areas()?;
        }
        Ok(added)
    }

    /// Remove an area and every permission that mentions it.
    ///
    /// Returns `true` if the area was listed.
    ///
    /// # Errors
    ///
    /// Returns an error if a document cannot be written.
    pub fn remove_area(&mut self, area: &str) -> Result<bool> {
        if !self.areas.contains(area) {
            return Ok(false);
        }
        // Permissions go first: a listed area without rules is only denied.
        self.access.remove_area(area);
        self.save_access()?;
        self.areas.remove(area);
        self.save_areas()?;
        Ok(true)
    }

    /// Allow or deny `role` in `area` and persist it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownArea`] for unlisted areas, or an error if
    /// `roles_access.json` cannot be written.
    pub fn set_access(&mut self, role: &str, area: &str, allowed: bool) -> Result<()> {
        self.require_area(area)?;
        self.access.set(role, area, allowed);
        self.save_access()
    }
}
