//! The directory of registered face crops, one `<name>.jpg` per identity.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Extension of stored crops. Only files with exactly this extension are used.
pub const CROP_EXTENSION: &str = "jpg";

/// Longest accepted identity name.
pub const MAX_NAME_LEN: usize = 64;

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[\p{L}\p{N} _.\-]+$").expect("name pattern is a valid regex")
    })
}

/// Check that `name` can be used as a crop file stem.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] for empty names, names longer than
/// [`MAX_NAME_LEN`] characters, `.`/`..`, or names with other characters
/// (path separators included).
pub fn validate_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    let valid = !trimmed.is_empty()
        && trimmed == name
        && name.chars().count() <= MAX_NAME_LEN
        && name != "."
        && name != ".."
        && name_pattern().is_match(name);

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidName {
            name: name.to_string(),
        })
    }
}

/// A crop found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFace {
    /// Identity name (the file stem).
    pub name: String,
    /// Full path to the crop.
    pub path: PathBuf,
}

/// The `registered_faces/` directory.
#[derive(Debug, Clone)]
pub struct FaceStore {
    dir: PathBuf,
}

impl FaceStore {
    /// Use `dir` as the crop directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|source| Error::DirectoryCreate {
                path: dir.clone(),
                source,
            })?;
            info!("Created face directory {}", dir.display());
        }
        Ok(Self { dir })
    }

    /// The crop directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the crop for `name` is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a valid identity name.
    pub fn crop_path(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{name}.{CROP_EXTENSION}")))
    }

    /// Every stored crop, sorted by name.
    ///
    /// Files with other extensions and subdirectories are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed.
    pub fn list(&self) -> Result<Vec<StoredFace>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| Error::FileRead {
            path: self.dir.clone(),
            source,
        })?;

        let mut faces = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(CROP_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                debug!("Skipping crop with non UTF-8 name: {}", path.display());
                continue;
            };
            faces.push(StoredFace {
                name: name.to_string(),
                path,
            });
        }
        faces.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(faces)
    }

    /// Whether no crops are stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.list()?.is_empty())
    }

    /// Delete the crop for `name`. Returns `true` if a file was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is invalid or the file cannot be removed.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let path = self.crop_path(name)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed crop {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_accepts() {
        for name in ["Alice", "Mr. Whiskers", "bob_2", "Zoë", "anne-marie"] {
            assert!(validate_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_validate_name_rejects() {
        for name in ["", "   ", " Alice", "..", ".", "../etc/passwd", "a/b", "a\\b", "x:y"] {
            assert!(
                matches!(validate_name(name), Err(Error::InvalidName { .. })),
                "{name:?} should be rejected"
            );
        }
        assert!(validate_name(&"a".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_open_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let faces_dir = dir.path().join("registered_faces");

        let store = FaceStore::open(&faces_dir).unwrap();
        assert!(faces_dir.is_dir());
        assert_eq!(store.dir(), faces_dir);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_crop_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = FaceStore::open(dir.path()).unwrap();

        assert_eq!(
            store.crop_path("Alice").unwrap(),
            dir.path().join("Alice.jpg")
        );
        assert!(store.crop_path("../Alice").is_err());
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let store = FaceStore::open(dir.path()).unwrap();
        for file in ["carol.jpg", "alice.jpg", "bob.png", "notes.txt", "dave.JPG"] {
            std::fs::write(dir.path().join(file), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("eve.jpg")).unwrap();

        let names: Vec<String> = store.list().unwrap().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["alice", "carol"]);
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FaceStore::open(dir.path()).unwrap();
        std::fs::write(dir.path().join("Rex.jpg"), b"x").unwrap();

        assert!(store.remove("Rex").unwrap());
        assert!(!store.remove("Rex").unwrap());
        assert!(store.is_empty().unwrap());
    }
}
