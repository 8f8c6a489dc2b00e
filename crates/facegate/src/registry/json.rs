//! JSON document helpers shared by the registry files.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::debug;

use crate::error::{Error, Result};

/// Indentation used for every document written to disk.
const INDENT: &[u8] = b"    ";

/// Read a JSON document, returning the default value when the file is missing.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn read_or_default<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match std::fs::read(path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} does not exist, starting empty", path.display());
            Ok(T::default())
        }
        Err(source) => Err(Error::FileRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Serialize a value as pretty JSON with 4-space indentation.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_pretty_string<T: Serialize>(value: &T) -> Result<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write a value as pretty JSON, replacing the file.
///
/// Creates the parent directory if needed.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let contents = to_pretty_string(value)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    std::fs::write(path, contents).map_err(|source| Error::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let value: BTreeMap<String, String> =
            read_or_default(&dir.path().join("absent.json")).unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result: Result<BTreeMap<String, String>> = read_or_default(&path);
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_pretty_uses_four_spaces() {
        let mut value = BTreeMap::new();
        value.insert("Alice".to_string(), "Admin".to_string());

        let text = to_pretty_string(&value).unwrap();
        assert_eq!(text, "{\n    \"Alice\": \"Admin\"\n}");
    }

    #[test]
    fn test_write_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");

        write_pretty(&path, &vec![1, 2, 3]).unwrap();
        let back: Vec<i32> = read_or_default(&path).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }
}
