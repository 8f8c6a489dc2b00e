//! Error types for facegate.
//!
//! This module defines all error types used throughout the facegate crate.
//! Display strings double as the messages printed to the user when an
//! action is aborted, so they are phrased for the terminal.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for facegate operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Vision Errors ===
    /// The camera device could not be opened.
    #[error("Failed to access the webcam (device {index}).")]
    CameraUnavailable {
        /// Device index passed to the capture backend.
        index: i32,
    },

    /// A frame could not be grabbed from an open camera.
    #[error("Failed to access the webcam.")]
    FrameRead,

    /// The Haar cascade could not be loaded.
    #[error("failed to load face cascade from {path}")]
    CascadeLoad {
        /// Path that was tried.
        path: PathBuf,
    },

    /// An image file exists but could not be decoded.
    #[error("failed to read image {path}")]
    ImageRead {
        /// Path to the image.
        path: PathBuf,
    },

    /// An image could not be encoded or written.
    #[error("failed to write image {path}")]
    ImageWrite {
        /// Destination path.
        path: PathBuf,
    },

    /// An OpenCV call failed.
    #[error("vision library error: {0}")]
    Vision(#[from] opencv::Error),

    // === Registration Errors ===
    /// The photo passed for registration does not exist.
    #[error("File not found. Please check the file path: {}", path.display())]
    PhotoNotFound {
        /// Path given by the user.
        path: PathBuf,
    },

    /// Registration needs exactly one face in the picture.
    #[error("Please ensure the photo contains exactly one face (found {found}).")]
    FaceCount {
        /// Number of faces detected.
        found: usize,
    },

    /// The identity name cannot be used as a crop file name.
    #[error("invalid name '{name}': use letters, digits, spaces, '_', '-' or '.'")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    // === Recognition Errors ===
    /// The requested area is not in the area list.
    #[error("Invalid camera name. Please choose from {}.", format_areas(known))]
    UnknownArea {
        /// The name given by the user.
        name: String,
        /// Areas that are configured.
        known: Vec<String>,
    },

    /// There are no face crops to train on.
    #[error("No registered faces to train.")]
    NoRegisteredFaces,

    /// Recognition was requested before any training.
    #[error("recognizer has not been trained")]
    NotTrained,

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a data file.
    #[error("failed to read {path}: {source}")]
    FileRead {
        /// Path of the file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a data file.
    #[error("failed to write {path}: {source}")]
    FileWrite {
        /// Path of the file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for facegate operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

/// Renders an area list the way the menu prompt shows it: `['a', 'b']`.
#[must_use]
pub fn format_areas(areas: &[String]) -> String {
    let quoted: Vec<String> = areas.iter().map(|a| format!("'{a}'")).collect();
    format!("[{}]", quoted.join(", "))
}

impl Error {
    /// Create an unknown-area error.
    #[must_use]
    pub fn unknown_area(name: impl Into<String>, known: &[String]) -> Self {
        Self::UnknownArea {
            name: name.into(),
            known: known.to_vec(),
        }
    }

    /// Check if this error only aborts the current action.
    ///
    /// Everything except configuration problems is recoverable from the menu.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::ConfigLoad(_) | Self::ConfigValidation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_areas() {
        assert_eq!(format_areas(&[]), "[]");
        assert_eq!(
            format_areas(&["Kitchen".to_string(), "Garage".to_string()]),
            "['Kitchen', 'Garage']"
        );
    }

    #[test]
    fn test_unknown_area_display() {
        let err = Error::unknown_area("Attic", &["Kitchen".to_string()]);
        assert_eq!(
            err.to_string(),
            "Invalid camera name. Please choose from ['Kitchen']."
        );
    }

    #[test]
    fn test_face_count_display() {
        let err = Error::FaceCount { found: 2 };
        assert!(err.to_string().contains("exactly one face"));
        assert!(err.to_string().contains('2'));
    }

    #[test]
    fn test_no_registered_faces_display() {
        assert_eq!(
            Error::NoRegisteredFaces.to_string(),
            "No registered faces to train."
        );
    }

    #[test]
    fn test_frame_read_display() {
        assert_eq!(Error::FrameRead.to_string(), "Failed to access the webcam.");
    }

    #[test]
    fn test_photo_not_found_display() {
        let err = Error::PhotoNotFound {
            path: PathBuf::from("/tmp/missing.jpg"),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("File not found."));
        assert!(msg.contains("/tmp/missing.jpg"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::FrameRead.is_recoverable());
        assert!(Error::NoRegisteredFaces.is_recoverable());
        assert!(!Error::ConfigValidation {
            message: "bad".to_string()
        }
        .is_recoverable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }

    #[test]
    fn test_invalid_name_display() {
        let err = Error::InvalidName {
            name: "../etc".to_string(),
        };
        assert!(err.to_string().contains("../etc"));
    }
}
