//! Haar cascade face detection.

use std::path::{Path, PathBuf};

use opencv::core::{self, Mat, Rect, Size, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use tracing::{debug, trace};

use crate::config::{DetectionConfig, DEFAULT_CASCADE};
use crate::error::{Error, Result};

/// A loaded cascade plus the parameters it is run with.
pub struct FaceDetector {
    cascade: CascadeClassifier,
    path: PathBuf,
    scale_factor: f64,
    min_neighbors: i32,
    min_size: Size,
}

impl std::fmt::Debug for FaceDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaceDetector")
            .field("path", &self.path)
            .field("scale_factor", &self.scale_factor)
            .field("min_neighbors", &self.min_neighbors)
            .finish_non_exhaustive()
    }
}

/// Locate the frontal face cascade bundled with OpenCV.
///
/// # Errors
///
/// Returns [`Error::CascadeLoad`] if OpenCV's data search finds nothing.
pub fn default_cascade_path() -> Result<PathBuf> {
    let found = core::find_file(DEFAULT_CASCADE, false, true)?;
    if found.is_empty() {
        return Err(Error::CascadeLoad {
            path: PathBuf::from(DEFAULT_CASCADE),
        });
    }
    Ok(PathBuf::from(found))
}

impl FaceDetector {
    /// Load the configured cascade, or OpenCV's default frontal face cascade.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CascadeLoad`] if the cascade is missing or invalid.
    pub fn load(config: &DetectionConfig) -> Result<Self> {
        let path = match &config.cascade_path {
            Some(path) => path.clone(),
            None => default_cascade_path()?,
        };
        let cascade = load_cascade(&path)?;
        debug!("Loaded face cascade from {}", path.display());

        Ok(Self {
            cascade,
            path,
            scale_factor: config.scale_factor,
            min_neighbors: config.min_neighbors,
            min_size: Size::new(config.min_face_size, config.min_face_size),
        })
    }

    /// Path the cascade was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Find face bounding boxes in a grayscale image.
    ///
    /// # Errors
    ///
    /// Returns an error if the cascade fails to run.
    pub fn detect(&mut self, gray: &Mat) -> Result<Vec<Rect>> {
        let mut faces = Vector::<Rect>::new();
        self.cascade.detect_multi_scale(
            gray,
            &mut faces,
            self.scale_factor,
            self.min_neighbors,
            0,
            self.min_size,
            Size::new(0, 0),
        )?;
        trace!("Detected {} faces", faces.len());
        Ok(faces.to_vec())
    }
}

fn load_cascade(path: &Path) -> Result<CascadeClassifier> {
    let missing = || Error::CascadeLoad {
        path: path.to_path_buf(),
    };
    if !path.is_file() {
        return Err(missing());
    }
    let path_str = path.to_str().ok_or_else(missing)?;
    let cascade = CascadeClassifier::new(path_str)?;
    if cascade.empty()? {
        return Err(missing());
    }
    Ok(cascade)
}
