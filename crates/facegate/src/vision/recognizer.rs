//! LBPH face recognition.

use opencv::core::{Mat, Ptr, Vector};
use opencv::face::LBPHFaceRecognizer;
use opencv::prelude::*;
use tracing::info;

use crate::access::{LabelMap, Prediction};
use crate::config::RecognitionConfig;
use crate::error::{Error, Result};
use crate::vision::image::resize_square;

/// A trained LBPH model and the identities it knows.
///
/// Training and prediction both resize faces to the same square size so
/// crops of any size can be mixed.
pub struct Recognizer {
    model: Ptr<LBPHFaceRecognizer>,
    labels: LabelMap,
    face_size: i32,
}

impl std::fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recognizer")
            .field("labels", &self.labels)
            .field("face_size", &self.face_size)
            .finish_non_exhaustive()
    }
}

impl Recognizer {
    /// Train a new model on `(name, grayscale face)` samples.
    ///
    /// Labels are assigned in sample order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRegisteredFaces`] when `samples` is empty, or an
    /// error if OpenCV rejects the training data.
    pub fn train(config: &RecognitionConfig, samples: Vec<(String, Mat)>) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::NoRegisteredFaces);
        }

        let mut model = LBPHFaceRecognizer::create(
            config.radius,
            config.neighbors,
            config.grid_x,
            config.grid_y,
            f64::MAX,
        )?;

        let mut labels = LabelMap::default();
        let mut images = Vector::<Mat>::new();
        let mut label_ids = Vector::<i32>::new();
        for (name, face) in samples {
            images.push(resize_square(&face, config.face_size)?);
            label_ids.push(labels.insert(name));
        }

        model.train(&images, &label_ids)?;
        info!(
            "Trained recognizer on {} images of {} identities",
            images.len(),
            labels.len()
        );

        Ok(Self {
            model,
            labels,
            face_size: config.face_size,
        })
    }

    /// The identities the model was trained on.
    #[must_use]
    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    /// Predict the identity of a grayscale face crop.
    ///
    /// # Errors
    ///
    /// Returns an error if OpenCV fails to run the prediction.
    pub fn predict(&self, face: &Mat) -> Result<Prediction> {
        let resized = resize_square(face, self.face_size)?;
        let mut label = -1;
        let mut confidence = f64::MAX;
        self.model.predict(&resized, &mut label, &mut confidence)?;
        Ok(Prediction { label, confidence })
    }
}
