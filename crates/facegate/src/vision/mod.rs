//! OpenCV glue: camera, Haar cascade detection, LBPH recognition, drawing.
//!
//! Every function here is a thin wrapper over the `opencv` crate that maps
//! its failures onto [`crate::Error`].

pub mod camera;
pub mod detector;
pub mod image;
pub mod overlay;
pub mod recognizer;

pub use camera::Camera;
pub use detector::FaceDetector;
pub use overlay::{draw_overlay, Window};
pub use recognizer::Recognizer;
