//! Webcam capture.

use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// An open capture device. Released on drop.
pub struct Camera {
    capture: VideoCapture,
    index: i32,
}

impl std::fmt::Debug for Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Camera").field("index", &self.index).finish()
    }
}

impl Camera {
    /// Open device `index` with whatever backend OpenCV picks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CameraUnavailable`] if the device cannot be opened.
    pub fn open(index: i32) -> Result<Self> {
        let capture = VideoCapture::new(index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::CameraUnavailable { index });
        }
        debug!("Opened camera {}", index);
        Ok(Self { capture, index })
    }

    /// Grab the next frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameRead`] if no frame could be read.
    pub fn read(&mut self) -> Result<Mat> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Err(Error::FrameRead);
        }
        Ok(frame)
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            warn!("Failed to release camera {}: {}", self.index, e);
        }
    }
}
