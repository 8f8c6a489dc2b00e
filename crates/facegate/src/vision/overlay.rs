//! Drawing annotations and showing frames.

use std::time::Duration;

use opencv::core::{Mat, Scalar};
use opencv::{highgui, imgproc};
use tracing::warn;

use crate::access::{Bgr, FrameOverlay};
use crate::error::Result;

/// Line thickness for boxes and text.
const THICKNESS: i32 = 2;

/// Font scale for all text.
const FONT_SCALE: f64 = 0.8;

fn scalar(color: Bgr) -> Scalar {
    Scalar::new(
        f64::from(color.0),
        f64::from(color.1),
        f64::from(color.2),
        0.0,
    )
}

/// Draw every box, then every text of `overlay`, onto `frame`.
///
/// # Errors
///
/// Returns an error if OpenCV fails to draw.
pub fn draw_overlay(frame: &mut Mat, overlay: &FrameOverlay) -> Result<()> {
    for (rect, color) in &overlay.boxes {
        imgproc::rectangle(frame, *rect, scalar(*color), THICKNESS, imgproc::LINE_8, 0)?;
    }
    for annotation in &overlay.texts {
        imgproc::put_text(
            frame,
            &annotation.text,
            annotation.origin,
            imgproc::FONT_HERSHEY_SIMPLEX,
            FONT_SCALE,
            scalar(annotation.color),
            THICKNESS,
            imgproc::LINE_8,
            false,
        )?;
    }
    Ok(())
}

/// A named preview window. Destroyed on drop.
#[derive(Debug)]
pub struct Window {
    name: String,
    delay_ms: i32,
}

impl Window {
    /// Create the window. `delay` is how long [`Window::poll_key`] waits.
    ///
    /// # Errors
    ///
    /// Returns an error if no GUI backend is available.
    pub fn open(name: &str, delay: Duration) -> Result<Self> {
        highgui::named_window(name, highgui::WINDOW_AUTOSIZE)?;
        // A zero wait blocks until a key is pressed.
        let delay_ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX).max(1);
        Ok(Self {
            name: name.to_string(),
            delay_ms,
        })
    }

    /// Display `frame`.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be shown.
    pub fn show(&self, frame: &Mat) -> Result<()> {
        highgui::imshow(&self.name, frame)?;
        Ok(())
    }

    /// Wait briefly for a key press.
    ///
    /// # Errors
    ///
    /// Returns an error if the GUI event loop fails.
    pub fn poll_key(&self) -> Result<Option<char>> {
        let key = highgui::wait_key(self.delay_ms)?;
        Ok(key_to_char(key))
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.name) {
            warn!("Failed to close window '{}': {}", self.name, e);
        }
    }
}

/// `waitKey` returns -1 for no key; some backends set bits above the low byte.
fn key_to_char(key: i32) -> Option<char> {
    if key < 0 {
        return None;
    }
    u8::try_from(key & 0xFF).ok().map(char::from)
}

#[cfg(test)]
mod tests {
    use opencv::core::{Point, Rect, CV_8UC3};
    use opencv::prelude::*;

    use super::*;
    use crate::access::Annotation;

    #[test]
    fn test_key_to_char() {
        assert_eq!(key_to_char(-1), None);
        assert_eq!(key_to_char(i32::from(b'q')), Some('q'));
        assert_eq!(key_to_char(0x10_0000 | i32::from(b'c')), Some('c'));
    }

    #[test]
    fn test_scalar_channel_order() {
        let s = scalar(Bgr::RED);
        assert!((s[2] - 255.0).abs() < f64::EPSILON);
        assert!(s[0].abs() < f64::EPSILON);
    }

    #[test]
    fn test_draw_overlay_marks_pixels() {
        let mut frame =
            Mat::new_rows_cols_with_default(100, 100, CV_8UC3, Scalar::all(0.0)).unwrap();
        let overlay = FrameOverlay {
            boxes: vec![(Rect::new(10, 10, 50, 50), Bgr::GREEN)],
            texts: vec![Annotation {
                text: "x".to_string(),
                origin: Point::new(5, 90),
                color: Bgr::WHITE,
            }],
        };

        draw_overlay(&mut frame, &overlay).unwrap();

        let corner = frame.at_2d::<opencv::core::Vec3b>(10, 10).unwrap();
        assert_eq!(corner.0, [0, 255, 0]);
    }
}
