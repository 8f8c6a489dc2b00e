//! Grayscale conversion, cropping, resizing and JPEG I/O.

use std::path::Path;

use opencv::core::{Mat, Rect, Size, Vector};
use opencv::prelude::*;
use opencv::{imgcodecs, imgproc};

use crate::error::{Error, Result};

/// Convert a BGR camera frame to grayscale.
///
/// # Errors
///
/// Returns an error if the conversion fails.
pub fn to_gray(frame: &Mat) -> Result<Mat> {
    let mut gray = Mat::default();
    imgproc::cvt_color_def(frame, &mut gray, imgproc::COLOR_BGR2GRAY)?;
    Ok(gray)
}

/// Copy the region `rect` out of `image`.
///
/// # Errors
///
/// Returns an error if `rect` is outside the image.
pub fn crop(image: &Mat, rect: Rect) -> Result<Mat> {
    let region = Mat::roi(image, rect)?;
    Ok(region.try_clone()?)
}

/// Resize to a `side`×`side` square.
///
/// # Errors
///
/// Returns an error if the resize fails.
pub fn resize_square(image: &Mat, side: i32) -> Result<Mat> {
    let mut resized = Mat::default();
    imgproc::resize(
        image,
        &mut resized,
        Size::new(side, side),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;
    Ok(resized)
}

/// Read an image file as grayscale.
///
/// # Errors
///
/// Returns [`Error::ImageRead`] if the file cannot be decoded.
pub fn read_gray(path: &Path) -> Result<Mat> {
    let unreadable = || Error::ImageRead {
        path: path.to_path_buf(),
    };
    let path_str = path.to_str().ok_or_else(unreadable)?;
    let image = imgcodecs::imread(path_str, imgcodecs::IMREAD_GRAYSCALE)?;
    if image.empty() {
        return Err(unreadable());
    }
    Ok(image)
}

/// Write an image; the format follows the file extension.
///
/// # Errors
///
/// Returns [`Error::ImageWrite`] if the image cannot be encoded or written.
pub fn write_image(path: &Path, image: &Mat) -> Result<()> {
    let unwritable = || Error::ImageWrite {
        path: path.to_path_buf(),
    };
    let path_str = path.to_str().ok_or_else(unwritable)?;
    if imgcodecs::imwrite(path_str, image, &Vector::<i32>::new())? {
        Ok(())
    } else {
        Err(unwritable())
    }
}
