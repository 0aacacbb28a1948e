//! Decoding, validation, resizing and encoding.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use nugu_error::{ImageError, NuguResult, ValidationError, ValidationErrorKind};
use std::io::Cursor;

/// Size rules for submitted pictures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRules {
    /// Smallest accepted side length
    pub min_side: u32,
    /// Largest accepted side length
    pub max_side: u32,
}

impl Default for ImageRules {
    fn default() -> Self {
        Self {
            min_side: 150,
            max_side: 2000,
        }
    }
}

impl ImageRules {
    /// Reject pictures that are not square or whose side is out of range.
    ///
    /// ```
    /// use image::{DynamicImage, RgbImage};
    /// use nugu_imaging::ImageRules;
    ///
    /// let rules = ImageRules::default();
    /// let square = DynamicImage::ImageRgb8(RgbImage::new(300, 300));
    /// let wide = DynamicImage::ImageRgb8(RgbImage::new(300, 200));
    /// let tiny = DynamicImage::ImageRgb8(RgbImage::new(100, 100));
    /// assert!(rules.check(&square).is_ok());
    /// assert!(rules.check(&wide).is_err());
    /// assert!(rules.check(&tiny).is_err());
    /// ```
    pub fn check(&self, image: &DynamicImage) -> NuguResult<()> {
        let (width, height) = image.dimensions();
        if width != height {
            Err(ValidationError::new(ValidationErrorKind::NotSquare(width, height)))?
        }
        if height < self.min_side || height > self.max_side {
            Err(ValidationError::new(ValidationErrorKind::InvalidDimensions(
                self.min_side,
                self.max_side,
                height,
            )))?
        }
        Ok(())
    }
}

/// Accept only PNG and JPEG content types.
///
/// ```
/// use nugu_imaging::check_content_type;
///
/// assert!(check_content_type("image/png").is_ok());
/// assert!(check_content_type("image/jpeg; charset=binary").is_ok());
/// assert!(check_content_type("image/gif").is_err());
/// ```
pub fn check_content_type(content_type: &str) -> NuguResult<()> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "image/png" | "image/jpeg" => Ok(()),
        _ => Err(ValidationError::new(ValidationErrorKind::UnsupportedContentType(
            content_type.to_string(),
        )))?,
    }
}

/// Decode a PNG or JPEG body.
///
/// A body that cannot be decoded is reported as an invalid URL since the
/// user only ever supplies a link or an attachment.
pub fn decode(bytes: &[u8]) -> NuguResult<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| {
        tracing::debug!(error = %e, "Submitted image failed to decode");
        ValidationError::new(ValidationErrorKind::InvalidUrl(
            "the image could not be decoded".to_string(),
        ))
        .into()
    })
}

/// Scale to `height`, keeping the aspect ratio.
pub fn resize_to_height(image: &DynamicImage, height: u32) -> DynamicImage {
    let (w, h) = image.dimensions();
    if h == 0 {
        return image.clone();
    }
    let width = ((w as u64 * height as u64) / h as u64).max(1) as u32;
    image.resize_exact(width, height, FilterType::Lanczos3)
}

/// Encode as PNG.
pub fn encode_png(image: &DynamicImage) -> NuguResult<Vec<u8>> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| ImageError::new(format!("PNG encoding failed: {}", e)))?;
    Ok(buf)
}
