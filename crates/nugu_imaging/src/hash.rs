//! Perceptual hashes.

use image::DynamicImage;
use image::imageops::FilterType;
use nugu_error::{ImageError, NuguResult};

/// Computes and compares perceptual hashes.
///
/// Similar pictures produce hashes a small distance apart, so re-encoded or
/// lightly cropped copies of the same picture can be detected.
pub trait ImageHasher: Send + Sync {
    /// Hash a decoded picture.
    fn hash(&self, image: &DynamicImage) -> String;

    /// Distance between two hashes produced by [`ImageHasher::hash`].
    ///
    /// # Errors
    ///
    /// Returns an error if either string is not a valid hash.
    fn distance(&self, a: &str, b: &str) -> NuguResult<u32>;
}

/// 64-bit difference hash rendered as 16 hex digits.
///
/// The picture is reduced to a 9x8 greyscale grid and each bit records
/// whether a pixel is brighter than its right neighbour.
///
/// ```
/// use image::{DynamicImage, RgbImage};
/// use nugu_imaging::{DifferenceHasher, ImageHasher};
///
/// let hasher = DifferenceHasher;
/// let img = DynamicImage::ImageRgb8(RgbImage::from_fn(200, 200, |x, _| {
///     image::Rgb([x as u8, 0, 0])
/// }));
/// let hash = hasher.hash(&img);
/// assert_eq!(hash.len(), 16);
/// assert_eq!(hasher.distance(&hash, &hash).unwrap(), 0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DifferenceHasher;

impl DifferenceHasher {
    fn bits(image: &DynamicImage) -> u64 {
        let small = image.resize_exact(9, 8, FilterType::Triangle).to_luma8();
        let mut bits = 0u64;
        for y in 0..8 {
            for x in 0..8 {
                bits <<= 1;
                if small.get_pixel(x, y)[0] > small.get_pixel(x + 1, y)[0] {
                    bits |= 1;
                }
            }
        }
        bits
    }

    fn parse(hash: &str) -> NuguResult<u64> {
        Ok(u64::from_str_radix(hash, 16)
            .map_err(|e| ImageError::new(format!("invalid hash '{}': {}", hash, e)))?)
    }
}

impl ImageHasher for DifferenceHasher {
    fn hash(&self, image: &DynamicImage) -> String {
        format!("{:016x}", Self::bits(image))
    }

    fn distance(&self, a: &str, b: &str) -> NuguResult<u32> {
        Ok((Self::parse(a)? ^ Self::parse(b)?).count_ones())
    }
}
