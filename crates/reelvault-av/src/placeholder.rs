//! Stand-in thumbnails written when no frame can be extracted.

use crate::Result;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::path::Path;

const PLACEHOLDER_GRAY: Rgb<u8> = Rgb([128, 128, 128]);

/// Write a solid gray `width`×`height` image to `output`.
///
/// `.png` outputs are PNG encoded, everything else JPEG.
pub fn write_placeholder(output: &Path, width: u32, height: u32) -> Result<()> {
    let format = match ImageFormat::from_path(output) {
        Ok(ImageFormat::Png) => ImageFormat::Png,
        _ => ImageFormat::Jpeg,
    };

    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width.max(1),
        height.max(1),
        PLACEHOLDER_GRAY,
    ));
    image.save_with_format(output, format)?;
    Ok(())
}
