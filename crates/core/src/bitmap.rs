//! Monochrome bitmap encoding for the `BITMAP` command.
//!
//! Pixels are resampled to the requested height (aspect ratio preserved),
//! converted to luminance, composited over a white background according to
//! their alpha channel, and thresholded at 128. Rows are packed MSB-first and
//! padded to whole bytes; padding bits are always zero.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::CommandError;

/// Luminance below this value prints a dot.
pub const DARK_THRESHOLD: u8 = 128;

/// A binarized image in the row layout `BITMAP` expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Width in pixels before padding.
    pub width_dots: u32,
    /// Row stride in bytes, `ceil(width_dots / 8)`.
    pub width_bytes: u32,
    /// Number of rows.
    pub height_dots: u32,
    /// `height_dots * width_bytes` bytes; a set bit is a printed dot.
    pub data: Vec<u8>,
}

impl Bitmap {
    /// Whether the dot at (`x`, `y`) is printed. Out-of-range positions,
    /// including ones past the end of a short `data`, return `false`.
    pub fn is_dark(&self, x: u32, y: u32) -> bool {
        if x >= self.width_dots || y >= self.height_dots {
            return false;
        }
        let idx = u64::from(y) * u64::from(self.width_bytes) + u64::from(x / 8);
        usize::try_from(idx)
            .ok()
            .and_then(|idx| self.data.get(idx))
            .is_some_and(|byte| byte & (0x80 >> (x % 8)) != 0)
    }
}

/// Encode decoded RGBA pixels.
///
/// `target_height_dots` of 0 (or equal to the source height) keeps the source
/// size; any other positive value rescales to that height with width
/// `round(width * target / height)`. Negative heights are rejected.
pub fn encode(pixels: &RgbaImage, target_height_dots: i32) -> Result<Bitmap, CommandError> {
    if target_height_dots < 0 {
        return Err(CommandError::invalid(
            "target_height_dots",
            format!("{target_height_dots} must not be negative"),
        ));
    }
    let target = target_height_dots as u32;
    let (src_w, src_h) = pixels.dimensions();

    if target == 0 || target == src_h || src_w == 0 || src_h == 0 {
        return Ok(pack(pixels));
    }

    let new_w = scaled_width(src_w, src_h, target);
    let resized = imageops::resize(pixels, new_w, target, FilterType::Triangle);
    Ok(pack(&resized))
}

/// Decode PNG/JPEG/BMP/GIF bytes and encode the result.
pub fn encode_image_bytes(bytes: &[u8], target_height_dots: i32) -> Result<Bitmap, CommandError> {
    if target_height_dots < 0 {
        return Err(CommandError::invalid(
            "target_height_dots",
            format!("{target_height_dots} must not be negative"),
        ));
    }
    let decoded = image::load_from_memory(bytes).map_err(|e| CommandError::Decode(e.to_string()))?;
    encode(&decoded.to_rgba8(), target_height_dots)
}

/// `round(width * target / height)`, never less than one column.
fn scaled_width(width: u32, height: u32, target: u32) -> u32 {
    let num = u64::from(width) * u64::from(target);
    let den = u64::from(height);
    let rounded = (num * 2 + den) / (den * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX).max(1)
}

/// Perceptual luminance composited over white.
///
/// `Y = (76 R + 150 G + 29 B) >> 8`; a pixel with alpha `a` contributes
/// `Y * a / 255` of itself and the rest is white, so fully transparent
/// pixels read as 255.
pub fn luminance(rgba: [u8; 4]) -> u8 {
    let [r, g, b, a] = rgba.map(u32::from);
    let y = (r * 76 + g * 150 + b * 29) >> 8;
    let composited = 255 - (255 - y) * a / 255;
    composited as u8
}

/// Threshold and pack every row.
fn pack(pixels: &RgbaImage) -> Bitmap {
    let (width, height) = pixels.dimensions();
    let width_bytes = width.div_ceil(8);
    let mut data = vec![0u8; (width_bytes * height) as usize];

    for (x, y, px) in pixels.enumerate_pixels() {
        if luminance(px.0) < DARK_THRESHOLD {
            let idx = (y * width_bytes + x / 8) as usize;
            data[idx] |= 0x80 >> (x % 8);
        }
    }

    Bitmap {
        width_dots: width,
        width_bytes,
        height_dots: height,
        data,
    }
}
