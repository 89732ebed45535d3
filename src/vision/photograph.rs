use image::{GrayImage, Luma, RgbImage};

use crate::error::AnalysisError;
use crate::models::Role;

/// A decoded, role-tagged photograph. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct Photograph {
    role: Role,
    pixels: RgbImage,
}

impl Photograph {
    pub fn new(role: Role, pixels: RgbImage) -> Result<Self, AnalysisError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(AnalysisError::EmptyImage { role });
        }
        Ok(Self { role, pixels })
    }

    /// Decodes JPEG/PNG bytes; alpha and higher bit depths are flattened to 8-bit RGB.
    pub fn decode(role: Role, bytes: &[u8]) -> Result<Self, AnalysisError> {
        let image = image::load_from_memory(bytes)
            .map_err(|source| AnalysisError::UnreadableImage { role, source })?;
        Self::new(role, image.to_rgb8())
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn grayscale(&self) -> GrayImage {
        to_gray(&self.pixels)
    }
}

// BT.601 luma in 14-bit fixed point with rounding.
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Integer BT.601 conversion. `image`'s own `to_luma8` uses Rec.709 weights,
/// which would shift every brightness statistic.
pub fn to_gray(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = (r as u32 * R_WEIGHT
            + g as u32 * G_WEIGHT
            + b as u32 * B_WEIGHT
            + (1 << (LUMA_SHIFT - 1)))
            >> LUMA_SHIFT;
        Luma([luma.min(255) as u8])
    })
}
