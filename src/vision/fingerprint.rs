use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig, ImageHash};

use super::photograph::Photograph;

/// Perceptual hash of a photograph, base64 encoded. Stored with the record
/// so auditors can tell whether two analyses saw the same picture.
pub fn fingerprint(photo: &Photograph) -> String {
    let hasher = HasherConfig::new()
        .hash_alg(HashAlg::DoubleGradient)
        .hash_size(8, 8)
        .to_hasher();

    let image = DynamicImage::ImageRgb8(photo.pixels().clone());
    hasher.hash_image(&image).to_base64()
}

/// Hamming distance between two fingerprints; `u32::MAX` if either is malformed.
pub fn fingerprint_distance(lhs: &str, rhs: &str) -> u32 {
    let Ok(h1) = ImageHash::<Vec<u8>>::from_base64(lhs) else {
        return u32::MAX;
    };
    let Ok(h2) = ImageHash::<Vec<u8>>::from_base64(rhs) else {
        return u32::MAX;
    };
    h1.dist(&h2)
}
