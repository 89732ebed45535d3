//! Role-specific feature extraction.
//!
//! `extract` depends only on pixel content: no clocks, no randomness, no
//! shared state. The same photograph always produces the same bundle.

use std::time::Instant;

use image::GrayImage;

use super::canny::canny;
use super::config::ExtractionConfig;
use super::filters::{brightness_stats, laplacian, mean_local_std};
use super::hough::detect_segments;
use super::photograph::Photograph;
use crate::log_debug;
use crate::models::{
    BackFeatures, DrapeFeatures, FeatureBundle, FeatureSet, FrontFeatures, MacroFeatures, Role,
    SideFeatures,
};

const ENABLE_LOGS: bool = true;

pub fn extract(photo: &Photograph) -> FeatureBundle {
    extract_with(photo, &ExtractionConfig::default())
}

pub fn extract_with(photo: &Photograph, config: &ExtractionConfig) -> FeatureBundle {
    let started = Instant::now();
    let gray = photo.grayscale();

    let bundle = match photo.role() {
        Role::Front => FeatureBundle::Front(front_features(&gray, config)),
        Role::Side => FeatureBundle::Side(side_features(&gray, config)),
        Role::Macro => FeatureBundle::Macro(macro_features(&gray, config)),
        Role::Drape => FeatureBundle::Drape(drape_features(&gray, config)),
        Role::Back => FeatureBundle::Back(back_features(&gray, config)),
    };

    log_debug!(
        "Extracted {} features from {}x{} image in {}ms",
        photo.role(),
        photo.width(),
        photo.height(),
        started.elapsed().as_millis()
    );
    bundle
}

/// Extracts every photograph; a later photograph with the same role replaces an earlier one.
pub fn extract_all<'a>(photos: impl IntoIterator<Item = &'a Photograph>) -> FeatureSet {
    let config = ExtractionConfig::default();
    photos
        .into_iter()
        .map(|photo| (photo.role(), extract_with(photo, &config)))
        .collect()
}

fn front_features(gray: &GrayImage, config: &ExtractionConfig) -> FrontFeatures {
    let edge_density = canny(gray, config.front_canny).density();
    let (mean_brightness, brightness_std) = brightness_stats(gray);
    let texture_var = laplacian(gray).variance();

    FrontFeatures {
        edge_density,
        brightness_std,
        texture_var,
        mean_brightness,
    }
}

fn side_features(gray: &GrayImage, config: &ExtractionConfig) -> SideFeatures {
    let width = gray.width();
    let mid = gray.height() / 2;

    let jumps = (1..width)
        .filter(|&x| {
            let prev = gray.get_pixel(x - 1, mid).0[0] as f64;
            let curr = gray.get_pixel(x, mid).0[0] as f64;
            (curr - prev).abs() > config.side_jump_threshold
        })
        .count();

    SideFeatures {
        thickness_indicator: jumps as f64 / width as f64,
    }
}

fn macro_features(gray: &GrayImage, config: &ExtractionConfig) -> MacroFeatures {
    MacroFeatures {
        micro_roughness: mean_local_std(gray, config.macro_window),
    }
}

fn drape_features(gray: &GrayImage, config: &ExtractionConfig) -> DrapeFeatures {
    let edges = canny(gray, config.drape_canny);
    let segments = detect_segments(&edges, config.drape_hough);
    let (avg_brightness, _) = brightness_stats(gray);

    DrapeFeatures {
        flexibility: segments.len() as u32,
        avg_brightness,
    }
}

fn back_features(gray: &GrayImage, config: &ExtractionConfig) -> BackFeatures {
    let (_, std) = brightness_stats(gray);
    BackFeatures {
        uniformity: (100.0 - std.min(config.back_std_cap)).clamp(0.0, 100.0),
    }
}
