use super::config::EstimationConfig;
use crate::models::{
    DrapeFeatures, FeatureBundle, FeatureSet, FrontFeatures, MacroFeatures, PropertyEstimate,
    Role, SideFeatures,
};

pub fn estimate(features: &FeatureSet) -> PropertyEstimate {
    estimate_with(features, &EstimationConfig::default())
}

/// Starts from the baseline and lets each present role refine it, in
/// front → side → macro → drape → back order regardless of upload order.
pub fn estimate_with(features: &FeatureSet, config: &EstimationConfig) -> PropertyEstimate {
    let mut result = config.baseline;

    for role in Role::ALL {
        match features.get(&role) {
            Some(FeatureBundle::Front(front)) => apply_front(&mut result, front, config),
            Some(FeatureBundle::Side(side)) => apply_side(&mut result, side, config),
            Some(FeatureBundle::Macro(m)) => apply_macro(&mut result, m, config),
            Some(FeatureBundle::Drape(drape)) => apply_drape(&mut result, drape, config),
            // Back is diagnostic only.
            Some(FeatureBundle::Back(_)) | None => {}
        }
    }

    result
}

/// Amount macro adds to roughness before the cap.
pub fn roughness_correction(micro_roughness: f64, config: &EstimationConfig) -> f64 {
    round_to(micro_roughness * config.macro_roughness_gain, 2)
}

fn apply_front(result: &mut PropertyEstimate, front: &FrontFeatures, config: &EstimationConfig) {
    let density = config.density_base
        + (front.edge_density * config.density_edge_gain).min(config.density_edge_cap);
    result.density = truncate(density);

    let gloss =
        config.gloss_base + (front.brightness_std * config.gloss_std_gain).min(config.gloss_std_cap);
    result.gloss = truncate(gloss);

    let roughness = config.roughness_base
        + (front.texture_var * config.roughness_texture_gain).min(config.roughness_texture_cap);
    result.roughness = round_to(roughness, 2);

    let weight = config.weight_base
        + (result.density as f64 - config.density_base) * config.weight_density_gain
        + (255.0 - front.mean_brightness) * config.weight_darkness_gain;
    result.weight = truncate(weight);
}

fn apply_side(result: &mut PropertyEstimate, side: &SideFeatures, config: &EstimationConfig) {
    let thickness = config.thickness_base
        + (side.thickness_indicator * config.thickness_indicator_gain)
            .min(config.thickness_indicator_cap);
    result.thickness = round_to(thickness, 2);
}

fn apply_macro(result: &mut PropertyEstimate, m: &MacroFeatures, config: &EstimationConfig) {
    let corrected = round_to(result.roughness + roughness_correction(m.micro_roughness, config), 2);
    result.roughness = corrected.min(config.roughness_max);
}

fn apply_drape(result: &mut PropertyEstimate, drape: &DrapeFeatures, config: &EstimationConfig) {
    let touch = config.touch_base
        + (drape.flexibility as f64 * config.touch_flex_gain).min(config.touch_flex_cap)
        + drape.avg_brightness / config.touch_brightness_divisor;
    result.touch_score = round_to(touch, 1).min(config.touch_max);
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Integer part, floored at zero.
fn truncate(value: f64) -> u32 {
    value.max(0.0).trunc() as u32
}
