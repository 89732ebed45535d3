use crate::models::PropertyEstimate;

/// Coefficients and guardrails of the property mapping.
///
/// The defaults are the published contract: downstream consumers rely on the
/// caps and floors to keep estimates in their plausible ranges.
#[derive(Debug, Clone)]
pub struct EstimationConfig {
    /// Values used for any property no supplied role informs.
    pub baseline: PropertyEstimate,

    /// density = base + min(edge_density × gain, cap)
    pub density_base: f64,
    pub density_edge_gain: f64,
    pub density_edge_cap: f64,

    /// gloss = base + min(brightness_std × gain, cap)
    pub gloss_base: f64,
    pub gloss_std_gain: f64,
    pub gloss_std_cap: f64,

    /// roughness = base + min(texture_var × gain, cap)
    pub roughness_base: f64,
    pub roughness_texture_gain: f64,
    pub roughness_texture_cap: f64,

    /// weight = base + (density − density_base) × density_gain + (255 − mean) × darkness_gain
    pub weight_base: f64,
    pub weight_density_gain: f64,
    pub weight_darkness_gain: f64,

    /// thickness = base + min(indicator × gain, cap)
    pub thickness_base: f64,
    pub thickness_indicator_gain: f64,
    pub thickness_indicator_cap: f64,

    /// Macro adds micro_roughness × gain, then roughness is capped.
    pub macro_roughness_gain: f64,
    pub roughness_max: f64,

    /// touch = base + min(flexibility × gain, cap) + brightness / divisor, capped
    pub touch_base: f64,
    pub touch_flex_gain: f64,
    pub touch_flex_cap: f64,
    pub touch_brightness_divisor: f64,
    pub touch_max: f64,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            baseline: PropertyEstimate::BASELINE,
            density_base: 85.0,
            density_edge_gain: 300.0,
            density_edge_cap: 30.0,
            gloss_base: 20.0,
            gloss_std_gain: 0.8,
            gloss_std_cap: 40.0,
            roughness_base: 1.5,
            roughness_texture_gain: 0.0008,
            roughness_texture_cap: 3.0,
            weight_base: 140.0,
            weight_density_gain: 2.0,
            weight_darkness_gain: 0.2,
            thickness_base: 0.3,
            thickness_indicator_gain: 3.0,
            thickness_indicator_cap: 0.3,
            macro_roughness_gain: 0.05,
            roughness_max: 4.5,
            touch_base: 6.5,
            touch_flex_gain: 0.01,
            touch_flex_cap: 2.0,
            touch_brightness_divisor: 100.0,
            touch_max: 9.5,
        }
    }
}
