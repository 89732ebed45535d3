use super::canny::CannyThresholds;
use super::hough::HoughParams;

/// Fixed parameters of the per-role extractors.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Edge map for front-photo weave density.
    pub front_canny: CannyThresholds,

    /// Edge map feeding the drape line detector.
    pub drape_canny: CannyThresholds,
    pub drape_hough: HoughParams,

    /// Intensity jump along the side scanline that counts as a transition.
    pub side_jump_threshold: f64,

    /// Sliding window edge length for macro local statistics.
    pub macro_window: usize,

    /// Back uniformity is `100 - min(std, cap)`.
    pub back_std_cap: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            front_canny: CannyThresholds {
                low: 50.0,
                high: 150.0,
            },
            drape_canny: CannyThresholds {
                low: 30.0,
                high: 100.0,
            },
            drape_hough: HoughParams::default(),
            side_jump_threshold: 20.0,
            macro_window: 5,
            back_std_cap: 50.0,
        }
    }
}
