use serde::{Deserialize, Serialize};

/// The six physical properties produced by one analysis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PropertyEstimate {
    /// Ends per inch.
    pub density: u32,
    /// Gloss units.
    pub gloss: u32,
    /// Micrometres, two decimals.
    pub roughness: f64,
    /// Grams per square metre.
    pub weight: u32,
    /// Millimetres, two decimals.
    pub thickness: f64,
    /// 0 to 10, one decimal.
    pub touch_score: f64,
}

impl PropertyEstimate {
    pub const BASELINE: PropertyEstimate = PropertyEstimate {
        density: 100,
        gloss: 40,
        roughness: 3.0,
        weight: 180,
        thickness: 0.45,
        touch_score: 7.5,
    };
}

impl Default for PropertyEstimate {
    fn default() -> Self {
        Self::BASELINE
    }
}
