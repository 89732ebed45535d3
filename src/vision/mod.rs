mod canny;
mod config;
mod extract;
mod filters;
mod fingerprint;
mod hough;
mod photograph;

pub use canny::{canny, CannyThresholds, EdgeMap};
pub use config::ExtractionConfig;
pub use extract::{extract, extract_all, extract_with};
pub use fingerprint::{fingerprint, fingerprint_distance};
pub use hough::{detect_segments, HoughParams, LineSegment};
pub use photograph::{to_gray, Photograph};
