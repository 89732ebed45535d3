mod estimate;
mod features;
mod feedback;
mod record;
mod role;

pub use estimate::PropertyEstimate;
pub use features::{
    AnalysisDetails, BackFeatures, DrapeFeatures, FeatureBundle, FeatureSet, FrontFeatures,
    MacroDetails, MacroFeatures, SideFeatures,
};
pub use feedback::{
    Feedback, FeedbackInput, QualityGrade, SalesPerformance, MAX_ACTUAL_THICKNESS_MM,
    MAX_ACTUAL_WEIGHT_GSM,
};
pub use record::{AnalysisRecord, MaterialIdentity, ANALYSIS_METHOD};
pub use role::Role;
