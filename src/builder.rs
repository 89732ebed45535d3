use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::AnalysisError;
use crate::estimation::{roughness_correction, EstimationConfig};
use crate::models::{
    AnalysisDetails, AnalysisRecord, FeatureSet, MaterialIdentity, PropertyEstimate, Role,
    ANALYSIS_METHOD,
};

/// Assembles a record from a finished analysis. `now` comes from the caller's clock.
pub fn build(
    identity: &MaterialIdentity,
    roles_supplied: &[Role],
    estimate: PropertyEstimate,
    features: &FeatureSet,
    now: DateTime<Utc>,
) -> Result<AnalysisRecord, AnalysisError> {
    if identity.material_code.trim().is_empty() {
        return Err(AnalysisError::MissingMaterialCode);
    }
    if roles_supplied.is_empty() {
        return Err(AnalysisError::NoPhotographs);
    }

    let mut roles = roles_supplied.to_vec();
    roles.sort();
    roles.dedup();

    let config = EstimationConfig::default();
    let details =
        AnalysisDetails::from_features(features, |micro| roughness_correction(micro, &config));

    Ok(AnalysisRecord {
        timestamp: now,
        material_code: identity.material_code.trim().to_string(),
        material_name: identity.material_name.clone(),
        supplier: identity.supplier.clone(),
        uploaded_images: roles,
        saved_image_paths: BTreeMap::new(),
        image_fingerprints: BTreeMap::new(),
        analysis: estimate,
        analysis_details: details,
        analysis_method: ANALYSIS_METHOD.to_string(),
        feedback: None,
    })
}
