use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{AnalysisDetails, Feedback, PropertyEstimate, Role};

pub const ANALYSIS_METHOD: &str = "deterministic image statistics";

/// Who the sample is. Only `material_code` is mandatory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MaterialIdentity {
    pub material_code: String,
    pub material_name: String,
    pub supplier: String,
}

impl MaterialIdentity {
    pub fn new(
        material_code: impl Into<String>,
        material_name: impl Into<String>,
        supplier: impl Into<String>,
    ) -> Self {
        Self {
            material_code: material_code.into().trim().to_string(),
            material_name: material_name.into().trim().to_string(),
            supplier: supplier.into().trim().to_string(),
        }
    }
}

/// One completed analysis as stored in the ledger.
///
/// `(material_code, timestamp)` addresses the record; nothing but the
/// feedback slot changes after construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRecord {
    pub timestamp: DateTime<Utc>,
    pub material_code: String,
    pub material_name: String,
    pub supplier: String,
    pub uploaded_images: Vec<Role>,
    #[serde(default)]
    pub saved_image_paths: BTreeMap<Role, String>,
    #[serde(default)]
    pub image_fingerprints: BTreeMap<Role, String>,
    pub analysis: PropertyEstimate,
    pub analysis_details: AnalysisDetails,
    #[serde(default = "default_method")]
    pub analysis_method: String,
    pub feedback: Option<Feedback>,
}

fn default_method() -> String {
    ANALYSIS_METHOD.to_string()
}

impl AnalysisRecord {
    pub fn matches_key(&self, material_code: &str, timestamp: &DateTime<Utc>) -> bool {
        self.material_code == material_code && &self.timestamp == timestamp
    }

    pub fn has_feedback(&self) -> bool {
        self.feedback.is_some()
    }

    pub fn with_saved_images(mut self, paths: BTreeMap<Role, String>) -> Self {
        self.saved_image_paths = paths;
        self
    }

    pub fn with_fingerprints(mut self, fingerprints: BTreeMap<Role, String>) -> Self {
        self.image_fingerprints = fingerprints;
        self
    }
}
