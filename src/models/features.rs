//! Per-role statistics derived from a single photograph.
//!
//! Every value here is a pure function of pixel content. Bundles are never
//! mutated after extraction; the estimator only reads them and the record
//! keeps them verbatim as diagnostics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Role;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FrontFeatures {
    /// Fraction of pixels marked by the edge detector, in [0, 1].
    pub edge_density: f64,
    pub brightness_std: f64,
    /// Variance of the Laplacian response.
    pub texture_var: f64,
    /// Needed by the weight formula, computed in the same pass.
    pub mean_brightness: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SideFeatures {
    pub thickness_indicator: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MacroFeatures {
    pub micro_roughness: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DrapeFeatures {
    /// Number of line segments found; used as a flexibility proxy.
    pub flexibility: u32,
    pub avg_brightness: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BackFeatures {
    pub uniformity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureBundle {
    Front(FrontFeatures),
    Side(SideFeatures),
    Macro(MacroFeatures),
    Drape(DrapeFeatures),
    Back(BackFeatures),
}

impl FeatureBundle {
    pub fn role(&self) -> Role {
        match self {
            FeatureBundle::Front(_) => Role::Front,
            FeatureBundle::Side(_) => Role::Side,
            FeatureBundle::Macro(_) => Role::Macro,
            FeatureBundle::Drape(_) => Role::Drape,
            FeatureBundle::Back(_) => Role::Back,
        }
    }
}

/// Bundles keyed by the role that produced them.
pub type FeatureSet = BTreeMap<Role, FeatureBundle>;

/// Diagnostic view of the bundles as persisted in the ledger.
///
/// Serialized as an object keyed by role name, with absent roles omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<FrontFeatures>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<SideFeatures>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#macro: Option<MacroDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drape: Option<DrapeFeatures>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<BackFeatures>,
}

/// Macro diagnostics also report the correction that was added to roughness.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MacroDetails {
    pub micro_roughness: f64,
    pub roughness_correction: f64,
}

impl AnalysisDetails {
    pub fn from_features(features: &FeatureSet, roughness_correction: impl Fn(f64) -> f64) -> Self {
        let mut details = AnalysisDetails::default();
        for bundle in features.values() {
            match *bundle {
                FeatureBundle::Front(front) => details.front = Some(front),
                FeatureBundle::Side(side) => details.side = Some(side),
                FeatureBundle::Macro(m) => {
                    details.r#macro = Some(MacroDetails {
                        micro_roughness: m.micro_roughness,
                        roughness_correction: roughness_correction(m.micro_roughness),
                    })
                }
                FeatureBundle::Drape(drape) => details.drape = Some(drape),
                FeatureBundle::Back(back) => details.back = Some(back),
            }
        }
        details
    }

    pub fn roles(&self) -> Vec<Role> {
        let mut roles = Vec::new();
        if self.front.is_some() {
            roles.push(Role::Front);
        }
        if self.side.is_some() {
            roles.push(Role::Side);
        }
        if self.r#macro.is_some() {
            roles.push(Role::Macro);
        }
        if self.drape.is_some() {
            roles.push(Role::Drape);
        }
        if self.back.is_some() {
            roles.push(Role::Back);
        }
        roles
    }
}
