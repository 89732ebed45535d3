//! Expert corrections attached to a prior analysis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;

pub const MAX_ACTUAL_THICKNESS_MM: f64 = 5.0;
pub const MAX_ACTUAL_WEIGHT_GSM: u32 = 500;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QualityGrade {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
}

impl QualityGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityGrade::A => "A",
            QualityGrade::BPlus => "B+",
            QualityGrade::B => "B",
            QualityGrade::CPlus => "C+",
            QualityGrade::C => "C",
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityGrade {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(QualityGrade::A),
            "B+" => Ok(QualityGrade::BPlus),
            "B" => Ok(QualityGrade::B),
            "C+" => Ok(QualityGrade::CPlus),
            "C" => Ok(QualityGrade::C),
            other => Err(format!("unknown quality grade '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SalesPerformance {
    Bestseller,
    Normal,
    Poor,
}

impl FromStr for SalesPerformance {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bestseller" => Ok(SalesPerformance::Bestseller),
            "normal" => Ok(SalesPerformance::Normal),
            "poor" => Ok(SalesPerformance::Poor),
            other => Err(format!("unknown sales performance '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    pub actual_thickness: Option<f64>,
    pub actual_weight: Option<u32>,
    pub actual_touch: u8,
    pub quality_grade: QualityGrade,
    pub recommended_use: String,
    pub sales_performance: Option<SalesPerformance>,
    pub additional_notes: String,
    pub feedback_timestamp: DateTime<Utc>,
}

/// Raw form input before validation.
#[derive(Debug, Clone)]
pub struct FeedbackInput {
    pub actual_thickness: f64,
    pub actual_weight: u32,
    pub actual_touch: u8,
    pub quality_grade: QualityGrade,
    pub recommended_use: String,
    pub sales_performance: Option<SalesPerformance>,
    pub additional_notes: String,
}

impl Feedback {
    /// Validates form input. Measured values of zero mean "not measured".
    pub fn from_input(input: FeedbackInput, now: DateTime<Utc>) -> Result<Self, AnalysisError> {
        if !(0.0..=MAX_ACTUAL_THICKNESS_MM).contains(&input.actual_thickness) {
            return Err(AnalysisError::InvalidFeedback(format!(
                "actual thickness {} mm outside 0..={MAX_ACTUAL_THICKNESS_MM}",
                input.actual_thickness
            )));
        }
        if input.actual_weight > MAX_ACTUAL_WEIGHT_GSM {
            return Err(AnalysisError::InvalidFeedback(format!(
                "actual weight {} g/m² exceeds {MAX_ACTUAL_WEIGHT_GSM}",
                input.actual_weight
            )));
        }
        if !(1..=10).contains(&input.actual_touch) {
            return Err(AnalysisError::InvalidFeedback(format!(
                "touch score {} outside 1..=10",
                input.actual_touch
            )));
        }

        Ok(Self {
            actual_thickness: (input.actual_thickness > 0.0).then_some(input.actual_thickness),
            actual_weight: (input.actual_weight > 0).then_some(input.actual_weight),
            actual_touch: input.actual_touch,
            quality_grade: input.quality_grade,
            recommended_use: input.recommended_use.trim().to_string(),
            sales_performance: input.sales_performance,
            additional_notes: input.additional_notes.trim().to_string(),
            feedback_timestamp: now,
        })
    }
}
