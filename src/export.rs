//! Projections of the ledger for review and download.

use serde::{Serialize, Serializer};
use crate::error::ExportError;
use crate::models::AnalysisRecord;

#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Case-insensitive substring over code, name and supplier.
    pub search: Option<String>,
    pub feedback_only: bool,
}

impl HistoryFilter {
    pub fn matches(&self, record: &AnalysisRecord) -> bool {
        if self.feedback_only && !record.has_feedback() {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let query = query.to_lowercase();
                [&record.material_code, &record.material_name, &record.supplier]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&query))
            }
        }
    }
}

pub fn filter_history(records: Vec<AnalysisRecord>, filter: &HistoryFilter) -> Vec<AnalysisRecord> {
    records.into_iter().filter(|r| filter.matches(r)).collect()
}

/// Full dump, newest first.
pub fn export_json(records: &[AnalysisRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

pub const CSV_HEADER: &str = "material_code,material_name,supplier,timestamp,density,gloss,roughness,weight,thickness,touch_score,quality_grade,has_feedback";

/// One flattened CSV row per record. Field order is the column order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryRow {
    pub material_code: String,
    pub material_name: String,
    pub supplier: String,
    pub timestamp: String,
    pub density: u32,
    pub gloss: u32,
    pub roughness: f64,
    pub weight: u32,
    pub thickness: f64,
    pub touch_score: f64,
    pub quality_grade: String,
    #[serde(serialize_with = "yes_no")]
    pub has_feedback: bool,
}

impl From<&AnalysisRecord> for SummaryRow {
    fn from(record: &AnalysisRecord) -> Self {
        Self {
            material_code: record.material_code.clone(),
            material_name: record.material_name.clone(),
            supplier: record.supplier.clone(),
            timestamp: record.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            density: record.analysis.density,
            gloss: record.analysis.gloss,
            roughness: record.analysis.roughness,
            weight: record.analysis.weight,
            thickness: record.analysis.thickness,
            touch_score: record.analysis.touch_score,
            quality_grade: record
                .feedback
                .as_ref()
                .map(|f| f.quality_grade.to_string())
                .unwrap_or_default(),
            has_feedback: record.has_feedback(),
        }
    }
}

fn yes_no<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "yes" } else { "no" })
}

/// Header plus one row per record, in ledger order.
pub fn export_csv(records: &[AnalysisRecord]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER.split(','))?;
    for record in records {
        writer.serialize(SummaryRow::from(record))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
