use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AnalysisError;
use crate::ledger::{Durability, LedgerStore};
use crate::models::{AnalysisRecord, Feedback};
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// How the feedback reached the ledger.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttachPath {
    /// The addressed record was found and updated in place.
    Matched,
    /// The record was missing, so the caller's cached copy was re-inserted.
    Reinserted,
    /// Missing record and no cached copy: nothing was written.
    Dropped,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AttachOutcome {
    pub attached: bool,
    pub persisted: bool,
    pub path: AttachPath,
}

impl AttachOutcome {
    fn from_durability(path: AttachPath, durability: Durability) -> Self {
        Self {
            attached: true,
            persisted: durability.is_shared(),
            path,
        }
    }
}

/// Attaches `feedback` to the record addressed by `(material_code, timestamp)`.
///
/// On a miss the `cached` copy of the record (held by the calling session) is
/// stamped with the feedback and inserted as a new record. This may leave the
/// ledger with both the original and a feedback-bearing copy.
pub fn attach(
    store: &dyn LedgerStore,
    material_code: &str,
    timestamp: &DateTime<Utc>,
    feedback: &Feedback,
    cached: Option<&AnalysisRecord>,
) -> Result<AttachOutcome, AnalysisError> {
    let updated = store.update_by_key(material_code, timestamp, &mut |record| {
        record.feedback = Some(feedback.clone());
    })?;

    if let Some(durability) = updated {
        log_info!(
            "Feedback attached to {material_code} @ {} ({durability:?})",
            timestamp.to_rfc3339()
        );
        return Ok(AttachOutcome::from_durability(AttachPath::Matched, durability));
    }

    let Some(cached) = cached else {
        log_warn!(
            "Feedback for {material_code} @ {} has no ledger match and no cached record",
            timestamp.to_rfc3339()
        );
        return Ok(AttachOutcome {
            attached: false,
            persisted: false,
            path: AttachPath::Dropped,
        });
    };

    log_warn!(
        "No ledger record for {material_code} @ {}; re-inserting cached copy with feedback",
        timestamp.to_rfc3339()
    );
    let mut copy = cached.clone();
    copy.feedback = Some(feedback.clone());
    let durability = store.insert(copy)?;

    Ok(AttachOutcome::from_durability(AttachPath::Reinserted, durability))
}
