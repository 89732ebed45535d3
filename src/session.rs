//! One operator's working session: analyse a sample, then attach feedback
//! to that analysis.

use std::{collections::BTreeMap, sync::Arc, time::Instant};

use serde::Serialize;

use crate::archive::ImageArchive;
use crate::builder;
use crate::clock::{Clock, SystemClock};
use crate::error::AnalysisError;
use crate::estimation::estimate;
use crate::export::{filter_history, HistoryFilter};
use crate::feedback::{attach, AttachOutcome};
use crate::ledger::{Durability, LedgerStore};
use crate::models::{AnalysisRecord, Feedback, FeedbackInput, MaterialIdentity, Role};
use crate::vision::{extract_all, fingerprint, fingerprint_distance, Photograph};
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// Two roles whose fingerprints are this close were probably shot from the
/// same picture.
const DUPLICATE_FINGERPRINT_DISTANCE: u32 = 2;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub record: AnalysisRecord,
    pub durability: Durability,
}

pub struct AnalysisSession {
    store: Arc<dyn LedgerStore>,
    clock: Box<dyn Clock>,
    archive: ImageArchive,
    current: Option<AnalysisRecord>,
}

impl AnalysisSession {
    pub fn new(store: Arc<dyn LedgerStore>, archive: ImageArchive) -> Self {
        Self::with_clock(store, archive, Box::new(SystemClock::new()))
    }

    pub fn with_clock(
        store: Arc<dyn LedgerStore>,
        archive: ImageArchive,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            store,
            clock,
            archive,
            current: None,
        }
    }

    /// Runs a full analysis and records it. A storage failure downgrades the
    /// outcome to session-only durability; only invalid input is an error.
    pub fn analyze(
        &mut self,
        identity: MaterialIdentity,
        photos: Vec<Photograph>,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        if identity.material_code.trim().is_empty() {
            return Err(AnalysisError::MissingMaterialCode);
        }
        if photos.is_empty() {
            return Err(AnalysisError::NoPhotographs);
        }

        let started = Instant::now();
        let roles: Vec<Role> = photos.iter().map(Photograph::role).collect();
        log_info!(
            "Analysing {} with roles {:?}",
            identity.material_code,
            roles
        );
        if !roles.iter().any(Role::is_primary) {
            log_warn!(
                "{} has no front or side photograph; primary estimates stay at baseline",
                identity.material_code
            );
        }

        let features = extract_all(&photos);
        let estimate = estimate(&features);
        let now = self.clock.now();

        let fingerprints: BTreeMap<Role, String> = photos
            .iter()
            .map(|photo| (photo.role(), fingerprint(photo)))
            .collect();
        warn_on_duplicates(&fingerprints);

        let record = builder::build(&identity, &roles, estimate, &features, now)?
            .with_saved_images(self.archive.save_all(&identity.material_code, &photos, now))
            .with_fingerprints(fingerprints);

        let durability = self.store.insert(record.clone())?;
        if !durability.is_shared() {
            log_warn!(
                "Analysis of {} kept for this session only",
                record.material_code
            );
        }

        log_info!(
            "Analysis of {} finished in {}ms (density {}, touch {})",
            record.material_code,
            started.elapsed().as_millis(),
            record.analysis.density,
            record.analysis.touch_score
        );

        self.current = Some(record.clone());
        Ok(AnalysisOutcome { record, durability })
    }

    /// Validates the form and attaches it to the current analysis.
    pub fn submit_feedback(&mut self, input: FeedbackInput) -> Result<AttachOutcome, AnalysisError> {
        let feedback = Feedback::from_input(input, self.clock.now())?;
        self.attach_feedback(feedback)
    }

    pub fn attach_feedback(&mut self, feedback: Feedback) -> Result<AttachOutcome, AnalysisError> {
        let current = self
            .current
            .as_mut()
            .ok_or(AnalysisError::NoCurrentAnalysis)?;

        let outcome = attach(
            self.store.as_ref(),
            &current.material_code,
            &current.timestamp,
            &feedback,
            Some(&*current),
        )?;
        current.feedback = Some(feedback);
        Ok(outcome)
    }

    pub fn current(&self) -> Option<&AnalysisRecord> {
        self.current.as_ref()
    }

    /// Restores the current analysis, e.g. from a cache kept between
    /// process invocations.
    pub fn set_current(&mut self, record: AnalysisRecord) {
        self.current = Some(record);
    }

    pub fn history(&self, filter: &HistoryFilter) -> Vec<AnalysisRecord> {
        filter_history(self.store.all(), filter)
    }
}

fn warn_on_duplicates(fingerprints: &BTreeMap<Role, String>) {
    let entries: Vec<(&Role, &String)> = fingerprints.iter().collect();
    for (i, (role_a, hash_a)) in entries.iter().enumerate() {
        for (role_b, hash_b) in &entries[i + 1..] {
            if fingerprint_distance(hash_a, hash_b) <= DUPLICATE_FINGERPRINT_DISTANCE {
                log_warn!("{role_a} and {role_b} photographs look identical");
            }
        }
    }
}
