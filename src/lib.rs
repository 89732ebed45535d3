//! Estimates handling properties of a fabric sample from role-tagged
//! photographs and keeps a shared, capped ledger of analyses with
//! operator feedback.

pub mod archive;
pub mod builder;
pub mod clock;
pub mod error;
pub mod estimation;
pub mod export;
pub mod feedback;
pub mod ledger;
pub mod models;
pub mod session;
pub mod settings;
pub mod utils;
pub mod vision;

pub use archive::ImageArchive;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AnalysisError, ExportError, LedgerError};
pub use estimation::{estimate, EstimationConfig};
pub use export::{export_csv, export_json, HistoryFilter};
pub use feedback::{AttachOutcome, AttachPath};
pub use ledger::{Durability, FileLedger, LedgerStore, MemoryLedger};
pub use models::{
    AnalysisRecord, Feedback, FeedbackInput, MaterialIdentity, PropertyEstimate, QualityGrade,
    Role, SalesPerformance,
};
pub use session::{AnalysisOutcome, AnalysisSession};
pub use settings::{Settings, SettingsStore};
pub use vision::{extract, extract_all, Photograph};

/// Info by default; `RUST_LOG` overrides.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}
