//! fabric-lens command line: analyse a sample, attach feedback, review and
//! export the shared ledger.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};

use fabric_lens::{
    export_csv, export_json, AnalysisRecord, AnalysisSession, FeedbackInput, FileLedger,
    HistoryFilter, ImageArchive, LedgerStore, MaterialIdentity, Photograph, QualityGrade, Role,
    SalesPerformance, Settings, SettingsStore,
};

#[derive(Parser, Debug)]
#[command(name = "fabric-lens")]
#[command(about = "Estimate fabric properties from photographs")]
#[command(version)]
struct Cli {
    /// Settings file (JSON)
    #[arg(long, default_value = "fabric_lens.json")]
    config: PathBuf,

    /// Overrides the configured data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse photographs of one sample and record the result
    Analyze {
        #[arg(long)]
        code: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        supplier: String,
        #[arg(long)]
        front: Option<PathBuf>,
        #[arg(long)]
        side: Option<PathBuf>,
        #[arg(long = "macro")]
        macro_shot: Option<PathBuf>,
        #[arg(long)]
        drape: Option<PathBuf>,
        #[arg(long)]
        back: Option<PathBuf>,
    },
    /// Attach operator feedback to the last analysis (or to an explicit record)
    Feedback {
        #[arg(long, requires = "timestamp")]
        code: Option<String>,
        /// RFC 3339 timestamp of the record
        #[arg(long, requires = "code")]
        timestamp: Option<DateTime<Utc>>,
        /// Measured thickness in mm; 0 = not measured
        #[arg(long, default_value_t = 0.0)]
        thickness: f64,
        /// Measured weight in g/m²; 0 = not measured
        #[arg(long, default_value_t = 0)]
        weight: u32,
        #[arg(long)]
        touch: u8,
        #[arg(long)]
        grade: QualityGrade,
        #[arg(long, default_value = "")]
        recommended_use: String,
        #[arg(long)]
        sales: Option<SalesPerformance>,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List ledger records, newest first
    History {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        with_feedback: bool,
    },
    /// Dump the ledger
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

fn main() -> Result<()> {
    fabric_lens::init_logging();
    let cli = Cli::parse();

    let mut settings = SettingsStore::new(cli.config.clone())
        .context("Failed to load settings")?
        .settings();
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }
    info!("Data directory: {}", settings.data_dir.display());

    let store: Arc<dyn LedgerStore> = Arc::new(FileLedger::new(
        settings.ledger_path(),
        settings.ledger_capacity,
    ));
    let archive = if settings.archive_images {
        ImageArchive::new(settings.images_dir())
    } else {
        ImageArchive::disabled()
    };
    let mut session = AnalysisSession::new(store.clone(), archive);

    match cli.command {
        Command::Analyze {
            code,
            name,
            supplier,
            front,
            side,
            macro_shot,
            drape,
            back,
        } => {
            let inputs = [
                (Role::Front, front),
                (Role::Side, side),
                (Role::Macro, macro_shot),
                (Role::Drape, drape),
                (Role::Back, back),
            ];
            let mut photos = Vec::new();
            for (role, path) in inputs {
                if let Some(path) = path {
                    photos.push(load_photo(role, &path)?);
                }
            }

            let outcome = session.analyze(MaterialIdentity::new(code, name, supplier), photos)?;
            if !outcome.durability.is_shared() {
                warn!("Result was not written to the shared ledger");
            }
            remember_current(&settings, &outcome.record);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Feedback {
            code,
            timestamp,
            thickness,
            weight,
            touch,
            grade,
            recommended_use,
            sales,
            notes,
        } => {
            let cached = load_current(&settings)?;
            let target = match (code, timestamp) {
                (Some(code), Some(ts)) => match cached {
                    Some(record) if record.matches_key(&code, &ts) => record,
                    _ => store
                        .all()
                        .into_iter()
                        .find(|r| r.matches_key(&code, &ts))
                        .with_context(|| format!("No analysis of {code} at {}", ts.to_rfc3339()))?,
                },
                _ => match cached {
                    Some(record) => record,
                    None => bail!("No current analysis; run `analyze` or pass --code/--timestamp"),
                },
            };
            session.set_current(target);

            let outcome = session.submit_feedback(FeedbackInput {
                actual_thickness: thickness,
                actual_weight: weight,
                actual_touch: touch,
                quality_grade: grade,
                recommended_use,
                sales_performance: sales,
                additional_notes: notes,
            })?;
            if let Some(current) = session.current() {
                remember_current(&settings, current);
            }
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::History {
            search,
            with_feedback,
        } => {
            let filter = HistoryFilter {
                search,
                feedback_only: with_feedback,
            };
            for record in session.history(&filter) {
                println!(
                    "{}  {:<12} {:<24} density {:>3}  touch {:>4}  {}",
                    record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    record.material_code,
                    record.material_name,
                    record.analysis.density,
                    record.analysis.touch_score,
                    if record.has_feedback() { "reviewed" } else { "-" }
                );
            }
        }
        Command::Export { format, output } => {
            let records = store.all();
            let body = match format {
                ExportFormat::Json => export_json(&records)?,
                ExportFormat::Csv => export_csv(&records)?,
            };
            match output {
                Some(path) => {
                    fs::write(&path, body)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Exported {} records to {}", records.len(), path.display());
                }
                None => println!("{body}"),
            }
        }
    }

    Ok(())
}

fn load_photo(role: Role, path: &Path) -> Result<Photograph> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read {} photo {}", role, path.display()))?;
    Ok(Photograph::decode(role, &bytes)?)
}

fn load_current(settings: &Settings) -> Result<Option<AnalysisRecord>> {
    let path = settings.session_cache_path();
    if !path.exists() {
        return Ok(None);
    }
    let contents =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    match serde_json::from_str(&contents) {
        Ok(record) => Ok(Some(record)),
        Err(err) => {
            warn!("Ignoring unreadable session cache {}: {err}", path.display());
            Ok(None)
        }
    }
}

/// Saves the session cache, logging instead of failing. Returns whether it was written.
fn remember_current(settings: &Settings, record: &AnalysisRecord) -> bool {
    match save_current(settings, record) {
        Ok(()) => true,
        Err(err) => {
            warn!("Could not update session cache: {err:#}");
            false
        }
    }
}

fn save_current(settings: &Settings, record: &AnalysisRecord) -> Result<()> {
    let path = settings.session_cache_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, serde_json::to_string_pretty(record)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}
