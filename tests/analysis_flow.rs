//! End-to-end flows over a real ledger file.

use std::{fs, path::Path, sync::Arc};

use chrono::{Duration, TimeZone, Utc};
use fabric_lens::{
    export_csv, AnalysisSession, AttachPath, Durability, FeedbackInput, FileLedger, FixedClock,
    HistoryFilter, ImageArchive, LedgerStore, MaterialIdentity, Photograph, PropertyEstimate,
    QualityGrade, Role, SalesPerformance,
};
use image::{Rgb, RgbImage};
use tempfile::TempDir;

fn flat(role: Role, value: u8) -> Photograph {
    Photograph::new(role, RgbImage::from_pixel(48, 48, Rgb([value; 3]))).unwrap()
}

fn all_roles() -> Vec<Photograph> {
    vec![
        flat(Role::Front, 5),
        flat(Role::Side, 40),
        flat(Role::Macro, 60),
        flat(Role::Drape, 100),
        flat(Role::Back, 200),
    ]
}

fn session_at(store: Arc<FileLedger>, archive: ImageArchive, offset_secs: i64) -> AnalysisSession {
    let at = Utc.with_ymd_and_hms(2025, 12, 10, 9, 0, 0).unwrap() + Duration::seconds(offset_secs);
    AnalysisSession::with_clock(store, archive, Box::new(FixedClock(at)))
}

fn form() -> FeedbackInput {
    FeedbackInput {
        actual_thickness: 0.55,
        actual_weight: 0,
        actual_touch: 8,
        quality_grade: QualityGrade::A,
        recommended_use: " t-shirt ".into(),
        sales_performance: Some(SalesPerformance::Bestseller),
        additional_notes: String::new(),
    }
}

fn ledger_path(dir: &Path) -> std::path::PathBuf {
    dir.join("analysis_data").join("analysis_history.json")
}

#[test]
fn flat_photographs_give_floor_values() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileLedger::new(ledger_path(dir.path()), 100));
    let mut session = session_at(store, ImageArchive::disabled(), 0);

    let outcome = session
        .analyze(MaterialIdentity::new("ST-001", "Jersey", "Mill"), all_roles())
        .unwrap();

    assert_eq!(outcome.durability, Durability::Shared);
    assert_eq!(
        outcome.record.analysis,
        PropertyEstimate {
            density: 85,
            gloss: 20,
            roughness: 1.5,
            weight: 190,
            thickness: 0.3,
            touch_score: 7.5,
        }
    );
    assert_eq!(outcome.record.uploaded_images, Role::ALL.to_vec());
    assert_eq!(outcome.record.image_fingerprints.len(), 5);
}

#[test]
fn analyze_then_feedback_persists_both() {
    let dir = TempDir::new().unwrap();
    let path = ledger_path(dir.path());
    let store = Arc::new(FileLedger::new(path.clone(), 100));
    let mut session = session_at(store, ImageArchive::new(dir.path().join("images")), 0);

    let outcome = session
        .analyze(MaterialIdentity::new("ST-002", "", ""), vec![flat(Role::Front, 90)])
        .unwrap();
    for stored in outcome.record.saved_image_paths.values() {
        assert!(Path::new(stored).exists(), "{stored}");
    }

    let attached = session.submit_feedback(form()).unwrap();
    assert!(attached.attached);
    assert!(attached.persisted);
    assert_eq!(attached.path, AttachPath::Matched);

    let reopened = FileLedger::new(path, 100);
    let records = reopened.all();
    assert_eq!(records.len(), 1);
    let feedback = records[0].feedback.as_ref().unwrap();
    assert_eq!(feedback.actual_thickness, Some(0.55));
    assert_eq!(feedback.actual_weight, None);
    assert_eq!(feedback.recommended_use, "t-shirt");
}

#[test]
fn sessions_share_one_ledger() {
    let dir = TempDir::new().unwrap();
    let path = ledger_path(dir.path());
    let mut first = session_at(
        Arc::new(FileLedger::new(path.clone(), 100)),
        ImageArchive::disabled(),
        0,
    );
    let mut second = session_at(
        Arc::new(FileLedger::new(path.clone(), 100)),
        ImageArchive::disabled(),
        1,
    );

    first
        .analyze(MaterialIdentity::new("A-1", "", ""), vec![flat(Role::Back, 1)])
        .unwrap();
    second
        .analyze(MaterialIdentity::new("B-1", "", ""), vec![flat(Role::Back, 2)])
        .unwrap();
    first.submit_feedback(form()).unwrap();

    let records = FileLedger::new(path, 100).all();
    let codes: Vec<&str> = records.iter().map(|r| r.material_code.as_str()).collect();
    assert_eq!(codes, vec!["B-1", "A-1"]);
    assert!(records[1].has_feedback());
    assert!(!records[0].has_feedback());

    let reviewed = second.history(&HistoryFilter {
        search: None,
        feedback_only: true,
    });
    assert_eq!(reviewed.len(), 1);
    assert_eq!(reviewed[0].material_code, "A-1");
}

#[test]
fn eviction_before_feedback_reinserts_with_feedback() {
    let dir = TempDir::new().unwrap();
    let path = ledger_path(dir.path());
    let capacity = 3;

    let mut early = session_at(
        Arc::new(FileLedger::new(path.clone(), capacity)),
        ImageArchive::disabled(),
        0,
    );
    early
        .analyze(MaterialIdentity::new("OLD", "", ""), vec![flat(Role::Side, 9)])
        .unwrap();

    let busy = Arc::new(FileLedger::new(path.clone(), capacity));
    for i in 0..capacity as i64 {
        let mut other = session_at(busy.clone(), ImageArchive::disabled(), 10 + i);
        other
            .analyze(MaterialIdentity::new(format!("N-{i}"), "", ""), vec![flat(Role::Back, 3)])
            .unwrap();
    }
    assert!(busy.all().iter().all(|r| r.material_code != "OLD"));

    let outcome = early.submit_feedback(form()).unwrap();
    assert_eq!(outcome.path, AttachPath::Reinserted);
    assert!(outcome.persisted);

    let records = FileLedger::new(path, capacity).all();
    assert_eq!(records.len(), capacity);
    assert_eq!(records[0].material_code, "OLD");
    assert!(records[0].has_feedback());
}

#[test]
fn ledger_never_exceeds_capacity() {
    let dir = TempDir::new().unwrap();
    let path = ledger_path(dir.path());
    let store = Arc::new(FileLedger::new(path.clone(), 100));

    for i in 0..101 {
        let mut session = session_at(store.clone(), ImageArchive::disabled(), i);
        session
            .analyze(MaterialIdentity::new(format!("C-{i}"), "", ""), vec![flat(Role::Back, 7)])
            .unwrap();
    }

    let records = FileLedger::new(path, 100).all();
    assert_eq!(records.len(), 100);
    assert_eq!(records[0].material_code, "C-100");
    assert_eq!(records[99].material_code, "C-1");
}

#[test]
fn unwritable_ledger_degrades_to_session() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();
    let store = Arc::new(FileLedger::new(blocker.join("ledger.json"), 100));
    let mut session = session_at(store.clone(), ImageArchive::disabled(), 0);

    let outcome = session
        .analyze(MaterialIdentity::new("LOCAL", "", ""), vec![flat(Role::Front, 50)])
        .unwrap();
    assert_eq!(outcome.durability, Durability::SessionOnly);

    let attached = session.submit_feedback(form()).unwrap();
    assert!(attached.attached);
    assert!(!attached.persisted);
    assert!(store.all()[0].has_feedback());
}

#[test]
fn read_only_ledger_keeps_session_results_addressable() {
    let dir = TempDir::new().unwrap();
    // Readable, but the sibling temp file name exceeds the filesystem limit.
    let path = dir.path().join(format!("{}.json", "h".repeat(225)));
    fs::write(&path, "[]").unwrap();
    let store = Arc::new(FileLedger::new(path.clone(), 100));
    let mut session = session_at(store.clone(), ImageArchive::disabled(), 0);

    let outcome = session
        .analyze(MaterialIdentity::new("RO-1", "", ""), vec![flat(Role::Side, 30)])
        .unwrap();
    assert_eq!(outcome.durability, Durability::SessionOnly);
    assert_eq!(session.history(&HistoryFilter::default()).len(), 1);

    for _ in 0..2 {
        let attached = session.submit_feedback(form()).unwrap();
        assert_eq!(attached.path, AttachPath::Matched);
        assert!(!attached.persisted);
    }

    let records = store.all();
    assert_eq!(records.len(), 1);
    assert!(records[0].has_feedback());
    assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
}

#[test]
fn csv_export_lists_every_record() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileLedger::new(ledger_path(dir.path()), 100));
    for i in 0..3 {
        let mut session = session_at(store.clone(), ImageArchive::disabled(), i);
        session
            .analyze(MaterialIdentity::new(format!("X-{i}"), "", ""), vec![flat(Role::Back, 1)])
            .unwrap();
    }

    let csv = export_csv(&store.all()).unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.lines().nth(1).unwrap().starts_with("X-2,"));
}
