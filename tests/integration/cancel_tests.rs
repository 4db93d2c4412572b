use find_duplicates::confirm::FixedConfirmation;
use find_duplicates::duplicates::{DuplicateFinder, FinderConfig, FinderError, ScanStatus};
use find_duplicates::progress::ProgressCallback;
use find_duplicates::signal::ShutdownHandler;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

/// `classes` size classes, each holding one identical pair.
fn populate(dir: &Path, classes: usize) {
    for i in 0..classes {
        let content = vec![b'a'; i + 1];
        fs::write(dir.join(format!("{i:03}_a")), &content).unwrap();
        fs::write(dir.join(format!("{i:03}_b")), &content).unwrap();
    }
}

#[test]
fn test_declined_confirmation_returns_cancelled_report() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 5);

    let confirmation = Arc::new(FixedConfirmation::new(false));
    let finder = DuplicateFinder::new(FinderConfig::default().with_warn_threshold(Some(4)))
        .with_confirmation(confirmation.clone());
    let report = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(confirmation.times_asked(), 1);
    assert_eq!(report.status, ScanStatus::Cancelled);
    assert!(report.groups.is_empty());
    assert_eq!(report.total_duplicates, 0);
    assert_eq!(report.total_files, 10);
    assert_eq!(report.duplicate_size_classes, 5);
    assert_eq!(report.signature.input_files, 0);
    assert_eq!(report.verify.input_files, 0);
}

#[test]
fn test_accepted_confirmation_runs_to_completion() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 5);

    let confirmation = Arc::new(FixedConfirmation::new(true));
    let finder = DuplicateFinder::new(FinderConfig::default().with_warn_threshold(Some(4)))
        .with_confirmation(confirmation.clone());
    let report = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(confirmation.times_asked(), 1);
    assert_eq!(report.status, ScanStatus::Completed);
    assert_eq!(report.groups.len(), 5);
}

#[test]
fn test_disabled_threshold_never_asks() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 5);

    let confirmation = Arc::new(FixedConfirmation::new(false));
    let finder = DuplicateFinder::new(FinderConfig::default().with_warn_threshold(None))
        .with_confirmation(confirmation.clone());
    let report = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(confirmation.times_asked(), 0);
    assert_eq!(report.groups.len(), 5);
}

#[test]
fn test_shutdown_before_scan() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 2);

    let handler = ShutdownHandler::new();
    handler.request_shutdown();
    let finder = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(handler.get_flag()));

    let result = finder.find_duplicates(&[dir.path().to_path_buf()]);
    assert!(matches!(result, Err(FinderError::Interrupted)));
}

/// Sets the shutdown flag as soon as the first signature is computed.
struct StopAfterFirstItem {
    flag: Arc<AtomicBool>,
    phases: Mutex<Vec<String>>,
}

impl ProgressCallback for StopAfterFirstItem {
    fn on_phase_start(&self, phase: &str, _total: usize) {
        self.phases.lock().unwrap().push(phase.to_string());
    }

    fn on_progress(&self, _current: usize, _path: &str) {
        self.flag.store(true, Ordering::SeqCst);
    }

    fn on_phase_end(&self, _phase: &str) {}
}

#[test]
fn test_shutdown_between_size_classes() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 3);

    let flag = Arc::new(AtomicBool::new(false));
    let callback = Arc::new(StopAfterFirstItem {
        flag: Arc::clone(&flag),
        phases: Mutex::new(Vec::new()),
    });

    // Walking progress would trip the flag too early, so feed records directly.
    let records = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect::<Vec<_>>();
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_io_threads(1)
            .with_shutdown_flag(flag)
            .with_progress_callback(callback.clone()),
    );

    let result = finder.find_duplicates_from_paths(&records);
    assert!(matches!(result, Err(FinderError::Interrupted)));
    assert_eq!(*callback.phases.lock().unwrap(), vec!["signature"]);
}
