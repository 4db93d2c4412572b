use find_duplicates::duplicates::{DuplicateFinder, ScanStatus};
use find_duplicates::scanner::{FileRecord, HashError, ScanError};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_from_records_continues_on_error() {
    let finder = DuplicateFinder::with_defaults();
    // Same size, so both reach the signature stage and fail there.
    let records = vec![
        FileRecord::new("nonexistent_1.txt", 100),
        FileRecord::new("nonexistent_2.txt", 100),
    ];

    let report = finder.find_duplicates_from_records(records).unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.status, ScanStatus::Completed);
    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.signature.failed, 2);
    for err in &report.errors {
        match err {
            ScanError::HashError(HashError::NotFound(_)) => {}
            _ => panic!("Expected NotFound HashError, got: {err:?}"),
        }
    }
}

#[test]
fn test_unreadable_member_dropped_rest_grouped() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    let c = dir.path().join("c");
    for path in [&a, &b, &c] {
        fs::write(path, b"same bytes").unwrap();
    }
    let gone = dir.path().join("gone");

    let records = vec![
        FileRecord::new(&a, 10),
        FileRecord::new(&gone, 10),
        FileRecord::new(&b, 10),
        FileRecord::new(&c, 10),
    ];
    let report = DuplicateFinder::with_defaults()
        .find_duplicates_from_records(records)
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].files.len(), 3);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.total_files, 4);
}

#[test]
fn test_from_paths_records_stat_failures() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, b"twin").unwrap();
    fs::write(&b, b"twin").unwrap();

    let paths = vec![
        a,
        PathBuf::from("/definitely/not/here"),
        dir.path().to_path_buf(),
        b,
    ];
    let report = DuplicateFinder::with_defaults()
        .find_duplicates_from_paths(&paths)
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.total_files, 2);
    assert!(report
        .errors
        .iter()
        .any(|e| matches!(e, ScanError::NotFound(_))));
    assert!(report
        .errors
        .iter()
        .any(|e| matches!(e, ScanError::NotAFile(_))));
}

#[cfg(unix)]
#[test]
fn test_permission_denied_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::write(dir.path().join("open1"), b"payload").unwrap();
    fs::write(dir.path().join("open2"), b"payload").unwrap();
    fs::write(&locked, b"payload").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root can read anything; nothing to test then.
    if fs::read(&locked).is_ok() {
        return;
    }

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].files.len(), 2);
    assert_eq!(report.errors.len(), 1);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}
