use find_duplicates::duplicates::{
    DuplicateFinder, FinderConfig, ScanStatus, SignatureMode, VerifyStrategy,
};
use find_duplicates::scanner::WalkerConfig;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &[u8]) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

fn roots(dir: &Path) -> Vec<PathBuf> {
    vec![dir.to_path_buf()]
}

fn names(paths: Vec<&str>) -> Vec<String> {
    paths
        .into_iter()
        .map(|p| p.rsplit('/').next().unwrap().to_string())
        .collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&roots(dir.path()))
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.total_files, 0);
    assert_eq!(report.total_duplicates, 0);
    assert_eq!(report.status, ScanStatus::Completed);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"content a");
    write(dir.path(), "b.txt", b"content b");
    write(dir.path(), "c.txt", b"content c");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&roots(dir.path()))
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.total_files, 3);
    // Same size, so all three were signed; none survived.
    assert_eq!(report.signature.input_files, 3);
    assert_eq!(report.signature.candidates, 0);
}

#[test]
fn test_scan_duplicate_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"duplicate");
    write(dir.path(), "b.txt", b"duplicate");
    write(dir.path(), "c.txt", b"unique");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&roots(dir.path()))
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(names(report.groups[0].paths()), vec!["a.txt", "b.txt"]);
    assert_eq!(report.total_files, 3);
    assert_eq!(report.total_duplicates, 2);
    assert_eq!(report.wasted_space(), 9);
}

#[test]
fn test_scan_nested_directories_needs_recursive() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"dup");
    write(dir.path(), "subdir/b.txt", b"dup");

    let flat = DuplicateFinder::with_defaults()
        .find_duplicates(&roots(dir.path()))
        .unwrap();
    assert!(flat.groups.is_empty());
    assert_eq!(flat.total_files, 1);

    let finder = DuplicateFinder::new(FinderConfig::default().with_recursive(true));
    let deep = finder.find_duplicates(&roots(dir.path())).unwrap();
    assert_eq!(deep.groups.len(), 1);
    assert_eq!(deep.groups[0].files.len(), 2);
    assert_eq!(deep.total_files, 2);
}

#[test]
fn test_scan_multiple_groups() {
    let dir = tempdir().unwrap();
    write(dir.path(), "1a.txt", b"group1");
    write(dir.path(), "1b.txt", b"group1");
    write(dir.path(), "1c.txt", b"group1");
    write(dir.path(), "2a.txt", b"group2");
    write(dir.path(), "2b.txt", b"group2");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&roots(dir.path()))
        .unwrap();

    // Same size, different checksums: two groups from one size class.
    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.duplicate_size_classes, 1);
    assert_eq!(report.total_duplicates, 5);
    assert_eq!(
        names(report.groups[0].paths()),
        vec!["1a.txt", "1b.txt", "1c.txt"]
    );
    assert_eq!(names(report.groups[1].paths()), vec!["2a.txt", "2b.txt"]);
}

#[test]
fn test_scan_size_filtering() {
    let dir = tempdir().unwrap();
    write(dir.path(), "10a.txt", b"0123456789");
    write(dir.path(), "10b.txt", b"0123456789");
    write(dir.path(), "20a.txt", b"01234567890123456789");
    write(dir.path(), "20b.txt", b"01234567890123456789");

    let walker_config = WalkerConfig {
        min_size: Some(15),
        ..WalkerConfig::default()
    };
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let report = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert_eq!(report.total_files, 2);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].size, 20);
}

#[test]
fn test_scan_multiple_ignore_patterns() {
    let dir = tempdir().unwrap();
    write(dir.path(), "test.tmp", b"dup");
    write(dir.path(), "test.log", b"dup");
    write(dir.path(), "keep.txt", b"dup");
    write(dir.path(), "keep2.txt", b"dup");
    write(dir.path(), "ignored/file.txt", b"dup");

    let walker_config = WalkerConfig {
        ignore_patterns: vec![
            "*.tmp".to_string(),
            "*.log".to_string(),
            "ignored/".to_string(),
        ],
        ..WalkerConfig::default()
    };
    let config = FinderConfig::default()
        .with_recursive(true)
        .with_walker_config(walker_config);
    let report = DuplicateFinder::new(config)
        .find_duplicates(&roots(dir.path()))
        .unwrap();

    assert_eq!(report.total_files, 2);
    assert_eq!(report.groups.len(), 1);
}

#[test]
fn test_scan_every_mode_and_strategy() {
    let dir = tempdir().unwrap();
    write(dir.path(), "x1", &[7u8; 10_000]);
    write(dir.path(), "x2", &[7u8; 10_000]);
    let mut almost = vec![7u8; 10_000];
    almost[9_999] = 8;
    write(dir.path(), "x3", &almost);

    for mode in [SignatureMode::Checksum, SignatureMode::Prefix] {
        for strategy in [VerifyStrategy::Digest, VerifyStrategy::ByteCompare] {
            let config = FinderConfig::default()
                .with_signature_mode(mode)
                .with_verify_strategy(strategy);
            let report = DuplicateFinder::new(config)
                .find_duplicates(&roots(dir.path()))
                .unwrap();

            assert_eq!(report.groups.len(), 1, "{mode} / {strategy}");
            assert_eq!(names(report.groups[0].paths()), vec!["x1", "x2"]);
            assert_eq!(report.groups[0].signature.mode(), mode);
            assert_eq!(
                report.groups[0].digest.is_some(),
                strategy == VerifyStrategy::Digest
            );
        }
    }
}

#[test]
fn test_scan_single_io_thread_matches_pool() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write(dir.path(), &format!("f{i:02}"), format!("{}", i % 4).as_bytes());
    }

    let sequential = DuplicateFinder::new(FinderConfig::default().with_io_threads(1))
        .find_duplicates(&roots(dir.path()))
        .unwrap();
    let parallel = DuplicateFinder::new(FinderConfig::default().with_io_threads(8))
        .find_duplicates(&roots(dir.path()))
        .unwrap();

    assert_eq!(sequential.groups, parallel.groups);
    assert_eq!(sequential.groups.len(), 4);
}
