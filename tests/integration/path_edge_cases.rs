use find_duplicates::duplicates::{DuplicateFinder, FinderConfig};
use find_duplicates::output::{shell_quote, TextOutput};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tempfile::tempdir;

fn recursive() -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_recursive(true))
}

#[test]
fn test_paths_with_quotes() {
    let dir = tempdir().unwrap();

    // Windows does not allow double quotes in filenames.
    if cfg!(not(windows)) {
        File::create(dir.path().join("file_with_\"quote\".txt"))
            .unwrap()
            .write_all(b"content")
            .unwrap();
        File::create(dir.path().join("it's.txt"))
            .unwrap()
            .write_all(b"content")
            .unwrap();

        let report = DuplicateFinder::with_defaults()
            .find_duplicates(&[dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(report.groups.len(), 1);
        let text = TextOutput::new(&report).with_color(false).render();
        for file in &report.groups[0].files {
            assert!(text.contains(&format!("  {}\n", shell_quote(&file.path))));
        }
        let quoted = text
            .lines()
            .find(|l| l.contains("s.txt") && !l.contains("quote"))
            .unwrap()
            .trim_start();
        let words = shlex::split(quoted).unwrap();
        assert!(words[0].ends_with("it's.txt"));
    }
}

#[test]
fn test_paths_with_newlines() {
    let dir = tempdir().unwrap();

    // Windows does not allow newlines in filenames.
    if cfg!(not(windows)) {
        File::create(dir.path().join("file_with\nnewline.txt"))
            .unwrap()
            .write_all(b"content")
            .unwrap();
        File::create(dir.path().join("duplicate.txt"))
            .unwrap()
            .write_all(b"content")
            .unwrap();

        let report = DuplicateFinder::with_defaults()
            .find_duplicates(&[dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(report.groups.len(), 1);
        let with_newline = report.groups[0]
            .files
            .iter()
            .find(|f| f.path.contains('\n'))
            .unwrap();
        // Quoted, so the newline stays inside one shell word.
        let words = shlex::split(&shell_quote(&with_newline.path)).unwrap();
        assert_eq!(words, vec![with_newline.path.clone()]);
    }
}

#[test]
fn test_special_characters_in_filenames() {
    let dir = tempdir().unwrap();
    let pairs = [
        ("file with spaces.txt", "duplicate1.txt", &b"content"[..]),
        ("café_🦀.txt", "duplicate2.txt", &b"unicode content"[..]),
        ("special_!@#$%^&()_+.txt", "duplicate3.txt", &b"special content"[..]),
    ];
    for (odd, plain, content) in pairs {
        fs::write(dir.path().join(odd), content).unwrap();
        fs::write(dir.path().join(plain), content).unwrap();
    }

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.groups.len(), 3);
}

#[test]
fn test_deeply_nested_paths() {
    let dir = tempdir().unwrap();
    let mut current_path = dir.path().to_path_buf();
    for i in 0..15 {
        current_path = current_path.join(format!("level_{i}"));
    }
    fs::create_dir_all(&current_path).unwrap();
    fs::write(current_path.join("deep.txt"), b"deep content").unwrap();
    fs::write(dir.path().join("shallow.txt"), b"deep content").unwrap();

    let report = recursive()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.total_files, 2);
}

#[test]
fn test_extremely_long_paths() {
    let dir = tempdir().unwrap();
    let folder_name = "a".repeat(50);
    let mut current_path = dir.path().to_path_buf();

    for i in 0..6 {
        current_path = current_path.join(format!("{i}_{folder_name}"));
        if let Err(e) = fs::create_dir(&current_path) {
            eprintln!("Skipping extremely long path test: failed to create dir: {e}");
            return;
        }
    }
    if let Err(e) = fs::write(current_path.join("file.txt"), b"content") {
        eprintln!("Skipping extremely long path test: failed to create file: {e}");
        return;
    }
    fs::write(dir.path().join("duplicate.txt"), b"content").unwrap();

    let report = recursive()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.groups.len(), 1);
}

#[test]
fn test_record_paths_use_forward_slashes() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("one"), b"1").unwrap();
    fs::write(dir.path().join("sub").join("two"), b"1").unwrap();

    let report = recursive()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    for file in &report.groups[0].files {
        assert!(!file.path.contains('\\'));
        assert!(PathBuf::from(&file.path).exists());
    }
}

/// Two identical files per name; every one must be read under its own name.
fn assert_pair_found(names: [&str; 2]) {
    let dir = tempdir().unwrap();
    for name in names {
        fs::write(dir.path().join(name), b"identical").unwrap();
    }

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert_eq!(report.total_files, 2);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.total_duplicates, 2);
}

#[test]
fn test_decomposed_unicode_names() {
    assert_pair_found(["cafe\u{0301}1.txt", "cafe\u{0301}2.txt"]);
}

#[cfg(unix)]
#[test]
fn test_backslash_in_unix_names() {
    assert_pair_found(["a\\1", "a\\2"]);
}

// macOS treats the two spellings as one name.
#[cfg(all(unix, not(target_os = "macos")))]
#[test]
fn test_composed_and_decomposed_siblings_are_distinct() {
    assert_pair_found(["café", "cafe\u{0301}"]);
}

#[cfg(unix)]
#[test]
fn test_non_utf8_names_are_read() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().unwrap();
    let first = dir.path().join(OsStr::from_bytes(b"\xff.bin"));
    let second = dir.path().join(OsStr::from_bytes(b"\xfe.bin"));
    // Some file systems reject non-UTF-8 names.
    if fs::write(&first, b"bytes").is_err() || fs::write(&second, b"bytes").is_err() {
        eprintln!("Skipping non-UTF-8 name test: file system rejected the name");
        return;
    }

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(report.errors.is_empty());
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].files.len(), 2);
}
