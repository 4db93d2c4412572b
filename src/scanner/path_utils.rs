//! Path identity and display for file records.
//!
//! A [`FileRecord`](super::FileRecord) keeps the path exactly as the
//! operating system handed it out and reads through that path. Two more
//! forms are derived from it:
//!
//! - The identity key decides whether two spellings name the same directory
//!   entry. Only differences the platform itself ignores are folded: on
//!   macOS the file system is normalization-insensitive, so `café.txt` and
//!   `cafe\u{0301}.txt` are one entry and both keys become NFC. Elsewhere
//!   the two are distinct files and the key is the path unchanged. On
//!   Windows `\` and `/` already compare equal as path components.
//! - The display form is a UTF-8 string for reports. Non-UTF-8 bytes are
//!   replaced lossily; Windows separators are shown as `/`.
//!
//! # Example
//!
//! ```
//! use find_duplicates::scanner::path_utils::{fold_unicode, paths_equal};
//! use std::path::Path;
//!
//! assert_eq!(fold_unicode("cafe\u{0301}.txt"), "café.txt");
//! assert!(paths_equal(Path::new("dir/a.txt"), Path::new("dir//a.txt")));
//! ```

use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Compose a string into NFC.
///
/// # Example
///
/// ```
/// use find_duplicates::scanner::path_utils::fold_unicode;
///
/// assert_eq!(fold_unicode("re\u{0301}sume\u{0301}"), "résumé");
/// ```
#[must_use]
pub fn fold_unicode(s: &str) -> String {
    s.nfc().collect()
}

/// Key under which two spellings of one directory entry compare equal.
#[must_use]
pub fn identity_key(path: &Path) -> PathBuf {
    if cfg!(target_os = "macos") {
        if let Some(s) = path.to_str() {
            return PathBuf::from(fold_unicode(s));
        }
    }
    path.to_path_buf()
}

/// Report form of a path.
#[must_use]
pub fn display_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    if cfg!(windows) {
        s.replace('\\', "/")
    } else {
        s.into_owned()
    }
}

/// Check if two paths name the same directory entry on this platform.
#[must_use]
pub fn paths_equal(a: &Path, b: &Path) -> bool {
    identity_key(a) == identity_key(b)
}
