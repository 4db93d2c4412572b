//! Plain-text output for terminals and pipes.
//!
//! ```text
//! files with digest 6b86b273... (10 B):
//!   /data/a.txt
//!   '/data/copy of a.txt'
//!
//! Found 2 duplicates out of 3 files in /data
//! ```
//!
//! Paths are quoted with `shlex` when they contain anything outside the
//! shell-safe set, so each member line can be pasted into a shell. Other
//! hard links to a member follow it as `(aka ...)`.

use std::borrow::Cow;
use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use crate::duplicates::{DuplicateGroup, DuplicateReport};
use crate::scanner::FileRecord;

/// Renders a [`DuplicateReport`] as human-readable text.
#[derive(Debug, Clone)]
pub struct TextOutput<'a> {
    report: &'a DuplicateReport,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a text renderer with colors enabled.
    #[must_use]
    pub fn new(report: &'a DuplicateReport) -> Self {
        Self {
            report,
            color: true,
        }
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Write every group followed by the summary line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        if self.report.is_cancelled() {
            writeln!(
                writer,
                "{} {} file sizes have duplicates; no content was compared.",
                self.paint_warning("Cancelled:"),
                self.report.duplicate_size_classes
            )?;
            return Ok(());
        }

        for group in &self.report.groups {
            writeln!(writer, "{}", self.paint_header(&group_header(group)))?;
            for file in &group.files {
                writeln!(writer, "  {}", member_line(file))?;
            }
        }

        if !self.report.groups.is_empty() {
            writeln!(writer)?;
        }
        writeln!(writer, "{}", self.paint_summary(&summary_line(self.report)))?;
        Ok(())
    }

    /// Render to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn paint_header(&self, text: &str) -> String {
        if self.color {
            text.cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_summary(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_warning(&self, text: &str) -> String {
        if self.color {
            text.yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// `files with <kind> <value> (<size>):`
///
/// The digest is shown when verification computed one, otherwise the fast
/// signature that formed the group.
#[must_use]
pub fn group_header(group: &DuplicateGroup) -> String {
    let size = ByteSize::b(group.size);
    match group.digest_hex() {
        Some(digest) => format!("files with digest {digest} ({size}):"),
        None => format!(
            "files with {} {} ({size}):",
            group.signature.label(),
            group.signature
        ),
    }
}

/// A member path, followed by its other hard links if it has any.
#[must_use]
pub fn member_line(file: &FileRecord) -> String {
    let path = shell_quote(&file.path);
    if file.links.is_empty() {
        return path;
    }
    let links: Vec<String> = file.links.iter().map(|l| shell_quote(l)).collect();
    format!("{path} (aka {})", links.join(", "))
}

/// `Found N duplicate(s) out of M files in <roots>`
///
/// When hard links were folded into other records their count follows the
/// file count.
#[must_use]
pub fn summary_line(report: &DuplicateReport) -> String {
    let noun = if report.total_duplicates == 1 {
        "duplicate"
    } else {
        "duplicates"
    };
    let location = if report.roots.is_empty() {
        "the given paths".to_string()
    } else {
        report
            .roots
            .iter()
            .map(|r| shell_quote(&r.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let links = match report.grouping.linked_paths {
        0 => String::new(),
        1 => " (1 hard link)".to_string(),
        n => format!(" ({n} hard links)"),
    };
    format!(
        "Found {} {} out of {} files{} in {}",
        report.total_duplicates, noun, report.total_files, links, location
    )
}

/// Quote `s` for a POSIX shell if it contains unsafe characters.
///
/// Safe strings are returned unchanged. A string holding a NUL byte cannot
/// be expressed as a shell word and is shown Rust-escaped instead.
#[must_use]
pub fn shell_quote(s: &str) -> String {
    match shlex::try_quote(s) {
        Ok(quoted) => Cow::into_owned(quoted),
        Err(_) => format!("{s:?}"),
    }
}
