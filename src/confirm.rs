//! Confirmation before a scan that would print a lot of output.
//!
//! After size classification the finder knows how many size classes could
//! hold duplicates. When that count exceeds the configured threshold it asks
//! a [`Confirmation`] whether to go on. The finder never talks to the
//! terminal itself; the prompt lives here.

use std::io::{self, Write};

use yansi::Paint;

/// Decides whether a large scan should continue.
pub trait Confirmation: Send + Sync {
    /// Return `true` to continue, `false` to cancel.
    ///
    /// `duplicate_size_classes` is the number of size classes with 2+
    /// members; `threshold` is the configured limit it exceeded.
    fn confirm(&self, duplicate_size_classes: usize, threshold: usize) -> bool;
}

/// Always continues. The default for library use and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysProceed;

impl Confirmation for AlwaysProceed {
    fn confirm(&self, _duplicate_size_classes: usize, _threshold: usize) -> bool {
        true
    }
}

/// Returns a fixed answer and counts how often it was asked.
#[derive(Debug, Default)]
pub struct FixedConfirmation {
    answer: bool,
    asked: std::sync::atomic::AtomicUsize,
}

impl FixedConfirmation {
    /// Always answer `answer`.
    #[must_use]
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Number of times [`Confirmation::confirm`] was called.
    #[must_use]
    pub fn times_asked(&self) -> usize {
        self.asked.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Confirmation for FixedConfirmation {
    fn confirm(&self, _duplicate_size_classes: usize, _threshold: usize) -> bool {
        self.asked.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.answer
    }
}

/// Asks on the terminal: `WARNING: Lots of output. Continue? [Y/n]`.
///
/// The prompt goes to stderr so it never mixes with JSON on stdout. Only an
/// explicit "n" or "no" cancels; an empty line, end of input or a read error
/// continues.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirmation;

impl Confirmation for StdinConfirmation {
    fn confirm(&self, duplicate_size_classes: usize, threshold: usize) -> bool {
        let mut stderr = io::stderr();
        let _ = write!(
            stderr,
            "{} Lots of output ({} sizes with duplicates, limit {}). Continue? [Y/n] ",
            "WARNING:".yellow().bold(),
            duplicate_size_classes,
            threshold
        );
        let _ = stderr.flush();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(_) => answer_continues(&input),
            Err(e) => {
                log::warn!("Failed to read confirmation, continuing: {}", e);
                true
            }
        }
    }
}

/// Interpret a reply to the prompt.
#[must_use]
pub fn answer_continues(input: &str) -> bool {
    let answer = input.trim();
    !(answer.eq_ignore_ascii_case("n") || answer.eq_ignore_ascii_case("no"))
}
