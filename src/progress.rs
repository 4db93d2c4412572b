//! Progress reporting using indicatif.
//!
//! The finder reports through the [`ProgressCallback`] trait and never draws
//! anything itself. [`Progress`] is the terminal implementation: a spinner
//! while walking, then one bar for the signature stage and one for
//! verification.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Phase name used while enumerating files.
pub const PHASE_WALKING: &str = "walking";
/// Phase name used while computing fast signatures.
pub const PHASE_SIGNATURE: &str = "signature";
/// Phase name used while confirming content.
pub const PHASE_VERIFY: &str = "verify";

/// Progress callback for duplicate finding phases.
///
/// Implement this trait to receive progress updates during
/// the duplicate detection pipeline.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - One of [`PHASE_WALKING`], [`PHASE_SIGNATURE`], [`PHASE_VERIFY`]
    /// * `total` - Total number of items to process (0 when unknown)
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when an item has been processed, providing its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    signature: Mutex<Option<ProgressBar>>,
    verify: Mutex<Option<ProgressBar>>,
    prefix: Mutex<String>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use find_duplicates::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            walking: Mutex::new(None),
            signature: Mutex::new(None),
            verify: Mutex::new(None),
            prefix: Mutex::new(String::new()),
            quiet,
        }
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn signature_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn verify_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} ({percent}%) {msg} {per_sec} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn slot(&self, phase: &str) -> Option<&Mutex<Option<ProgressBar>>> {
        match phase {
            PHASE_WALKING => Some(&self.walking),
            PHASE_SIGNATURE => Some(&self.signature),
            PHASE_VERIFY => Some(&self.verify),
            _ => None,
        }
    }

    /// The most recently started bar that is still running.
    fn with_active_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let active = [&self.verify, &self.signature, &self.walking]
            .into_iter()
            .find_map(|slot| slot.lock().ok().and_then(|guard| guard.clone()));
        if let Some(pb) = active {
            f(&pb);
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = match phase {
            PHASE_WALKING => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::walking_style());
                pb.set_message("Walking directories");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            PHASE_SIGNATURE => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::signature_style());
                pb.set_message("Computing signatures");
                pb
            }
            PHASE_VERIFY => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::verify_style());
                pb.set_message("Verifying content");
                pb
            }
            _ => return,
        };

        if let Some(Ok(mut guard)) = self.slot(phase).map(Mutex::lock) {
            *guard = Some(pb);
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        let display_msg = match self.prefix.lock() {
            Ok(prefix) if !prefix.is_empty() => {
                format!("{}: {}", *prefix, truncate_path(path, 30))
            }
            _ => truncate_path(path, 30),
        };

        self.with_active_bar(|pb| {
            pb.set_position(current as u64);
            pb.set_message(display_msg);
        });
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        let message = match phase {
            PHASE_WALKING => "Walking complete",
            PHASE_SIGNATURE => "Signatures complete",
            PHASE_VERIFY => "Verification complete",
            _ => return,
        };

        if let Some(Ok(mut guard)) = self.slot(phase).map(Mutex::lock) {
            if let Some(pb) = guard.take() {
                pb.finish_with_message(message);
            }
        }
        if let Ok(mut prefix) = self.prefix.lock() {
            prefix.clear();
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }

        if let Ok(mut prefix) = self.prefix.lock() {
            *prefix = message.to_string();
        }
        self.with_active_bar(|pb| pb.set_message(message.to_string()));
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = path.rsplit('/').next().unwrap_or(path);
    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let tail: String = file_name.chars().skip(name_len + 3 - max_len).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
