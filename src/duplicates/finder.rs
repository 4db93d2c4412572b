//! The pipeline orchestrator.
//!
//! # Overview
//!
//! [`DuplicateFinder`] drives the three-stage funnel:
//! 1. **Size classification**: group records by exact length (no I/O)
//! 2. **Fast signature**: checksum or prefix hash per member of each size class
//! 3. **Verification**: full digest or byte comparison per signature class
//!
//! Between stages 1 and 2 it runs the pre-flight check: if more size classes
//! could hold duplicates than the warn threshold allows, the injected
//! [`Confirmation`] decides whether to go on.
//!
//! Size classes are processed one at a time in first-seen order. Work inside
//! a class fans out over a bounded rayon pool, and results are collected in
//! input order, so reports are deterministic for a given input.
//!
//! # Example
//!
//! ```no_run
//! use find_duplicates::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let config = FinderConfig::default().with_recursive(true).with_io_threads(4);
//! let finder = DuplicateFinder::new(config);
//!
//! let report = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//! println!("Found {} duplicate groups", report.group_count());
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bytesize::ByteSize;

use super::groups::{classify_by_size, DuplicateGroup, SignatureClass, SizeClasses};
use super::report::DuplicateReport;
use super::signature::{sign_size_class, SignatureMode, SignatureStats};
use super::verify::{verify_signature_class, VerifyStats, VerifyStrategy};
use crate::confirm::{AlwaysProceed, Confirmation};
use crate::progress::{ProgressCallback, PHASE_SIGNATURE, PHASE_VERIFY, PHASE_WALKING};
use crate::scanner::{FileRecord, Hasher, ScanError, Walker, WalkerConfig};

/// Duplicate-size class count above which the user is asked to confirm.
pub const DEFAULT_WARN_THRESHOLD: usize = 200;

/// Default size of the I/O worker pool.
pub const DEFAULT_IO_THREADS: usize = 4;

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Descend into subdirectories of each root.
    pub recursive: bool,
    /// Emit a progress message for every size class.
    pub verbose: bool,
    /// Suppress every progress callback.
    pub quiet: bool,
    /// Ask for confirmation when more size classes than this could hold
    /// duplicates. `None` never asks.
    pub warn_threshold: Option<usize>,
    /// Number of I/O threads for signatures and digests.
    /// Default is 4 to prevent disk thrashing; 1 reads files one at a time.
    pub io_threads: usize,
    /// Fast signature computed in stage 2.
    pub signature_mode: SignatureMode,
    /// How stage 3 confirms candidates.
    pub verify_strategy: VerifyStrategy,
    /// Filters for directory traversal. Its `recursive` field is overridden
    /// by [`FinderConfig::recursive`].
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("recursive", &self.recursive)
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .field("warn_threshold", &self.warn_threshold)
            .field("io_threads", &self.io_threads)
            .field("signature_mode", &self.signature_mode)
            .field("verify_strategy", &self.verify_strategy)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            verbose: false,
            quiet: false,
            warn_threshold: Some(DEFAULT_WARN_THRESHOLD),
            io_threads: DEFAULT_IO_THREADS,
            signature_mode: SignatureMode::default(),
            verify_strategy: VerifyStrategy::default(),
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Descend into subdirectories.
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Emit per-class progress messages.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Suppress progress callbacks.
    #[must_use]
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Set the confirmation threshold (`None` disables the check).
    #[must_use]
    pub fn with_warn_threshold(mut self, threshold: Option<usize>) -> Self {
        self.warn_threshold = threshold;
        self
    }

    /// Set the I/O thread count (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the fast signature mode.
    #[must_use]
    pub fn with_signature_mode(mut self, mode: SignatureMode) -> Self {
        self.signature_mode = mode;
        self
    }

    /// Set the verification strategy.
    #[must_use]
    pub fn with_verify_strategy(mut self, strategy: VerifyStrategy) -> Self {
        self.verify_strategy = strategy;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// The callback to report to, or `None` in quiet mode.
    fn progress(&self) -> Option<&Arc<dyn ProgressCallback>> {
        if self.quiet {
            None
        } else {
            self.progress_callback.as_ref()
        }
    }
}

/// Errors that end a scan without a report.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// No directories were given.
    #[error("No paths to scan")]
    NoPaths,
}

/// Runs the size → signature → verification funnel.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
    confirmation: Arc<dyn Confirmation>,
}

impl std::fmt::Debug for DuplicateFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateFinder")
            .field("config", &self.config)
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}

impl DuplicateFinder {
    /// Create a finder that never asks for confirmation.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            hasher: Hasher::new(),
            confirmation: Arc::new(AlwaysProceed),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Use `confirmation` for the pre-flight check.
    #[must_use]
    pub fn with_confirmation(mut self, confirmation: Arc<dyn Confirmation>) -> Self {
        self.confirmation = confirmation;
        self
    }

    /// The configuration this finder was built with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find duplicates among the files under `roots`.
    ///
    /// Every root is validated before anything is read. Only direct children
    /// are visited unless the configuration is recursive.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - `roots` is empty
    /// - A root does not exist or is not a directory
    /// - The scan is interrupted by shutdown signal
    pub fn find_duplicates(&self, roots: &[PathBuf]) -> Result<DuplicateReport, FinderError> {
        let start_time = Instant::now();

        if roots.is_empty() {
            return Err(FinderError::NoPaths);
        }
        for root in roots {
            if !root.exists() {
                return Err(FinderError::PathNotFound(root.clone()));
            }
            if !root.is_dir() {
                return Err(FinderError::NotADirectory(root.clone()));
            }
        }

        log::info!(
            "Starting duplicate scan of {} ({})",
            display_roots(roots),
            if self.config.recursive {
                "recursive"
            } else {
                "top level only"
            }
        );

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let walker_config = WalkerConfig {
            recursive: self.config.recursive,
            ..self.config.walker_config.clone()
        };
        let mut walker = Walker::new(roots.to_vec(), walker_config);
        if let Some(flag) = &self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }
        if let Some(callback) = self.config.progress() {
            callback.on_phase_start(PHASE_WALKING, 0);
            walker = walker.with_progress_callback(Arc::clone(callback));
        }

        let entries: Vec<Result<FileRecord, ScanError>> = walker.walk().collect();

        if let Some(callback) = self.config.progress() {
            callback.on_phase_end(PHASE_WALKING);
        }

        let mut report = self.run_pipeline(entries, start_time)?;
        report.roots = roots.to_vec();

        log::info!(
            "Scan complete: {} duplicate(s) in {} group(s), {} reclaimable",
            report.total_duplicates,
            report.group_count(),
            report.wasted_space_display()
        );

        Ok(report)
    }

    /// Find duplicates among already-enumerated records.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if the shutdown flag is set.
    pub fn find_duplicates_from_records(
        &self,
        records: impl IntoIterator<Item = FileRecord>,
    ) -> Result<DuplicateReport, FinderError> {
        let start_time = Instant::now();
        self.run_pipeline(records.into_iter().map(Ok), start_time)
    }

    /// Find duplicates among an explicit list of file paths.
    ///
    /// A path that cannot be stat'ed (or is not a regular file) is skipped
    /// and recorded in the report's errors.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if the shutdown flag is set.
    pub fn find_duplicates_from_paths(
        &self,
        paths: &[PathBuf],
    ) -> Result<DuplicateReport, FinderError> {
        let start_time = Instant::now();
        self.run_pipeline(paths.iter().map(FileRecord::from_path), start_time)
    }

    /// Size classification, pre-flight check, then the content stages.
    fn run_pipeline(
        &self,
        entries: impl IntoIterator<Item = Result<FileRecord, ScanError>>,
        start_time: Instant,
    ) -> Result<DuplicateReport, FinderError> {
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let (classes, grouping, mut errors) = classify_by_size(entries);

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(threshold) = self.config.warn_threshold {
            if grouping.duplicate_size_classes > threshold {
                log::warn!(
                    "{} file sizes have duplicates (threshold {})",
                    grouping.duplicate_size_classes,
                    threshold
                );
                if !self
                    .confirmation
                    .confirm(grouping.duplicate_size_classes, threshold)
                {
                    log::info!("Scan cancelled at confirmation");
                    let mut report = DuplicateReport::cancelled(grouping);
                    report.errors = errors;
                    report.duration = start_time.elapsed();
                    return Ok(report);
                }
            }
        }

        let pool = self.build_pool();

        let (signature_classes, signature_stats) =
            self.signature_stage(&classes, pool.as_ref(), &mut errors)?;
        let (groups, verify_stats) =
            self.verify_stage(&signature_classes, pool.as_ref(), &mut errors)?;

        let mut report = DuplicateReport::new(groups, grouping);
        report.signature = signature_stats;
        report.verify = verify_stats;
        report.errors = errors;
        report.duration = start_time.elapsed();
        Ok(report)
    }

    /// Stage 2: sign each size class. Output is grouped per size class.
    fn signature_stage(
        &self,
        classes: &SizeClasses,
        pool: Option<&rayon::ThreadPool>,
        errors: &mut Vec<ScanError>,
    ) -> Result<(Vec<Vec<SignatureClass>>, SignatureStats), FinderError> {
        let total_files: usize = classes.iter().map(|c| c.len()).sum();
        let progress = self.config.progress();
        let counter = AtomicUsize::new(0);
        let on_item = |file: &FileRecord| {
            if let Some(callback) = progress {
                let current = counter.fetch_add(1, Ordering::Relaxed) + 1;
                callback.on_progress(current, &file.path);
                callback.on_item_completed(file.size);
            }
        };

        log::info!(
            "Computing {} signatures for {} files in {} size classes",
            self.config.signature_mode,
            total_files,
            classes.len()
        );
        if let Some(callback) = progress {
            callback.on_phase_start(PHASE_SIGNATURE, total_files);
        }

        let mut stats = SignatureStats::default();
        let mut per_class = Vec::with_capacity(classes.len());

        for (i, class) in classes.iter().enumerate() {
            if self.config.is_shutdown_requested() {
                log::debug!("Shutdown requested before size class {}", i + 1);
                return Err(FinderError::Interrupted);
            }
            if self.config.verbose {
                if let Some(callback) = progress {
                    callback.on_message(&format!(
                        "Size class {}/{}: {} files of {}",
                        i + 1,
                        classes.len(),
                        class.len(),
                        ByteSize::b(class.size)
                    ));
                }
            }

            let (signed, class_stats, class_errors) = run_in_pool(pool, || {
                sign_size_class(class, self.config.signature_mode, &self.hasher, &on_item)
            });
            stats.merge(&class_stats);
            errors.extend(class_errors.into_iter().map(ScanError::from));
            per_class.push(signed);
        }

        if let Some(callback) = progress {
            callback.on_phase_end(PHASE_SIGNATURE);
        }
        log::info!(
            "Signatures: {} → {} candidates ({:.1}% eliminated, {} unreadable)",
            stats.input_files,
            stats.candidates,
            stats.elimination_rate(),
            stats.failed
        );

        Ok((per_class, stats))
    }

    /// Stage 3: confirm each signature class, size class by size class.
    fn verify_stage(
        &self,
        per_class: &[Vec<SignatureClass>],
        pool: Option<&rayon::ThreadPool>,
        errors: &mut Vec<ScanError>,
    ) -> Result<(Vec<DuplicateGroup>, VerifyStats), FinderError> {
        let total_files: usize = per_class.iter().flatten().map(SignatureClass::len).sum();
        let progress = self.config.progress();
        let counter = AtomicUsize::new(0);
        let on_item = |file: &FileRecord| {
            if let Some(callback) = progress {
                let current = counter.fetch_add(1, Ordering::Relaxed) + 1;
                callback.on_progress(current, &file.path);
                callback.on_item_completed(file.size);
            }
        };

        log::info!(
            "Verifying {} candidates by {}",
            total_files,
            self.config.verify_strategy
        );
        if let Some(callback) = progress {
            callback.on_phase_start(PHASE_VERIFY, total_files);
        }

        let mut stats = VerifyStats::default();
        let mut groups = Vec::new();

        for (i, signature_classes) in per_class.iter().enumerate() {
            if signature_classes.is_empty() {
                continue;
            }
            if self.config.is_shutdown_requested() {
                log::debug!("Shutdown requested before verifying size class {}", i + 1);
                return Err(FinderError::Interrupted);
            }

            for class in signature_classes {
                let (confirmed, class_stats, class_errors) = run_in_pool(pool, || {
                    verify_signature_class(
                        class,
                        self.config.verify_strategy,
                        &self.hasher,
                        &on_item,
                    )
                });
                stats.merge(&class_stats);
                errors.extend(class_errors.into_iter().map(ScanError::from));
                groups.extend(confirmed);
            }
        }

        if let Some(callback) = progress {
            callback.on_phase_end(PHASE_VERIFY);
        }
        log::info!(
            "Verification: {} group(s), {} false candidate(s), {} unreadable",
            stats.groups,
            stats.false_candidates,
            stats.failed
        );

        Ok((groups, stats))
    }

    /// Build the bounded I/O pool, falling back to rayon's global pool.
    fn build_pool(&self) -> Option<rayon::ThreadPool> {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::warn!(
                    "Failed to create I/O thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                None
            }
        }
    }
}

fn run_in_pool<T: Send>(pool: Option<&rayon::ThreadPool>, op: impl FnOnce() -> T + Send) -> T {
    match pool {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

fn display_roots(roots: &[PathBuf]) -> String {
    roots
        .iter()
        .map(|r| r.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
