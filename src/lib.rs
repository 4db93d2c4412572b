//! find-duplicates - content-based duplicate file finder
//!
//! Files are narrowed down in three stages: exact size, a fast signature
//! (Adler-32 checksum or a BLAKE3 hash of the first 4 KiB), and finally a
//! full BLAKE3 digest or a byte-for-byte comparison. Only files that survive
//! all three are reported as duplicates.
//!
//! The library half ([`duplicates`], [`scanner`]) never prints; the binary
//! wires it to the terminal through [`run_app`].

pub mod cli;
pub mod config;
pub mod confirm;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::confirm::{Confirmation, StdinConfirmation};
use crate::duplicates::{DuplicateFinder, DuplicateReport, FinderConfig, VerifyStrategy};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::WalkerConfig;

/// Run the command line application, printing the report to stdout.
///
/// # Errors
///
/// Returns an error for invalid configuration, bad input paths, an
/// interrupted scan, or a failure to write the report.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let stdout = io::stdout();
    let color = !cli.no_color && stdout.is_terminal();
    let mut out = stdout.lock();
    run_app_with(cli, Arc::new(StdinConfirmation), color, &mut out)
}

/// Run the application with an explicit confirmation source and writer.
///
/// # Errors
///
/// See [`run_app`].
pub fn run_app_with(
    cli: Cli,
    confirmation: Arc<dyn Confirmation>,
    color: bool,
    out: &mut dyn Write,
) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if !color {
        yansi::disable();
    }

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    log::debug!("Effective config file values: {:?}", config);

    let handler = signal::install_handler()?;
    let finder_config = finder_config(&cli, &config).with_shutdown_flag(handler.get_flag());
    let finder_config = if cli.quiet {
        finder_config
    } else {
        finder_config.with_progress_callback(Arc::new(Progress::new(false)))
    };

    let finder = DuplicateFinder::new(finder_config).with_confirmation(confirmation);
    let report = finder.find_duplicates(&cli.paths)?;

    if !report.errors.is_empty() {
        log::warn!(
            "{} file(s) could not be read and were left out",
            report.errors.len()
        );
    }

    write_report(&report, cli.output, color, out).context("Failed to write report")?;

    Ok(ExitCode::Success)
}

/// Merge config file values with command-line flags into a finder config.
///
/// A flag that is set wins over the file; list options are concatenated.
#[must_use]
pub fn finder_config(cli: &Cli, config: &Config) -> FinderConfig {
    let mut ignore_patterns = config.ignore_patterns.clone();
    ignore_patterns.extend(cli.ignore_patterns.iter().cloned());

    let walker_config = WalkerConfig::new(
        cli.recursive || config.recursive,
        cli.skip_hidden || config.skip_hidden,
        cli.min_size,
        cli.max_size,
        ignore_patterns,
    );

    let warn_threshold = if cli.no_warn || config.no_warn {
        None
    } else {
        Some(cli.warn_threshold.unwrap_or(config.warn_threshold))
    };

    FinderConfig::default()
        .with_recursive(cli.recursive || config.recursive)
        .with_verbose(cli.verbose > 0)
        .with_quiet(cli.quiet)
        .with_warn_threshold(warn_threshold)
        .with_io_threads(cli.io_threads.unwrap_or(config.io_threads))
        .with_signature_mode(cli.signature.unwrap_or(config.signature))
        .with_verify_strategy(VerifyStrategy::from_paranoid(cli.paranoid || config.paranoid))
        .with_walker_config(walker_config)
}

fn write_report(
    report: &DuplicateReport,
    format: OutputFormat,
    color: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => TextOutput::new(report).with_color(color).write_to(out)?,
        OutputFormat::Json => JsonOutput::new(report, ExitCode::Success).write_to(out, true)?,
    }
    out.flush()?;
    Ok(())
}
