use clap::Parser;
use find_duplicates::cli::Cli;
use find_duplicates::confirm::FixedConfirmation;
use find_duplicates::duplicates::FinderError;
use find_duplicates::error::ExitCode;
use find_duplicates::run_app_with;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn run(args: &[&str], answer: bool) -> (anyhow::Result<ExitCode>, String) {
    let mut argv = vec!["find-duplicates", "-q"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();

    let mut out = Vec::new();
    let result = run_app_with(cli, Arc::new(FixedConfirmation::new(answer)), false, &mut out);
    (result, String::from_utf8(out).unwrap())
}

fn fixture(dir: &Path) {
    fs::write(dir.join("A"), "x".repeat(10)).unwrap();
    fs::write(dir.join("B"), "x".repeat(10)).unwrap();
    fs::write(dir.join("C"), "y".repeat(10)).unwrap();
}

#[test]
fn test_text_report() {
    let dir = tempdir().unwrap();
    fixture(dir.path());
    let root = dir.path().to_string_lossy().into_owned();

    let (result, out) = run(&[&root], true);
    assert_eq!(result.unwrap(), ExitCode::Success);

    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with("files with digest "));
    assert!(lines[1].trim_start().ends_with("/A") || lines[1].ends_with("/A'"));
    assert!(lines[2].trim_start().ends_with("/B") || lines[2].ends_with("/B'"));
    assert!(out
        .trim_end()
        .lines()
        .last()
        .unwrap()
        .starts_with("Found 2 duplicates out of 3 files in "));
}

#[test]
fn test_json_report() {
    let dir = tempdir().unwrap();
    fixture(dir.path());
    let root = dir.path().to_string_lossy().into_owned();

    let (result, out) = run(&["--output", "json", "--paranoid", &root], true);
    assert_eq!(result.unwrap(), ExitCode::Success);

    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["status"], "completed");
    assert_eq!(parsed["summary"]["total_duplicates"], 2);
    assert_eq!(parsed["summary"]["total_files"], 3);
    let group = &parsed["duplicates"][0];
    assert_eq!(group["signature_kind"], "checksum");
    // Byte comparison computes no digest.
    assert!(group.get("digest").is_none());
}

#[test]
fn test_declined_prompt_exits_successfully() {
    let dir = tempdir().unwrap();
    fixture(dir.path());
    let root = dir.path().to_string_lossy().into_owned();

    let (result, out) = run(&["--warn-threshold", "0", &root], false);
    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.starts_with("Cancelled: 1 file sizes have duplicates"));
}

#[test]
fn test_no_warn_skips_prompt() {
    let dir = tempdir().unwrap();
    fixture(dir.path());
    let root = dir.path().to_string_lossy().into_owned();

    let (result, out) = run(&["-y", "--warn-threshold", "0", &root], false);
    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.contains("Found 2 duplicates"));
}

#[test]
fn test_missing_directory_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope").to_string_lossy().into_owned();

    let (result, out) = run(&[&missing], true);
    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinderError>(),
        Some(FinderError::PathNotFound(_))
    ));
    assert!(out.is_empty());
}

#[test]
fn test_file_argument_is_fatal() {
    let dir = tempdir().unwrap();
    fixture(dir.path());
    let file = dir.path().join("A").to_string_lossy().into_owned();

    let (result, _) = run(&[&file], true);
    assert!(matches!(
        result.unwrap_err().downcast_ref::<FinderError>(),
        Some(FinderError::NotADirectory(_))
    ));
}

#[test]
fn test_explicit_config_file_applies() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir_all(data.join("nested")).unwrap();
    fs::write(data.join("top"), "same").unwrap();
    fs::write(data.join("nested/deep"), "same").unwrap();

    let config = dir.path().join("config.toml");
    fs::write(&config, "recursive = true\n").unwrap();

    let config_arg = config.to_string_lossy().into_owned();
    let root = data.to_string_lossy().into_owned();
    let (result, out) = run(&["--config", &config_arg, &root], true);
    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.contains("Found 2 duplicates out of 2 files"));
}

#[test]
fn test_missing_config_file_is_fatal() {
    let dir = tempdir().unwrap();
    let root = dir.path().to_string_lossy().into_owned();
    let config = dir.path().join("absent.toml").to_string_lossy().into_owned();

    let (result, _) = run(&["--config", &config, &root], true);
    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("Config file not found"));
}
