//! Document I/O Integration Tests
//!
//! Filesystem-level behavior: hint discovery next to the input, CLI merge
//! output naming, dry-run write suppression, and batch continuation past
//! a malformed document.

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use veridoc::cli::{Cli, Commands};
use veridoc::config::Config;
use veridoc::ingest::hints::discover_classification;

const DOCUMENT: &str = "\
---[Start PDF page 1]---
Allegation with citation $ ^{1} $ in the body.

$ ^{1} $ Recorded deed, attached.
---[End PDF page 1]---
";

fn write_document(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, DOCUMENT).unwrap();
    path
}

fn merge_command(input: &Path, dry_run: bool) -> Cli {
    Cli {
        config: None,
        command: Commands::Merge {
            input: input.to_path_buf(),
            output: None,
            dry_run,
            scan_only: false,
            hints: None,
            stats: None,
        },
    }
}

#[test]
fn test_merge_writes_default_output_path() {
    let dir = tempdir().unwrap();
    let input = write_document(dir.path(), "filing_combined.md");

    merge_command(&input, false).execute().unwrap();

    let output = dir.path().join("filing_combined_fn_merged.md");
    let merged = fs::read_to_string(output).unwrap();
    assert!(merged.contains("[FN1: Recorded deed, attached.]"));
    assert!(!merged.contains("$ ^{1} $ Recorded deed"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempdir().unwrap();
    let input = write_document(dir.path(), "filing_combined.md");

    merge_command(&input, true).execute().unwrap();

    assert!(!dir.path().join("filing_combined_fn_merged.md").exists());
    // The input is untouched
    assert_eq!(fs::read_to_string(&input).unwrap(), DOCUMENT);
}

#[test]
fn test_stats_json_is_written() {
    let dir = tempdir().unwrap();
    let input = write_document(dir.path(), "filing_combined.md");
    let stats_path = dir.path().join("stats.json");

    let cli = Cli {
        config: None,
        command: Commands::Merge {
            input: input.clone(),
            output: None,
            dry_run: true,
            scan_only: true,
            hints: None,
            stats: Some(stats_path.clone()),
        },
    };
    cli.execute().unwrap();

    let stats: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(stats_path).unwrap()).unwrap();
    assert_eq!(stats["stats"]["source"], "scan_only");
    assert_eq!(stats["stats"]["found"], 1);
    assert_eq!(stats["stats"]["pages"][0]["merged"][0], 1);
}

#[test]
fn test_classification_discovery_prefers_manifest() {
    let dir = tempdir().unwrap();
    let input = write_document(dir.path(), "filing_combined.md");

    let class_dir = dir.path().join("filing_combined_classification");
    fs::create_dir(&class_dir).unwrap();
    fs::write(
        class_dir.join("manifest.json"),
        r#"{"pages": [{"page_number": 1, "footnotes": [{"fn_number": 1, "merge_status": "merged"}]}]}"#,
    )
    .unwrap();

    let classification = discover_classification(&input).unwrap().unwrap();
    assert_eq!(classification.footnote_inventory().len(), 1);
}

#[test]
fn test_classification_discovery_falls_back_to_raw_json() {
    let dir = tempdir().unwrap();
    let input = write_document(dir.path(), "filing_combined.md");

    let class_dir = dir.path().join("filing_combined_classification");
    fs::create_dir(&class_dir).unwrap();
    fs::write(
        class_dir.join("filing_text_classification_raw.json"),
        r#"{"pages": [{"page_number": 1, "footnotes": [{"fn_number": 1}]}]}"#,
    )
    .unwrap();

    let classification = discover_classification(&input).unwrap().unwrap();
    assert_eq!(classification.footnote_inventory()[0].number, 1);
}

#[test]
fn test_discovery_absent_is_not_an_error() {
    let dir = tempdir().unwrap();
    let input = write_document(dir.path(), "filing_combined.md");

    assert!(discover_classification(&input).unwrap().is_none());
}

#[test]
fn test_batch_continues_past_malformed_document() {
    let dir = tempdir().unwrap();
    write_document(dir.path(), "a_combined.md");
    // Missing end delimiter: structural, fatal for this document only
    fs::write(
        dir.path().join("b_combined.md"),
        "---[Start PDF page 1]---\nbody\n",
    )
    .unwrap();
    write_document(dir.path(), "c_combined.md");

    let cli = Cli {
        config: None,
        command: Commands::Batch {
            dir: dir.path().to_path_buf(),
            pattern: "*_combined.md".to_string(),
            dry_run: false,
        },
    };
    cli.execute().unwrap();

    assert!(dir.path().join("a_combined_fn_merged.md").exists());
    assert!(!dir.path().join("b_combined_fn_merged.md").exists());
    assert!(dir.path().join("c_combined_fn_merged.md").exists());
}

#[test]
fn test_custom_config_file_round_trip() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("markers.yaml");
    fs::write(
        &config_path,
        "duplicate_text: first_wins\nmarkers:\n  annotation: \" ({n}) {text}\"\n",
    )
    .unwrap();

    let config = Config::from_file(&config_path).unwrap();
    assert_eq!(config.duplicate_text, veridoc::DuplicateTextPolicy::FirstWins);

    let markers = config.compile().unwrap();
    assert_eq!(markers.render_annotation(3, "text"), " (3) text");
}
