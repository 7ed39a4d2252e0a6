//! Command-line interface for veridoc.
//!
//! Provides commands for merging footnotes into a combined document,
//! batch-processing a directory of documents, verifying classification
//! output against the source text, and inspecting the resolved marker
//! configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::{Config, Markers};
use crate::domain::MergeStats;
use crate::ingest::{hints, ClassificationResult, CombinedDocument};
use crate::reconcile::Reconciler;
use crate::verify::{self, ParagraphIndex};

/// veridoc - source-grounded verification and footnote reconciliation
#[derive(Parser, Debug)]
#[command(name = "veridoc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Marker-syntax configuration file (YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge footnotes inline into the document body
    Merge {
        /// Combined page-delimited document
        input: PathBuf,

        /// Output path (default: <stem>_fn_merged.md)
        output: Option<PathBuf>,

        /// Compute everything but skip the final write
        #[arg(long)]
        dry_run: bool,

        /// Ignore classification hints and use scanned markers only
        #[arg(long)]
        scan_only: bool,

        /// Explicit location-inventory JSON (default: auto-discovered
        /// next to the input)
        #[arg(long)]
        hints: Option<PathBuf>,

        /// Write merge statistics to this path as JSON
        #[arg(long)]
        stats: Option<PathBuf>,
    },

    /// Merge every matching document under a directory, continuing past
    /// per-document failures
    Batch {
        /// Directory to search
        dir: PathBuf,

        /// Glob pattern for input documents
        #[arg(long, default_value = "*_combined.md")]
        pattern: String,

        /// Compute everything but skip the final writes
        #[arg(long)]
        dry_run: bool,
    },

    /// Verify search-constrained fields and cause-of-action ranges from a
    /// classification result against the source text
    Verify {
        /// Combined page-delimited document
        input: PathBuf,

        /// Classification result JSON (manifest or raw)
        #[arg(long)]
        manifest: PathBuf,
    },

    /// Show the resolved marker configuration
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("failed to load config: {}", path.display()))?,
            None => Config::default(),
        };
        let markers = config.compile().context("invalid marker configuration")?;

        match self.command {
            Commands::Merge {
                input,
                output,
                dry_run,
                scan_only,
                hints,
                stats,
            } => merge_document(
                &input,
                output.as_deref(),
                dry_run,
                scan_only,
                hints.as_deref(),
                stats.as_deref(),
                &markers,
            ),
            Commands::Batch {
                dir,
                pattern,
                dry_run,
            } => batch(&dir, &pattern, dry_run, &markers),
            Commands::Verify { input, manifest } => {
                verify_classification(&input, &manifest, &markers)
            }
            Commands::Config => show_config(&config),
        }
    }
}

/// Stats envelope written by `merge --stats`
#[derive(Debug, Serialize)]
struct StatsEnvelope<'a> {
    document: String,
    generated_at: String,
    stats: &'a MergeStats,
}

fn merge_document(
    input: &Path,
    output: Option<&Path>,
    dry_run: bool,
    scan_only: bool,
    hints_path: Option<&Path>,
    stats_path: Option<&Path>,
    markers: &Markers,
) -> Result<()> {
    let doc = CombinedDocument::from_file(input, markers)
        .with_context(|| format!("failed to parse {}", input.display()))?;
    println!("Input: {}", input.display());

    let inventory = if scan_only {
        println!("Footnote inventory: scanned markers only (--scan-only)");
        None
    } else {
        let classification = match hints_path {
            Some(path) => Some(
                ClassificationResult::from_file(path)
                    .with_context(|| format!("failed to load hints: {}", path.display()))?,
            ),
            None => hints::discover_classification(input)
                .context("failed to load discovered classification output")?,
        };
        let records = classification
            .map(|c| c.footnote_inventory())
            .unwrap_or_default();
        if records.is_empty() {
            println!("Footnote inventory: scanned markers only (no classification data)");
            None
        } else {
            println!(
                "Footnote inventory: classification hints ({} claims), text from source scan",
                records.len()
            );
            for record in &records {
                let hint = if record.location_hint.is_empty() {
                    String::new()
                } else {
                    format!(" | loc: {:?}", record.location_hint)
                };
                println!(
                    "  FN{} (pg {}, {:?}){}",
                    record.number, record.page, record.status, hint
                );
            }
            Some(records)
        }
    };

    let outcome = Reconciler::new(markers).reconcile(&doc, inventory.as_deref());
    print_merge_report(&outcome.stats);

    if let Some(path) = stats_path {
        let envelope = StatsEnvelope {
            document: input.display().to_string(),
            generated_at: Utc::now().to_rfc3339(),
            stats: &outcome.stats,
        };
        std::fs::write(path, serde_json::to_string_pretty(&envelope)?)
            .with_context(|| format!("failed to write stats: {}", path.display()))?;
        println!("Stats: {}", path.display());
    }

    if dry_run {
        println!("\n(Dry run - no file written)");
        return Ok(());
    }

    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(input),
    };
    let original = doc.render();
    let merged = outcome.document.render();
    std::fs::write(&output_path, &merged)
        .with_context(|| format!("failed to write output: {}", output_path.display()))?;
    println!("\nOutput: {}", output_path.display());
    println!("  {} chars -> {} chars", original.len(), merged.len());

    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    input.with_file_name(format!("{stem}_fn_merged.md"))
}

fn print_merge_report(stats: &MergeStats) {
    println!("\nMerge results:");
    println!("  Source: {:?}", stats.source);
    println!("  Pages with footnotes: {}", stats.pages_with_footnotes);
    println!("  Footnotes found: {}", stats.found);
    println!("  Merged inline: {}", stats.merged);
    if stats.no_text > 0 {
        println!(
            "  WARNING - Footnotes with no source text block: {}",
            stats.no_text
        );
    }
    if stats.unmatched > 0 {
        println!(
            "  WARNING - Footnotes without a body reference: {}",
            stats.unmatched
        );
    }

    for page in &stats.pages {
        let mut line = format!("    Page {:>3}: FN {:?}", page.page, page.found);
        if !page.no_text.is_empty() {
            line.push_str(&format!("  (no text: {:?})", page.no_text));
        }
        if !page.unmatched.is_empty() {
            line.push_str(&format!("  (no body ref: {:?})", page.unmatched));
        }
        println!("{line}");
    }

    if !stats.gaps.is_empty() {
        println!("  Sequence gaps: {:?}", stats.gaps);
    }
    if !stats.duplicates.is_empty() {
        println!("  Duplicate numbers: {:?}", stats.duplicates);
    }
}

fn batch(dir: &Path, pattern: &str, dry_run: bool, markers: &Markers) -> Result<()> {
    let full_pattern = dir.join(pattern);
    let pattern_str = full_pattern
        .to_str()
        .context("batch pattern is not valid UTF-8")?;

    let mut inputs: Vec<PathBuf> = glob::glob(pattern_str)
        .context("invalid batch pattern")?
        .filter_map(std::result::Result::ok)
        .collect();
    inputs.sort();

    if inputs.is_empty() {
        println!("No documents match {pattern_str}");
        return Ok(());
    }

    let mut succeeded = 0usize;
    let mut failed = 0usize;
    for input in &inputs {
        println!("\n=== {} ===", input.display());
        match merge_document(input, None, dry_run, false, None, None, markers) {
            Ok(()) => succeeded += 1,
            Err(err) => {
                // Fatal for this document only; the batch continues
                failed += 1;
                tracing::error!(
                    input = %input.display(),
                    error = %format!("{err:#}"),
                    "document failed"
                );
            }
        }
    }

    println!("\nBatch complete: {succeeded} merged, {failed} failed");
    Ok(())
}

fn verify_classification(input: &Path, manifest: &Path, markers: &Markers) -> Result<()> {
    let doc = CombinedDocument::from_file(input, markers)
        .with_context(|| format!("failed to parse {}", input.display()))?;
    let pages = doc.page_store()?;
    let classification = ClassificationResult::from_file(manifest)
        .with_context(|| format!("failed to load manifest: {}", manifest.display()))?;

    println!("Input: {}", input.display());

    let candidates = classification.field_candidates();
    if candidates.is_empty() {
        println!("No search-constrained fields to verify");
    } else {
        println!("\nSearch-constrained fields:");
        for result in verify::verify_all(&candidates, &pages) {
            let status = if result.verified {
                "verified"
            } else {
                "UNVERIFIED"
            };
            println!(
                "  {} (pg {}): {} - {:?}",
                result.field, result.page, status, result.value
            );
        }
    }

    let causes = classification.cause_candidates();
    if causes.is_empty() {
        println!("\nNo causes of action to verify");
        return Ok(());
    }

    let index = ParagraphIndex::build(&pages);
    println!("\nCauses of action:");
    for coa in index.verify_causes(&causes) {
        if coa.verified {
            println!(
                "  COA {} [¶{}-¶{}]: verified",
                coa.number, coa.paragraph_range.start, coa.paragraph_range.end
            );
        } else if coa.paragraph_range.is_applicable() {
            println!(
                "  COA {} [¶{}-¶{}]: missing paragraphs {:?}",
                coa.number,
                coa.paragraph_range.start,
                coa.paragraph_range.end,
                coa.missing_paragraphs
            );
        } else {
            println!("  COA {}: no paragraph range claimed", coa.number);
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}
