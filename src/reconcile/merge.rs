//! Multi-source footnote merge.
//!
//! Runs once per document, pages in ascending order. The location
//! inventory (when present) decides which footnotes belong to which page;
//! the text extraction always decides what they say. Claims are corrected
//! against the marker survey before placement. Missing data of any kind
//! degrades to a recorded diagnostic: content is never fabricated and
//! numbering anomalies are reported, never repaired.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::config::Markers;
use crate::domain::{
    InventorySource, LocationRecord, MergeStats, PageReport, ReconciledFootnote,
};
use crate::ingest::CombinedDocument;

use super::scan::{self, MarkerSurvey, TextMap};

/// Everything the merge produces for one document
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Rewritten document: annotations substituted, text blocks removed
    pub document: CombinedDocument,

    /// Resolved footnotes, pages ascending then numbers ascending
    pub footnotes: Vec<ReconciledFootnote>,

    pub stats: MergeStats,
}

/// A footnote's final page assignment, after attribution correction
#[derive(Debug, Clone, Copy)]
struct Placement {
    number: u32,
    page: u32,
    correction_applied: bool,
    original_page: Option<u32>,
}

/// Footnote reconciler. Holds only the marker configuration; both ground
/// truth stores are rebuilt per document.
pub struct Reconciler<'a> {
    markers: &'a Markers,
}

impl<'a> Reconciler<'a> {
    pub fn new(markers: &'a Markers) -> Self {
        Self { markers }
    }

    /// Merge one document.
    ///
    /// With an inventory, placement follows the corrected location claims
    /// and text comes from the extraction map. Without one, each text
    /// block's own page is its placement.
    pub fn reconcile(
        &self,
        doc: &CombinedDocument,
        inventory: Option<&[LocationRecord]>,
    ) -> MergeOutcome {
        let survey = scan::survey_markers(doc, self.markers);
        let texts = scan::extract_texts(doc, self.markers);

        let source = if inventory.is_some() {
            InventorySource::HintsAndScan
        } else {
            InventorySource::ScanOnly
        };
        let placements = match inventory {
            Some(records) => records
                .iter()
                .map(|record| correct_placement(record, &survey))
                .collect(),
            None => self.scan_placements(doc),
        };
        debug!(
            source = ?source,
            placements = placements.len(),
            texts = texts.len(),
            "reconciling footnotes"
        );

        let mut by_page: BTreeMap<u32, Vec<Placement>> = BTreeMap::new();
        let mut placed_numbers: BTreeSet<u32> = BTreeSet::new();
        let known_pages: BTreeSet<u32> = doc.blocks.iter().map(|b| b.number).collect();
        for placement in &placements {
            if !known_pages.contains(&placement.page) {
                warn!(
                    number = placement.number,
                    page = placement.page,
                    "location claim targets a page not present in the document"
                );
                continue;
            }
            placed_numbers.insert(placement.number);
            by_page.entry(placement.page).or_default().push(*placement);
        }

        // Inline substitution applies wherever a placed footnote is cited,
        // even when the citation and the text block sit on different pages
        let substitutions: BTreeMap<u32, String> = placed_numbers
            .iter()
            .filter_map(|n| texts.get(n).map(|e| (*n, e.text.clone())))
            .collect();

        let mut document = doc.clone();
        let mut footnotes = Vec::new();
        let mut reports = Vec::new();

        for block in &mut document.blocks {
            // A placed footnote's block is deleted wherever it sits, even
            // when correction moved the footnote to another page
            block.lines = remove_text_blocks(&block.lines, &placed_numbers, self.markers);

            if let Some(page_placements) = by_page.get_mut(&block.number) {
                page_placements.sort_by_key(|p| p.number);

                let numbers: BTreeSet<u32> =
                    page_placements.iter().map(|p| p.number).collect();
                reports.push(page_report(block.number, &numbers, &survey, &texts));
                for placement in page_placements.iter() {
                    footnotes.push(ReconciledFootnote {
                        number: placement.number,
                        page: placement.page,
                        text: texts.get(&placement.number).map(|e| e.text.clone()),
                        correction_applied: placement.correction_applied,
                        original_page: placement.original_page,
                    });
                }
            }

            block.lines = substitute_refs(&block.lines, &substitutions, self.markers);
        }

        let (gaps, duplicates) = validate_sequence(&footnotes);
        let stats = MergeStats {
            source,
            pages_with_footnotes: reports.len(),
            found: reports.iter().map(|r| r.found.len()).sum(),
            merged: reports.iter().map(|r| r.merged.len()).sum(),
            unmatched: reports.iter().map(|r| r.unmatched.len()).sum(),
            no_text: reports.iter().map(|r| r.no_text.len()).sum(),
            gaps,
            duplicates,
            pages: reports,
        };

        MergeOutcome {
            document,
            footnotes,
            stats,
        }
    }

    /// Fallback placements: every text block belongs to the page it was
    /// printed on. A block duplicated across pages yields one placement
    /// per hosting page, and the sequence check reports the duplicate.
    fn scan_placements(&self, doc: &CombinedDocument) -> Vec<Placement> {
        let mut placements = Vec::new();
        for block in &doc.blocks {
            for number in scan::block_numbers_on_page(block, self.markers) {
                placements.push(Placement {
                    number,
                    page: block.number,
                    correction_applied: false,
                    original_page: None,
                });
            }
        }
        placements
    }
}

/// Apply attribution correction to one location claim.
///
/// A claimed page absent from the number's citation sites is replaced by
/// the earliest actual citation page; the original claim is retained for
/// audit. With no citation sites at all there is nothing to correct
/// against and the claim stands.
fn correct_placement(record: &LocationRecord, survey: &MarkerSurvey) -> Placement {
    if let Some(cited) = survey.get(&record.number) {
        if !cited.contains(&record.page) {
            if let Some(&earliest) = cited.iter().next() {
                warn!(
                    number = record.number,
                    claimed = record.page,
                    corrected = earliest,
                    "footnote page claim contradicts citation sites"
                );
                return Placement {
                    number: record.number,
                    page: earliest,
                    correction_applied: true,
                    original_page: Some(record.page),
                };
            }
        }
    }
    Placement {
        number: record.number,
        page: record.page,
        correction_applied: false,
        original_page: None,
    }
}

fn page_report(
    page: u32,
    numbers: &BTreeSet<u32>,
    survey: &MarkerSurvey,
    texts: &TextMap,
) -> PageReport {
    let mut report = PageReport {
        page,
        found: numbers.iter().copied().collect(),
        merged: Vec::new(),
        unmatched: Vec::new(),
        no_text: Vec::new(),
    };
    for &number in numbers {
        if !texts.contains_key(&number) {
            report.no_text.push(number);
        } else if survey.contains_key(&number) {
            report.merged.push(number);
        } else {
            report.unmatched.push(number);
        }
    }
    report
}

/// Delete the text-block lines for the given numbers, plus at most one
/// immediately adjacent blank line per removed run: the trailing blank
/// when there is one, otherwise the leading blank. A blank that also
/// separates unrelated content survives.
fn remove_text_blocks(lines: &[String], numbers: &BTreeSet<u32>, markers: &Markers) -> Vec<String> {
    let mut removed = vec![false; lines.len()];
    let mut any = false;
    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = markers.block.captures(line) {
            if let Some(number) = scan::footnote_number(&caps) {
                if numbers.contains(&number) {
                    removed[i] = true;
                    any = true;
                }
            }
        }
    }
    if !any {
        return lines.to_vec();
    }

    let is_blank = |i: usize| lines[i].trim().is_empty();
    let mut i = 0;
    while i < lines.len() {
        if !removed[i] {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i;
        while end + 1 < lines.len() && removed[end + 1] {
            end += 1;
        }
        if end + 1 < lines.len() && is_blank(end + 1) {
            removed[end + 1] = true;
            end += 1;
        } else if start > 0 && is_blank(start - 1) && !removed[start - 1] {
            removed[start - 1] = true;
        }
        i = end + 1;
    }

    lines
        .iter()
        .zip(removed)
        .filter(|(_, gone)| !gone)
        .map(|(line, _)| line.clone())
        .collect()
}

/// Replace inline reference markers with annotations wherever resolved
/// text exists. Markers with no resolved text are left untouched, and
/// text-block lines are never rewritten.
fn substitute_refs(
    lines: &[String],
    substitutions: &BTreeMap<u32, String>,
    markers: &Markers,
) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            if markers.block.is_match(line) || !markers.inline.is_match(line) {
                return line.clone();
            }
            markers
                .inline
                .replace_all(line, |caps: &regex::Captures| {
                    match scan::footnote_number(caps).and_then(|n| {
                        substitutions.get(&n).map(|text| (n, text))
                    }) {
                        Some((number, text)) => markers.render_annotation(number, text),
                        None => caps[0].to_string(),
                    }
                })
                .into_owned()
        })
        .collect()
}

/// Walk the resolved numbers in ascending order, reporting every skipped
/// integer as a gap and every number resolved more than once as a single
/// duplicate entry.
fn validate_sequence(footnotes: &[ReconciledFootnote]) -> (Vec<u32>, Vec<u32>) {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for footnote in footnotes {
        *counts.entry(footnote.number).or_insert(0) += 1;
    }

    let duplicates: Vec<u32> = counts
        .iter()
        .filter(|(_, &count)| count > 1)
        .map(|(&number, _)| number)
        .collect();

    let mut gaps = Vec::new();
    if let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().last()) {
        for number in first..=last {
            if !counts.contains_key(&number) {
                gaps.push(number);
            }
        }
    }

    for &number in &gaps {
        warn!(number, "footnote numbering gap");
    }
    for &number in &duplicates {
        warn!(number, "footnote resolved more than once");
    }
    (gaps, duplicates)
}
