//! Field Verification Integration Tests
//!
//! Exercises the verification side end to end: classification output in,
//! verbatim-grounded results and paragraph-range checks out.

use veridoc::config::Config;
use veridoc::verify::{verify_all, ParagraphIndex};
use veridoc::{ClassificationResult, CombinedDocument};

const FILING: &str = "\
---[Start PDF page 1]---
JANE ROE, an individual,

          Plaintiff,
     vs.

ACME CORP, a corporation,

          Defendant.

COMPLAINT FOR  DAMAGES AND
INJUNCTIVE RELIEF
---[End PDF page 1]---
---[Start PDF page 2]---
1. Plaintiff is an individual residing in Los Angeles.
2. Defendant is a corporation.
3. Venue is proper in this county.
---[End PDF page 2]---
---[Start PDF page 3]---
FIRST CAUSE OF ACTION
(Negligence)

4. Plaintiff realleges paragraphs 1 through 3.
5. Defendant owed a duty of care.
7. Plaintiff suffered damages.
---[End PDF page 3]---";

const MANIFEST: &str = r#"{
    "caption_info": {
        "document_title": {
            "search_text": "COMPLAINT FOR DAMAGES AND INJUNCTIVE RELIEF",
            "page": 1
        }
    },
    "causes_of_action": [
        {"number": 1, "search_text": "FIRST CAUSE OF ACTION", "page": 3,
         "paragraph_range": {"start": 4, "end": 7}},
        {"number": 2, "search_text": "SECOND CAUSE OF ACTION", "page": 3,
         "paragraph_range": {"start": 0, "end": 0}}
    ]
}"#;

#[test]
fn test_title_verification_returns_verbatim_source() {
    let markers = Config::default().compile().unwrap();
    let doc = CombinedDocument::parse(FILING, &markers).unwrap();
    let pages = doc.page_store().unwrap();
    let classification = ClassificationResult::parse(MANIFEST).unwrap();

    let results = verify_all(&classification.field_candidates(), &pages);

    let title = &results[0];
    assert_eq!(title.field, "document_title");
    assert!(title.verified);
    // The proposal was single-spaced and single-lined; the accepted value
    // is the source text with its double space and line break
    assert_eq!(title.value, "COMPLAINT FOR  DAMAGES AND\nINJUNCTIVE RELIEF");
    assert!(title.source_sha256.is_some());
}

#[test]
fn test_fabricated_title_is_flagged_not_dropped() {
    let markers = Config::default().compile().unwrap();
    let doc = CombinedDocument::parse(FILING, &markers).unwrap();
    let pages = doc.page_store().unwrap();
    let classification = ClassificationResult::parse(MANIFEST).unwrap();

    let results = verify_all(&classification.field_candidates(), &pages);

    // "SECOND CAUSE OF ACTION" appears nowhere in the source
    let coa2 = results
        .iter()
        .find(|r| r.field == "coa_2_title")
        .expect("candidate verified independently");
    assert!(!coa2.verified);
    assert_eq!(coa2.value, "SECOND CAUSE OF ACTION");

    // The failure did not block the real title on the same page
    let coa1 = results.iter().find(|r| r.field == "coa_1_title").unwrap();
    assert!(coa1.verified);
}

#[test]
fn test_title_on_wrong_page_fails() {
    let markers = Config::default().compile().unwrap();
    let doc = CombinedDocument::parse(FILING, &markers).unwrap();
    let pages = doc.page_store().unwrap();

    let candidates = vec![veridoc::SearchCandidate::new(
        "document_title",
        "COMPLAINT FOR DAMAGES",
        2,
    )];
    let results = verify_all(&candidates, &pages);
    assert!(!results[0].verified);
}

#[test]
fn test_paragraph_range_check_finds_the_gap() {
    let markers = Config::default().compile().unwrap();
    let doc = CombinedDocument::parse(FILING, &markers).unwrap();
    let pages = doc.page_store().unwrap();
    let classification = ClassificationResult::parse(MANIFEST).unwrap();

    let index = ParagraphIndex::build(&pages);
    let causes = index.verify_causes(&classification.cause_candidates());

    // Paragraph 6 was never observed
    assert!(!causes[0].verified);
    assert_eq!(causes[0].missing_paragraphs, vec![6]);

    // Sentinel range: unverified, no comparison
    assert!(!causes[1].verified);
    assert!(causes[1].missing_paragraphs.is_empty());
}

#[test]
fn test_pooled_index_spans_pages() {
    let markers = Config::default().compile().unwrap();
    let doc = CombinedDocument::parse(FILING, &markers).unwrap();
    let pages = doc.page_store().unwrap();

    let index = ParagraphIndex::build(&pages);
    assert_eq!(
        index.pooled().iter().copied().collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5, 7]
    );
    assert!(index.on_page(1).is_none());
}
