//! Combined-document parsing and reassembly.
//!
//! A combined document is an optional preamble followed by framed page
//! blocks: a start delimiter line, the page's text lines, an end delimiter
//! line. Delimiter lines and any content outside the frames are preserved
//! verbatim so an untouched document round-trips byte for byte.

use crate::config::Markers;
use crate::domain::{Page, PageStore};

use super::StructureError;

/// One framed page: delimiters kept verbatim, body kept as lines
#[derive(Debug, Clone)]
pub struct PageBlock {
    pub number: u32,
    pub start_delim: String,
    pub lines: Vec<String>,
    pub end_delim: String,

    /// Lines between this page's end delimiter and the next start
    /// delimiter (or end of file). Outside the frame, never rewritten.
    pub trailing: Vec<String>,
}

impl PageBlock {
    /// The page body as a single string
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// A parsed combined document
#[derive(Debug, Clone)]
pub struct CombinedDocument {
    /// Lines before the first page delimiter
    pub preamble: Vec<String>,

    /// Page blocks, ascending by page number
    pub blocks: Vec<PageBlock>,
}

fn capture_number(text: &str) -> Result<u32, StructureError> {
    text.parse()
        .map_err(|_| StructureError::InvalidPageNumber {
            raw: text.to_string(),
        })
}

impl CombinedDocument {
    /// Parse page-delimited content.
    ///
    /// Unbalanced or mismatched delimiters and non-increasing page numbers
    /// are structural errors, fatal for this document.
    pub fn parse(content: &str, markers: &Markers) -> Result<Self, StructureError> {
        let mut preamble = Vec::new();
        let mut blocks: Vec<PageBlock> = Vec::new();
        let mut open: Option<PageBlock> = None;

        for (idx, line) in content.split('\n').enumerate() {
            if let Some(caps) = markers.page_start.captures(line) {
                if let Some(block) = open.take() {
                    return Err(StructureError::UnclosedPage { page: block.number });
                }
                let number = capture_number(&caps[1])?;
                if number == 0 {
                    return Err(StructureError::InvalidPageNumber {
                        raw: caps[1].to_string(),
                    });
                }
                if let Some(prev) = blocks.last() {
                    if number <= prev.number {
                        return Err(StructureError::PageOrder {
                            prev: prev.number,
                            next: number,
                        });
                    }
                }
                open = Some(PageBlock {
                    number,
                    start_delim: line.to_string(),
                    lines: Vec::new(),
                    end_delim: String::new(),
                    trailing: Vec::new(),
                });
            } else if let Some(caps) = markers.page_end.captures(line) {
                match open.take() {
                    Some(mut block) => {
                        let number = capture_number(&caps[1])?;
                        if number != block.number {
                            return Err(StructureError::DelimiterMismatch {
                                start: block.number,
                                end: number,
                            });
                        }
                        block.end_delim = line.to_string();
                        blocks.push(block);
                    }
                    None => return Err(StructureError::UnexpectedEnd { line: idx + 1 }),
                }
            } else if let Some(block) = open.as_mut() {
                block.lines.push(line.to_string());
            } else if let Some(closed) = blocks.last_mut() {
                closed.trailing.push(line.to_string());
            } else {
                preamble.push(line.to_string());
            }
        }

        if let Some(block) = open {
            return Err(StructureError::UnclosedPage { page: block.number });
        }

        Ok(Self { preamble, blocks })
    }

    /// Read and parse a combined document from disk
    pub fn from_file(path: &std::path::Path, markers: &Markers) -> Result<Self, StructureError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, markers)
    }

    /// Reassemble the document text with its delimiter framing
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if !self.preamble.is_empty() {
            parts.push(self.preamble.join("\n"));
        }
        for block in &self.blocks {
            parts.push(block.start_delim.clone());
            parts.push(block.text());
            parts.push(block.end_delim.clone());
            if !block.trailing.is_empty() {
                parts.push(block.trailing.join("\n"));
            }
        }
        parts.join("\n")
    }

    /// Materialize the page store consumed by the verification side
    pub fn page_store(&self) -> Result<PageStore, StructureError> {
        PageStore::new(
            self.blocks
                .iter()
                .map(|b| Page::new(b.number, b.text()))
                .collect(),
        )
    }
}
