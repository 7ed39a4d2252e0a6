//! Marker-syntax configuration.
//!
//! The engine recognizes exactly two footnote marker conventions in page
//! text: an inline reference token and a line-leading text-block token,
//! plus the page-delimiter framing of the combined document. The token
//! syntax is configuration, not semantics: every pattern may be replaced
//! as long as it still captures the number that disambiguates it.
//!
//! Configuration is an explicit immutable value threaded into the engine.
//! There is no global state; the CLI loads a YAML file (or the built-in
//! defaults) and passes the compiled form down.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which text block wins when the same footnote number has a block on
/// more than one page.
///
/// The pipeline's historical behavior is last-wins by document order;
/// first-wins exists for OCR runs that duplicate a page's tail. Both are
/// covered by tests; changing the default is a behavior change, not a
/// cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateTextPolicy {
    /// The textually later page's block overwrites the earlier
    #[default]
    LastWins,
    /// The first block seen in document order is kept
    FirstWins,
}

/// Raw config file schema (matches the YAML structure)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub markers: MarkerSyntax,

    #[serde(default)]
    pub duplicate_text: DuplicateTextPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            markers: MarkerSyntax::default(),
            duplicate_text: DuplicateTextPolicy::default(),
        }
    }
}

/// Marker token patterns, as regex source strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerSyntax {
    /// In-body reference token; group 1 captures the footnote number.
    /// Leading whitespace belongs to the token so substitution can
    /// re-space the annotation.
    pub inline_marker: String,

    /// Line-leading text-block token; group 1 captures the footnote
    /// number, group 2 the block content
    pub text_block: String,

    /// Page-start delimiter line; group 1 captures the page number
    pub page_start: String,

    /// Page-end delimiter line; group 1 captures the page number
    pub page_end: String,

    /// Inline annotation template with `{n}` and `{text}` placeholders
    pub annotation: String,
}

impl Default for MarkerSyntax {
    fn default() -> Self {
        Self {
            inline_marker: r"\s*\$\s*\^\{(\d+)\}\s*\$".to_string(),
            text_block: r"^\s*\$\s*\^\{(\d+)\}\s*\$\s+(.+)$".to_string(),
            page_start: r"^---\[Start PDF page (\d+)\]---\s*$".to_string(),
            page_end: r"^---\[End PDF page (\d+)\]---\s*$".to_string(),
            annotation: " [FN{n}: {text}]".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name} pattern: {source}")]
    InvalidPattern {
        name: &'static str,
        source: regex::Error,
    },

    #[error("{name} pattern must capture {needed} group(s), found {found}")]
    MissingCaptures {
        name: &'static str,
        needed: usize,
        found: usize,
    },

    #[error("annotation template must contain both {{n}} and {{text}}")]
    BadAnnotationTemplate,

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Config {
    /// Load a config from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Compile the marker patterns, validating that each still
    /// disambiguates its number
    pub fn compile(&self) -> Result<Markers, ConfigError> {
        let inline = compile_pattern("inline_marker", &self.markers.inline_marker, 1)?;
        let block = compile_pattern("text_block", &self.markers.text_block, 2)?;
        let page_start = compile_pattern("page_start", &self.markers.page_start, 1)?;
        let page_end = compile_pattern("page_end", &self.markers.page_end, 1)?;

        let annotation = self.markers.annotation.clone();
        if !annotation.contains("{n}") || !annotation.contains("{text}") {
            return Err(ConfigError::BadAnnotationTemplate);
        }

        Ok(Markers {
            inline,
            block,
            page_start,
            page_end,
            annotation,
            duplicate_text: self.duplicate_text,
        })
    }
}

fn compile_pattern(
    name: &'static str,
    pattern: &str,
    needed: usize,
) -> Result<Regex, ConfigError> {
    let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern { name, source })?;
    let found = regex.captures_len() - 1;
    if found < needed {
        return Err(ConfigError::MissingCaptures {
            name,
            needed,
            found,
        });
    }
    Ok(regex)
}

/// Compiled marker configuration, passed into the engine by value
#[derive(Debug, Clone)]
pub struct Markers {
    /// In-body reference token
    pub inline: Regex,

    /// Line-leading text-block token
    pub block: Regex,

    /// Page framing delimiters
    pub page_start: Regex,
    pub page_end: Regex,

    annotation: String,

    pub duplicate_text: DuplicateTextPolicy,
}

impl Markers {
    /// Render the inline annotation for a reconciled footnote
    pub fn render_annotation(&self, number: u32, text: &str) -> String {
        self.annotation
            .replace("{n}", &number.to_string())
            .replace("{text}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_compiles() {
        let markers = Config::default().compile().unwrap();

        let caps = markers.inline.captures("see $ ^{12} $ below").unwrap();
        assert_eq!(&caps[1], "12");

        let caps = markers.block.captures("$ ^{3} $ Footnote body here.").unwrap();
        assert_eq!(&caps[1], "3");
        assert_eq!(&caps[2], "Footnote body here.");

        let caps = markers
            .page_start
            .captures("---[Start PDF page 7]---")
            .unwrap();
        assert_eq!(&caps[1], "7");
    }

    #[test]
    fn test_annotation_rendering() {
        let markers = Config::default().compile().unwrap();
        assert_eq!(
            markers.render_annotation(4, "See Exhibit A."),
            " [FN4: See Exhibit A.]"
        );
    }

    #[test]
    fn test_custom_pattern_must_capture_number() {
        let mut config = Config::default();
        config.markers.inline_marker = r"\[\[fn\]\]".to_string();
        assert!(matches!(
            config.compile(),
            Err(ConfigError::MissingCaptures { .. })
        ));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut config = Config::default();
        config.markers.text_block = "([".to_string();
        assert!(matches!(
            config.compile(),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_annotation_template_is_validated() {
        let mut config = Config::default();
        config.markers.annotation = "[footnote]".to_string();
        assert!(matches!(
            config.compile(),
            Err(ConfigError::BadAnnotationTemplate)
        ));
    }

    #[test]
    fn test_config_round_trips_through_yaml() {
        let config = Config {
            duplicate_text: DuplicateTextPolicy::FirstWins,
            ..Config::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(back.duplicate_text, DuplicateTextPolicy::FirstWins);
        assert_eq!(back.markers.inline_marker, config.markers.inline_marker);
        assert!(back.compile().is_ok());
    }
}
