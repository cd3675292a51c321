//! Document outline: the fixed structure handed to the core by the upstream
//! parser. Immutable for the lifetime of one evaluation run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One titled section of the document, with its heading level and a location
/// string such as "Section 2.1".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSection {
    pub title: String,
    /// Heading level, 1–4.
    pub level: u8,
    pub content: String,
    pub location: String,
}

/// Parsed document structure produced by the external document source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentOutline {
    pub filename: String,
    pub word_count: usize,
    pub sections: Vec<DocumentSection>,
    pub tables_count: usize,
    pub has_toc: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl DocumentOutline {
    /// Section titles in document order.
    pub fn headings(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.title.as_str()).collect()
    }

    /// Body text of all sections joined by newlines.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        for s in &self.sections {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&s.content);
        }
        out
    }
}

/// A located piece of lexical evidence: where a required keyword was found,
/// with a fixed-width context window around the first occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRef {
    pub location: String,
    pub snippet: String,
    pub keyword: String,
}

/// Context window, in characters, on each side of a matched keyword.
const SNIPPET_WINDOW: usize = 50;

/// Locate the first case-insensitive occurrence of each keyword per section.
/// A keyword can contribute one `EvidenceRef` per section it appears in.
pub fn search_evidence(outline: &DocumentOutline, keywords: &[String]) -> Vec<EvidenceRef> {
    let mut evidence = Vec::new();

    for section in &outline.sections {
        let content_lower = section.content.to_lowercase();
        for keyword in keywords {
            let kw = keyword.to_lowercase();
            if kw.is_empty() {
                continue;
            }
            if let Some(idx) = content_lower.find(&kw) {
                evidence.push(EvidenceRef {
                    location: section.location.clone(),
                    snippet: format!("...{}...", snippet_around(&section.content, idx, kw.len())),
                    keyword: keyword.clone(),
                });
            }
        }
    }

    evidence
}

/// Cut a window of `SNIPPET_WINDOW` chars on each side of `[idx, idx+len)`,
/// snapping to char boundaries so multi-byte text never panics.
fn snippet_around(content: &str, idx: usize, len: usize) -> String {
    let start = floor_char_boundary(content, idx.saturating_sub(SNIPPET_WINDOW));
    let end = ceil_char_boundary(content, (idx + len + SNIPPET_WINDOW).min(content.len()));
    content[start..end].trim().to_string()
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(s: &str, mut i: usize) -> usize {
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}
