//! Feature extraction: a normalized, read-only view over a `DocumentOutline`
//! used by the signal scorer and the pattern registry. Pure and total — no
//! failure modes, recomputed per classification call.

use std::collections::BTreeSet;

use crate::outline::DocumentOutline;

/// Normalized feature bag for one classification call.
#[derive(Debug, Clone)]
pub struct FeatureBag {
    /// Lower-cased filename, as given.
    pub filename: String,
    /// Distinct lower-cased alphanumeric tokens of the filename.
    pub filename_tokens: BTreeSet<String>,
    /// Lower-cased section titles, in document order.
    pub headings: Vec<String>,
    /// All headings joined by a single space, lower-cased.
    pub headings_text: String,
    /// Lower-cased body text of all sections.
    pub full_text: String,
    pub word_count: usize,
    pub tables_count: usize,
}

impl FeatureBag {
    pub fn from_outline(outline: &DocumentOutline) -> Self {
        let headings: Vec<String> = outline
            .sections
            .iter()
            .map(|s| s.title.to_lowercase())
            .collect();
        let headings_text = headings.join(" ");
        let full_text = outline.full_text().to_lowercase();

        Self {
            filename: outline.filename.to_lowercase(),
            filename_tokens: tokenize(&outline.filename),
            headings,
            headings_text,
            full_text,
            word_count: outline.word_count,
            tables_count: outline.tables_count,
        }
    }

    /// Non-overlapping occurrence count of `needle` in the body text.
    pub fn count_in_text(&self, needle: &str) -> usize {
        if needle.is_empty() {
            return 0;
        }
        self.full_text.matches(needle).count()
    }
}

/// Alphanumeric tokens, lower-cased and deduplicated. Splits on `_` as well,
/// so `documento_DTC_v1.docx` yields {documento, dtc, v1, docx}.
pub fn tokenize(s: &str) -> BTreeSet<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}
