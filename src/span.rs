//! Span data model shared by detectors and the redaction pipeline

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Redaction category of a detected span
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Personal names
    Name,
    /// Dates and times
    Date,
    /// Phone numbers and other important numbers
    Phone,
    /// Addresses, organizations, facilities and countries
    Address,
    /// Sentence-level concept redaction
    Concept,
}

impl Category {
    /// Entity categories in report order.
    pub const REPORTED: [Category; 4] = [
        Category::Name,
        Category::Address,
        Category::Date,
        Category::Phone,
    ];

    /// Label used in the statistics report.
    pub fn report_label(&self) -> &'static str {
        match self {
            Self::Name => "Names",
            Self::Address => "Address and Country",
            Self::Date => "Date",
            Self::Phone => "Phone Numbers or Important Numbers",
            Self::Concept => "Concepts",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "NAME"),
            Self::Date => write!(f, "DATE"),
            Self::Phone => write!(f, "PHONE"),
            Self::Address => write!(f, "ADDRESS"),
            Self::Concept => write!(f, "CONCEPT"),
        }
    }
}

/// Which detector produced a span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Label-anchored header rules ("From: ...")
    FieldAnchor,
    /// Statistical named-entity model
    StatisticalNer,
    /// Transformer token classifier
    TransformerNer,
    /// Generic regex patterns
    Regex,
    /// Concept terms and their synonyms
    Lexical,
}

impl Source {
    /// Tie-break priority used by the conflict resolver (higher wins).
    pub fn priority(&self) -> u8 {
        match self {
            Self::FieldAnchor => 3,
            Self::StatisticalNer => 2,
            Self::TransformerNer => 1,
            Self::Regex | Self::Lexical => 0,
        }
    }
}

/// Replacement framing for a field-anchored span.
///
/// Only `value` is destroyed; the span is rewritten to
/// `prefix + glyph * chars(value) + suffix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRewrite {
    /// Literal text kept before the censored value (e.g. `"From: "`)
    pub prefix: String,
    /// Literal text kept after the censored value (e.g. `">"`)
    pub suffix: String,
    /// Byte range of the sensitive value inside the snapshot
    pub value: Range<usize>,
}

/// A normalized detection result.
///
/// Offsets are byte offsets into the snapshot the span was detected in and
/// always fall on `char` boundaries once validated with [`Span::checked`].
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Redaction category
    pub category: Category,
    /// Producing detector
    pub source: Source,
    /// Detector score; `None` is treated as 1.0
    pub confidence: Option<f64>,
    /// Field-anchored framing, if any
    pub rewrite: Option<FieldRewrite>,
}

impl Span {
    pub fn new(start: usize, end: usize, category: Category, source: Source) -> Self {
        Self {
            start,
            end,
            category,
            source,
            confidence: None,
            rewrite: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_rewrite(mut self, rewrite: FieldRewrite) -> Self {
        self.rewrite = Some(rewrite);
        self
    }

    /// Validate offsets against the snapshot the span was detected in.
    pub fn checked(self, text: &str) -> Result<Self> {
        let in_range = |r: &Range<usize>| {
            r.start < r.end
                && r.end <= text.len()
                && text.is_char_boundary(r.start)
                && text.is_char_boundary(r.end)
        };

        let whole = self.start..self.end;
        let value_ok = match &self.rewrite {
            Some(rw) => in_range(&rw.value) && rw.value.start >= self.start && rw.value.end <= self.end,
            None => true,
        };

        if in_range(&whole) && value_ok {
            Ok(self)
        } else {
            Err(Error::InvalidSpan {
                start: self.start,
                end: self.end,
                len: text.len(),
            })
        }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Effective confidence (unscored spans count as certain).
    pub fn score(&self) -> f64 {
        self.confidence.unwrap_or(1.0)
    }

    /// Whether two spans share at least one byte.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Byte range whose content gets replaced by glyphs.
    pub fn censored_range(&self) -> Range<usize> {
        match &self.rewrite {
            Some(rw) => rw.value.clone(),
            None => self.start..self.end,
        }
    }

    /// The covered text in `text`.
    pub fn text<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Raw output record of a statistical entity detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntity {
    /// Detector label (e.g. `PERSON`, `GPE`)
    pub label: String,
    pub start: usize,
    pub end: usize,
}

impl RawEntity {
    pub fn new(label: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }
}

/// Raw output record of a transformer token classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntity {
    /// IOB label (e.g. `I-PER`)
    #[serde(alias = "entity")]
    pub label: String,
    pub start: usize,
    pub end: usize,
    pub score: f64,
}

impl ScoredEntity {
    pub fn new(label: impl Into<String>, start: usize, end: usize, score: f64) -> Self {
        Self {
            label: label.into(),
            start,
            end,
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_accepts_valid_span() {
        let span = Span::new(0, 4, Category::Name, Source::Regex);
        assert!(span.checked("John Doe").is_ok());
    }

    #[test]
    fn test_checked_rejects_out_of_range() {
        let span = Span::new(2, 40, Category::Name, Source::Regex);
        assert!(matches!(span.checked("short"), Err(Error::InvalidSpan { .. })));
    }

    #[test]
    fn test_checked_rejects_empty_and_inverted() {
        assert!(Span::new(3, 3, Category::Date, Source::Regex).checked("abcdef").is_err());
        assert!(Span::new(4, 2, Category::Date, Source::Regex).checked("abcdef").is_err());
    }

    #[test]
    fn test_checked_rejects_mid_char_offsets() {
        // "é" is two bytes; offset 1 splits it
        let span = Span::new(1, 3, Category::Name, Source::Regex);
        assert!(span.checked("éab").is_err());
    }

    #[test]
    fn test_checked_rejects_value_outside_span() {
        let span = Span::new(0, 5, Category::Name, Source::FieldAnchor).with_rewrite(FieldRewrite {
            prefix: "To: ".into(),
            suffix: String::new(),
            value: 3..9,
        });
        assert!(span.checked("To: bob@x.org").is_err());
    }

    #[test]
    fn test_overlaps() {
        let a = Span::new(0, 5, Category::Name, Source::Regex);
        let b = Span::new(4, 8, Category::Name, Source::Regex);
        let c = Span::new(5, 8, Category::Name, Source::Regex);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_score_defaults_to_one() {
        let span = Span::new(0, 1, Category::Phone, Source::Regex);
        assert_eq!(span.score(), 1.0);
        assert_eq!(span.with_confidence(0.7).score(), 0.7);
    }

    #[test]
    fn test_source_priority_order() {
        assert!(Source::FieldAnchor.priority() > Source::StatisticalNer.priority());
        assert!(Source::StatisticalNer.priority() > Source::TransformerNer.priority());
        assert!(Source::TransformerNer.priority() > Source::Regex.priority());
    }

    #[test]
    fn test_scored_entity_accepts_entity_key() {
        let json = r#"{"entity":"I-PER","start":0,"end":4,"score":0.98}"#;
        let ent: ScoredEntity = serde_json::from_str(json).unwrap();
        assert_eq!(ent.label, "I-PER");
        assert_eq!(ent.end, 4);
    }
}
