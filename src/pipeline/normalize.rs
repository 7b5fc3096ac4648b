//! Span normalization
//!
//! Turns native detector output into [`Span`]s the resolver can compare:
//! label mapping, confidence gating, category gating, reserved-word
//! exclusion, offset validation, and dropping of spans that no longer carry
//! anything to censor.

use crate::config::CensorConfig;
use crate::span::{Category, RawEntity, ScoredEntity, Source, Span};

/// Calendar words that NER models routinely tag but are not worth censoring
pub const RESERVED_CALENDAR_TOKENS: &[&str] = &[
    "today",
    "tomorrow",
    "yesterday",
    "day",
    "night",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

const WEEKDAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Whether `word` names a day of the week (case-insensitive)
pub fn is_weekday(word: &str) -> bool {
    WEEKDAYS.contains(&word.trim().to_lowercase().as_str())
}

/// Whether `text` is a reserved calendar token (case-insensitive)
pub fn is_reserved(text: &str) -> bool {
    RESERVED_CALENDAR_TOKENS.contains(&text.trim().to_lowercase().as_str())
}

/// Map a statistical NER label to a category
pub fn statistical_category(label: &str) -> Option<Category> {
    match label.to_ascii_uppercase().as_str() {
        "PERSON" => Some(Category::Name),
        "DATE" | "TIME" => Some(Category::Date),
        "ORG" | "FAC" | "GPE" => Some(Category::Address),
        "CARDINAL" => Some(Category::Phone),
        _ => None,
    }
}

/// Map an IOB transformer label (`B-PER`, `I-LOC`, ...) to a category
pub fn transformer_category(label: &str) -> Option<Category> {
    let label = label.to_ascii_uppercase();
    let bare = label
        .strip_prefix("B-")
        .or_else(|| label.strip_prefix("I-"))
        .unwrap_or(&label);
    match bare {
        "PER" => Some(Category::Name),
        "LOC" => Some(Category::Address),
        _ => None,
    }
}

/// A fragment carries a payload if it still has anything alphanumeric in it.
///
/// Censor glyphs are never alphanumeric, so fully censored fragments fail.
pub fn carries_payload(fragment: &str) -> bool {
    fragment.chars().any(char::is_alphanumeric)
}

/// Normalizer bound to one run configuration
pub struct Normalizer<'a> {
    config: &'a CensorConfig,
}

impl<'a> Normalizer<'a> {
    pub fn new(config: &'a CensorConfig) -> Self {
        Self { config }
    }

    /// Statistical NER entities against the snapshot they were detected in
    pub fn statistical(&self, text: &str, entities: Vec<RawEntity>) -> Vec<Span> {
        entities
            .into_iter()
            .filter_map(|e| {
                let category = statistical_category(&e.label)?;
                self.admit(text, Span::new(e.start, e.end, category, Source::StatisticalNer))
            })
            .collect()
    }

    /// Transformer entities; scores at or below the threshold are dropped
    pub fn transformer(&self, text: &str, entities: Vec<ScoredEntity>) -> Vec<Span> {
        let threshold = self.config.transformer_threshold;
        entities
            .into_iter()
            .filter(|e| e.score > threshold)
            .filter_map(|e| {
                let category = transformer_category(&e.label)?;
                self.admit(
                    text,
                    Span::new(e.start, e.end, category, Source::TransformerNer).with_confidence(e.score),
                )
            })
            .collect()
    }

    /// Spans produced directly by pattern detectors
    pub fn patterns(&self, text: &str, spans: Vec<Span>) -> Vec<Span> {
        spans
            .into_iter()
            .filter_map(|span| self.admit(text, span))
            .collect()
    }

    fn admit(&self, text: &str, span: Span) -> Option<Span> {
        let span = span.checked(text).ok()?;
        if !self.config.enabled(span.category) {
            return None;
        }
        if matches!(span.category, Category::Date | Category::Address) && is_reserved(span.text(text)) {
            return None;
        }
        if !carries_payload(&text[span.censored_range()]) {
            return None;
        }
        Some(span)
    }
}
