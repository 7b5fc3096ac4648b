//! Built-in regex detectors
//!
//! Three pattern families run as their own pipeline passes:
//! - [`FieldAnchors`]: label-anchored header values (`From: a@b.org`)
//! - [`DatePatterns`]: structural date formats (`01/01/1994`, `Dec 12, 2005`)
//! - [`PhonePattern`]: phone numbers with optional country prefix
//!
//! None of the patterns can match a non-alphanumeric censor glyph, so
//! running them over already-censored text yields nothing new.

use crate::config::FieldRule;
use crate::error::{Error, Result};
use crate::span::{Category, FieldRewrite, Source, Span};
use regex::Regex;
use std::ops::Range;

const MONTH: &str = r"(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|June?|July?|Aug(?:ust)?|Sep(?:t(?:ember)?)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)";

const WEEKDAY: &str = r"(?:Mon(?:day)?|Tue(?:sday)?|Wed(?:nesday)?|Thu(?:rsday)?|Fri(?:day)?|Sat(?:urday)?|Sun(?:day)?)";

const DAY_OF_MONTH: &str = r"(?:0?[1-9]|[12][0-9]|3[01])";

/// Date templates; `MONTH`, `WEEKDAY` and `DOM` are substituted before compiling.
const DATE_TEMPLATES: &[&str] = &[
    // MM/DD/YYYY, M-D-YY
    r"\b(?:0?[1-9]|1[0-2])[/-]DOM[/-](?:\d{4}|\d{2})\b",
    // YYYY-MM-DD
    r"\b\d{4}[/-](?:0?[1-9]|1[0-2])[/-]DOM\b",
    // 12th Dec 2005, 12-December-05
    r"\bDOM(?:st|nd|rd|th)?[- ]?MONTH[- ]?\d{2,4}\b",
    // December 12, 2005
    r"\bMONTH\.?\s(?:0?[1-9]|[12][0-9]|3[01])(?:st|nd|rd|th)?,?\s\d{4}\b",
    // Dec 2005
    r"\bMONTH\s\d{4}\b",
    // Mon, 12 Dec 2005
    r"\bWEEKDAY,?\sDOM\sMONTH\s\d{4}\b",
    // 1990s
    r"\b\d{4}s\b",
];

const PHONE: &str = r"(?:\+\d{1,3}[\s.-]?(?:\(\d{3}\)|\d{3})|(?:\b1[\s.-]?)?(?:\(\d{3}\)|\b\d{3}))[\s.-]?\d{3}[\s.-]?\d{4}\b";

fn compile(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::Pattern(format!("Invalid regex pattern for '{}': {}", name, e)))
}

/// Phone number detector
pub struct PhonePattern {
    pattern: Regex,
}

impl PhonePattern {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: compile("phone", PHONE)?,
        })
    }

    /// Byte ranges of every phone number in `text`.
    pub fn ranges(&self, text: &str) -> Vec<Range<usize>> {
        self.pattern
            .find_iter(text)
            .map(|m| m.start()..m.end())
            .collect()
    }

    pub fn detect(&self, text: &str) -> Vec<Span> {
        self.ranges(text)
            .into_iter()
            .map(|r| Span::new(r.start, r.end, Category::Phone, Source::Regex).with_confidence(1.0))
            .collect()
    }
}

/// Structural date detector
pub struct DatePatterns {
    patterns: Vec<Regex>,
}

impl DatePatterns {
    pub fn new() -> Result<Self> {
        let patterns = DATE_TEMPLATES
            .iter()
            .map(|template| {
                let pattern = template
                    .replace("WEEKDAY", WEEKDAY)
                    .replace("MONTH", MONTH)
                    .replace("DOM", DAY_OF_MONTH);
                compile("date", &pattern)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// All matches of all templates; overlaps are left to the resolver.
    pub fn detect(&self, text: &str) -> Vec<Span> {
        self.patterns
            .iter()
            .flat_map(|p| p.find_iter(text))
            .map(|m| Span::new(m.start(), m.end(), Category::Date, Source::Regex).with_confidence(1.0))
            .collect()
    }
}

struct CompiledField {
    prefix: String,
    suffix: String,
    category: Category,
    pattern: Regex,
}

/// Label-anchored header detector
pub struct FieldAnchors {
    fields: Vec<CompiledField>,
}

impl FieldAnchors {
    /// Compile header rules
    pub fn new(rules: &[FieldRule]) -> Result<Self> {
        let fields = rules
            .iter()
            .map(|rule| {
                let pattern = format!(
                    r"\b{}:[ \t]*{}({}){}",
                    regex::escape(&rule.label),
                    regex::escape(&rule.open),
                    rule.pattern,
                    regex::escape(&rule.close)
                );
                Ok(CompiledField {
                    prefix: format!("{}: {}", rule.label, rule.open),
                    suffix: rule.close.clone(),
                    category: rule.category,
                    pattern: compile(&rule.label, &pattern)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { fields })
    }

    /// Categories produced by at least one rule
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.fields.iter().map(|f| f.category)
    }

    /// Header spans whose value is non-empty.
    pub fn detect(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        for field in &self.fields {
            for caps in field.pattern.captures_iter(text) {
                let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                if value.as_str().trim().is_empty() {
                    continue;
                }
                // A CR ending an unframed value belongs to the line break
                let carriage = if field.suffix.is_empty() {
                    value.as_str().len() - value.as_str().trim_end_matches('\r').len()
                } else {
                    0
                };
                spans.push(
                    Span::new(whole.start(), whole.end() - carriage, field.category, Source::FieldAnchor)
                        .with_confidence(1.0)
                        .with_rewrite(FieldRewrite {
                            prefix: field.prefix.clone(),
                            suffix: field.suffix.clone(),
                            value: value.start()..value.end() - carriage,
                        }),
                );
            }
        }
        spans
    }
}
