//! Multi-pass redaction pipeline
//!
//! A [`Redactor`] runs the enabled passes in a fixed order over an owned
//! copy of the document. Each pass detects against the current snapshot,
//! normalizes and resolves its proposals, and rewrites the text before the
//! next pass sees it:
//!
//! ```text
//! FieldAnchors → DatePatterns → StatisticalNer → PhonePatterns → TransformerNer → Concepts
//! ```
//!
//! A pass whose external detector fails is skipped for that document and
//! reported in [`CensorResult::skipped`]; the remaining passes still run.

pub mod apply;
pub mod concept;
pub mod normalize;
pub mod resolve;
pub mod stats;

pub use apply::Applier;
pub use concept::ConceptRedactor;
pub use normalize::Normalizer;
pub use resolve::resolve;
pub use stats::Statistics;

use crate::config::CensorConfig;
use crate::detect::{DatePatterns, Detectors, FieldAnchors, PhonePattern};
use crate::error::{Error, Result};
use crate::span::{Category, Span};
use serde::Serialize;
use std::fmt;

/// One redaction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    FieldAnchors,
    DatePatterns,
    StatisticalNer,
    PhonePatterns,
    TransformerNer,
    Concepts,
}

impl Pass {
    /// Execution order
    pub const ORDER: [Pass; 6] = [
        Pass::FieldAnchors,
        Pass::DatePatterns,
        Pass::StatisticalNer,
        Pass::PhonePatterns,
        Pass::TransformerNer,
        Pass::Concepts,
    ];
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FieldAnchors => "field_anchors",
            Self::DatePatterns => "date_patterns",
            Self::StatisticalNer => "statistical_ner",
            Self::PhonePatterns => "phone_patterns",
            Self::TransformerNer => "transformer_ner",
            Self::Concepts => "concepts",
        };
        f.write_str(name)
    }
}

/// Outcome of redacting one document
#[derive(Debug, Clone, PartialEq)]
pub struct CensorResult {
    /// Redacted text
    pub text: String,
    /// Redaction counts for this document
    pub statistics: Statistics,
    /// Passes skipped because their detector was unavailable
    pub skipped: Vec<Pass>,
}

impl CensorResult {
    /// Whether any pass had to be skipped
    pub fn is_degraded(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Document redactor.
///
/// Holds the run configuration, the shared detectors and the compiled
/// built-in patterns. A `Redactor` is immutable once built and can be
/// shared across threads; every call to [`Redactor::redact`] owns its own
/// statistics and concept cache.
pub struct Redactor {
    config: CensorConfig,
    detectors: Detectors,
    fields: FieldAnchors,
    dates: DatePatterns,
    phone: PhonePattern,
    applier: Applier,
}

impl Redactor {
    /// Validate `config` and compile the built-in patterns
    pub fn new(config: CensorConfig, detectors: Detectors) -> Result<Self> {
        config.validate()?;

        let wants_ner = config.enabled(Category::Name) || config.enabled(Category::Address);
        let has_ner = (config.stages.statistical && detectors.statistical.is_some())
            || (config.stages.transformer && detectors.transformer.is_some());
        if wants_ner && !has_ner {
            tracing::warn!(
                "Names or addresses are enabled but no entity detector is configured; \
                 only header fields will be redacted for them"
            );
        }

        Ok(Self {
            fields: FieldAnchors::new(&config.field_rules)?,
            dates: DatePatterns::new()?,
            phone: PhonePattern::new()?,
            applier: Applier::new(config.glyph),
            config,
            detectors,
        })
    }

    pub fn config(&self) -> &CensorConfig {
        &self.config
    }

    /// Redact one document
    pub fn redact(&self, input: &str) -> CensorResult {
        let mut text = input.to_string();
        let mut statistics = Statistics::new();
        let mut skipped = Vec::new();

        if text.is_empty() || !self.config.any_enabled() {
            return CensorResult {
                text,
                statistics,
                skipped,
            };
        }

        for pass in Pass::ORDER {
            if !self.runs(pass) {
                continue;
            }

            if pass == Pass::Concepts {
                let mut concepts = ConceptRedactor::new(
                    &self.config.concepts,
                    self.detectors.synonyms.as_deref(),
                    self.detectors.sentences.as_ref(),
                    self.detectors.words.as_ref(),
                );
                let redacted = concepts.redact(&mut text, &self.applier, &mut statistics);
                tracing::debug!(pass = %pass, redacted, "Pass complete");
                continue;
            }

            match self.propose(pass, &text) {
                Ok(spans) => {
                    let proposed = spans.len();
                    let accepted = resolve(spans);
                    let redacted = self.applier.apply(&mut text, &accepted, &mut statistics);
                    tracing::debug!(pass = %pass, proposed, redacted, "Pass complete");
                }
                Err(e) => {
                    tracing::warn!(pass = %pass, error = %e, "Skipping pass");
                    skipped.push(pass);
                }
            }
        }

        CensorResult {
            text,
            statistics,
            skipped,
        }
    }

    /// Whether `pass` has anything to do under the current configuration
    fn runs(&self, pass: Pass) -> bool {
        let stages = &self.config.stages;
        let enabled = |c: Category| self.config.enabled(c);
        match pass {
            Pass::FieldAnchors => stages.field_anchors && self.fields.categories().any(enabled),
            Pass::DatePatterns => stages.date_patterns && enabled(Category::Date),
            Pass::StatisticalNer => {
                stages.statistical
                    && self.detectors.statistical.is_some()
                    && Category::REPORTED.into_iter().any(enabled)
            }
            Pass::PhonePatterns => stages.phone_patterns && enabled(Category::Phone),
            Pass::TransformerNer => {
                stages.transformer
                    && self.detectors.transformer.is_some()
                    && (enabled(Category::Name) || enabled(Category::Address))
            }
            Pass::Concepts => enabled(Category::Concept),
        }
    }

    /// Normalized span proposals of one entity pass against `text`
    fn propose(&self, pass: Pass, text: &str) -> Result<Vec<Span>> {
        let normalizer = Normalizer::new(&self.config);
        let unavailable = |reason: String| Error::DetectorUnavailable {
            pass: pass.to_string(),
            reason,
        };

        let spans = match pass {
            Pass::FieldAnchors => normalizer.patterns(text, self.fields.detect(text)),
            Pass::DatePatterns => normalizer.patterns(text, self.dates.detect(text)),
            Pass::PhonePatterns => normalizer.patterns(text, self.phone.detect(text)),
            Pass::StatisticalNer => {
                let Some(detector) = &self.detectors.statistical else {
                    return Ok(Vec::new());
                };
                let entities = detector
                    .detect(text)
                    .map_err(|e| unavailable(format!("{}: {}", detector.name(), e)))?;
                let spans = normalizer.statistical(text, entities);
                self.defer_phone_numbers(text, spans)
            }
            Pass::TransformerNer => {
                let Some(classifier) = &self.detectors.transformer else {
                    return Ok(Vec::new());
                };
                let entities = classifier
                    .classify(text)
                    .map_err(|e| unavailable(format!("{}: {}", classifier.name(), e)))?;
                normalizer.transformer(text, entities)
            }
            Pass::Concepts => Vec::new(),
        };
        Ok(spans)
    }

    /// Drop statistical number spans that overlap a phone number the phone
    /// pass will redact as a whole.
    fn defer_phone_numbers(&self, text: &str, spans: Vec<Span>) -> Vec<Span> {
        if !self.runs(Pass::PhonePatterns) {
            return spans;
        }
        let phones = self.phone.ranges(text);
        if phones.is_empty() {
            return spans;
        }
        spans
            .into_iter()
            .filter(|span| {
                span.category != Category::Phone
                    || !phones.iter().any(|r| span.start < r.end && r.start < span.end)
            })
            .collect()
    }
}
