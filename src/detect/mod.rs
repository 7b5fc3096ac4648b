//! Detector interfaces and adapters
//!
//! The pipeline consumes detectors through narrow traits so that real
//! models, remote services, lexicon files or test doubles can be swapped
//! freely:
//! - [`EntityDetector`]: statistical NER, `(label, start, end)`
//! - [`TokenClassifier`]: transformer NER, `(label, start, end, score)`
//! - [`SynonymSource`]: lexical expansion of concept terms
//! - [`SentenceTokenizer`] / [`WordTokenizer`]: text segmentation
//!
//! All offsets crossing these traits are byte offsets into the text that
//! was passed in. Adapters talking to services that count characters
//! convert at the boundary (see [`text::CharIndex`]).

pub mod lexicon;
pub mod patterns;
pub mod remote;
pub mod text;

pub use lexicon::{Gazetteer, Thesaurus};
pub use patterns::{DatePatterns, FieldAnchors, PhonePattern};
pub use remote::{HttpEntityDetector, HttpSynonymSource, HttpTokenClassifier};
pub use text::{AlphanumericWordTokenizer, CharIndex, RuleSentenceTokenizer};

use crate::config::{DetectorBackend, DetectorsConfig};
use crate::error::{Error, Result};
use crate::span::{RawEntity, ScoredEntity};
use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

/// Failure of an external detector call
#[derive(Debug, Clone, thiserror::Error)]
pub enum DetectorError {
    /// Transport failure or timeout
    #[error("request failed: {0}")]
    Request(String),
    /// The detector answered with something unusable
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The detector is not able to serve requests
    #[error("unavailable: {0}")]
    Unavailable(String),
}

/// Result type for detector calls
pub type DetectorResult<T> = std::result::Result<T, DetectorError>;

/// Statistical named-entity detector.
pub trait EntityDetector: Send + Sync {
    /// Detect entities in `text`.
    fn detect(&self, text: &str) -> DetectorResult<Vec<RawEntity>>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}

/// Transformer token classifier producing scored entities.
pub trait TokenClassifier: Send + Sync {
    /// Classify tokens in `text`.
    fn classify(&self, text: &str) -> DetectorResult<Vec<ScoredEntity>>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}

/// Lexical synonym service.
pub trait SynonymSource: Send + Sync {
    /// Surface forms related to `term`. Unknown terms yield an empty set.
    fn synonyms(&self, term: &str) -> DetectorResult<HashSet<String>>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}

/// Splits text into ordered, non-overlapping sentence ranges.
pub trait SentenceTokenizer: Send + Sync {
    fn sentences(&self, text: &str) -> Vec<Range<usize>>;
}

/// Splits a sentence into lowercase words.
pub trait WordTokenizer: Send + Sync {
    /// Words in order of appearance.
    fn tokens(&self, sentence: &str) -> Vec<String>;

    /// Distinct words.
    fn words(&self, sentence: &str) -> HashSet<String> {
        self.tokens(sentence).into_iter().collect()
    }
}

/// The external collaborators a redactor runs with.
///
/// A missing entity detector disables its pass; a missing synonym source
/// reduces concept matching to the exact terms.
#[derive(Clone)]
pub struct Detectors {
    pub statistical: Option<Arc<dyn EntityDetector>>,
    pub transformer: Option<Arc<dyn TokenClassifier>>,
    pub synonyms: Option<Arc<dyn SynonymSource>>,
    pub sentences: Arc<dyn SentenceTokenizer>,
    pub words: Arc<dyn WordTokenizer>,
}

impl Default for Detectors {
    fn default() -> Self {
        Self {
            statistical: None,
            transformer: None,
            synonyms: None,
            sentences: Arc::new(RuleSentenceTokenizer::default()),
            words: Arc::new(AlphanumericWordTokenizer),
        }
    }
}

impl Detectors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statistical(mut self, detector: impl EntityDetector + 'static) -> Self {
        self.statistical = Some(Arc::new(detector));
        self
    }

    pub fn with_transformer(mut self, classifier: impl TokenClassifier + 'static) -> Self {
        self.transformer = Some(Arc::new(classifier));
        self
    }

    pub fn with_synonyms(mut self, source: impl SynonymSource + 'static) -> Self {
        self.synonyms = Some(Arc::new(source));
        self
    }

    pub fn with_sentence_tokenizer(mut self, tokenizer: impl SentenceTokenizer + 'static) -> Self {
        self.sentences = Arc::new(tokenizer);
        self
    }

    pub fn with_word_tokenizer(mut self, tokenizer: impl WordTokenizer + 'static) -> Self {
        self.words = Arc::new(tokenizer);
        self
    }

    /// Build the configured adapters.
    pub fn from_config(config: &DetectorsConfig) -> Result<Self> {
        let mut detectors = Self::default();
        if let Some(backend) = &config.statistical {
            detectors.statistical = Some(entity_detector(backend)?);
        }
        if let Some(backend) = &config.transformer {
            detectors.transformer = Some(token_classifier(backend)?);
        }
        if let Some(backend) = &config.synonyms {
            detectors.synonyms = Some(synonym_source(backend)?);
        }
        Ok(detectors)
    }
}

fn entity_detector(backend: &DetectorBackend) -> Result<Arc<dyn EntityDetector>> {
    let detector: Arc<dyn EntityDetector> = match backend {
        DetectorBackend::Http {
            endpoint,
            timeout_secs,
        } => Arc::new(HttpEntityDetector::new(
            endpoint,
            Duration::from_secs(*timeout_secs),
        )?),
        DetectorBackend::Lexicon { path } => Arc::new(Gazetteer::from_path(path)?),
    };
    Ok(detector)
}

fn token_classifier(backend: &DetectorBackend) -> Result<Arc<dyn TokenClassifier>> {
    match backend {
        DetectorBackend::Http {
            endpoint,
            timeout_secs,
        } => {
            let classifier: Arc<dyn TokenClassifier> = Arc::new(HttpTokenClassifier::new(
                endpoint,
                Duration::from_secs(*timeout_secs),
            )?);
            Ok(classifier)
        }
        DetectorBackend::Lexicon { .. } => Err(Error::Config(
            "transformer detector only supports the http backend".to_string(),
        )),
    }
}

fn synonym_source(backend: &DetectorBackend) -> Result<Arc<dyn SynonymSource>> {
    let source: Arc<dyn SynonymSource> = match backend {
        DetectorBackend::Http {
            endpoint,
            timeout_secs,
        } => Arc::new(HttpSynonymSource::new(
            endpoint,
            Duration::from_secs(*timeout_secs),
        )?),
        DetectorBackend::Lexicon { path } => Arc::new(Thesaurus::from_path(path)?),
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_detectors_have_tokenizers_only() {
        let detectors = Detectors::default();
        assert!(detectors.statistical.is_none());
        assert!(detectors.transformer.is_none());
        assert!(detectors.synonyms.is_none());
        assert_eq!(detectors.sentences.sentences("One. Two.").len(), 2);
    }

    #[test]
    fn test_from_config_lexicon_backends() {
        let dir = tempfile::tempdir().unwrap();
        let lexicon = dir.path().join("lexicon.toml");
        let thesaurus = dir.path().join("thesaurus.toml");
        std::fs::write(&lexicon, "PERSON = [\"John Doe\"]\n").unwrap();
        std::fs::write(&thesaurus, "cancer = [\"malignancy\"]\n").unwrap();

        let config = DetectorsConfig {
            statistical: Some(DetectorBackend::Lexicon { path: lexicon }),
            transformer: None,
            synonyms: Some(DetectorBackend::Lexicon { path: thesaurus }),
        };
        let detectors = Detectors::from_config(&config).unwrap();
        let found = detectors
            .statistical
            .as_ref()
            .unwrap()
            .detect("Ask John Doe.")
            .unwrap();
        assert_eq!(found, vec![RawEntity::new("PERSON", 4, 12)]);
        assert!(detectors
            .synonyms
            .as_ref()
            .unwrap()
            .synonyms("cancer")
            .unwrap()
            .contains("malignancy"));
    }

    #[test]
    fn test_from_config_rejects_lexicon_transformer() {
        let config = DetectorsConfig {
            statistical: None,
            transformer: Some(DetectorBackend::Lexicon {
                path: PathBuf::from("x.toml"),
            }),
            synonyms: None,
        };
        assert!(matches!(
            Detectors::from_config(&config),
            Err(Error::Config(_))
        ));
    }
}
