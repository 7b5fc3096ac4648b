//! Censor configuration management

use crate::error::{Error, Result};
use crate::span::Category;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default censor glyph
pub const DEFAULT_GLYPH: char = '█';

/// Default score a transformer entity must exceed to be redacted
pub const DEFAULT_TRANSFORMER_THRESHOLD: f64 = 0.6;

/// Main Censor configuration (one per run)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CensorConfig {
    /// Single display character used to obliterate redacted content
    pub glyph: char,

    /// Enabled entity categories
    pub categories: CategoryConfig,

    /// Concept terms for sentence-level redaction
    pub concepts: Vec<String>,

    /// Pipeline stage toggles
    pub stages: StageConfig,

    /// Transformer entities must score strictly above this value
    pub transformer_threshold: f64,

    /// Label-anchored header rules
    pub field_rules: Vec<FieldRule>,

    /// External detector backends
    pub detectors: DetectorsConfig,
}

impl Default for CensorConfig {
    fn default() -> Self {
        Self {
            glyph: DEFAULT_GLYPH,
            categories: CategoryConfig::default(),
            concepts: Vec::new(),
            stages: StageConfig::default(),
            transformer_threshold: DEFAULT_TRANSFORMER_THRESHOLD,
            field_rules: default_field_rules(),
            detectors: DetectorsConfig::default(),
        }
    }
}

impl CensorConfig {
    /// Load and validate a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config '{}': {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.glyph.is_alphanumeric() || self.glyph.is_whitespace() {
            return Err(Error::Config(format!(
                "Censor glyph {:?} would collide with document text",
                self.glyph
            )));
        }
        if !(0.0..=1.0).contains(&self.transformer_threshold) {
            return Err(Error::Config(format!(
                "transformer_threshold must be within [0, 1], got {}",
                self.transformer_threshold
            )));
        }
        if let Some(term) = self.concepts.iter().find(|c| c.trim().is_empty()) {
            return Err(Error::Config(format!("Empty concept term {:?}", term)));
        }
        Ok(())
    }

    /// Whether redactions of `category` may happen in this run
    pub fn enabled(&self, category: Category) -> bool {
        match category {
            Category::Name => self.categories.names,
            Category::Date => self.categories.dates,
            Category::Phone => self.categories.phones,
            Category::Address => self.categories.address,
            Category::Concept => self.stages.concepts && !self.concepts.is_empty(),
        }
    }

    /// Whether any redaction at all can happen
    pub fn any_enabled(&self) -> bool {
        Category::REPORTED.iter().any(|c| self.enabled(*c)) || self.enabled(Category::Concept)
    }
}

/// Entity category toggles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    /// Censor personal names
    pub names: bool,
    /// Censor dates
    pub dates: bool,
    /// Censor phone numbers
    pub phones: bool,
    /// Censor addresses, organizations and countries
    pub address: bool,
}

/// Pipeline stage toggles. Disabled stages never run, whatever the categories say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Rewrite label-anchored header fields
    pub field_anchors: bool,
    /// Structural date patterns
    pub date_patterns: bool,
    /// Statistical entity detector
    pub statistical: bool,
    /// Phone number pattern
    pub phone_patterns: bool,
    /// Transformer token classifier
    pub transformer: bool,
    /// Sentence-level concept redaction
    pub concepts: bool,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            field_anchors: true,
            date_patterns: true,
            statistical: true,
            phone_patterns: true,
            transformer: true,
            concepts: true,
        }
    }
}

/// A label-anchored header rule such as `From: <address>`.
///
/// Matches `label:` followed by optional blanks, `open`, the value
/// `pattern`, then `close`. The rewrite keeps `label + ": " + open` and
/// `close`, censoring only the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Header label without the colon
    pub label: String,
    /// Regex for the value
    pub pattern: String,
    /// Category gating and counting this rule
    pub category: Category,
    /// Literal framing before the value
    #[serde(default)]
    pub open: String,
    /// Literal framing after the value
    #[serde(default)]
    pub close: String,
}

impl FieldRule {
    pub fn new(label: &str, pattern: &str, category: Category) -> Self {
        Self {
            label: label.to_string(),
            pattern: pattern.to_string(),
            category,
            open: String::new(),
            close: String::new(),
        }
    }

    pub fn framed(mut self, open: &str, close: &str) -> Self {
        self.open = open.to_string();
        self.close = close.to_string();
        self
    }
}

/// Mail-header rules redacted as identifying data
pub fn default_field_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new("Message-ID", r"[^>\r\n]+", Category::Name).framed("<", ">"),
        FieldRule::new("From", r"[\w.-]+@[\w.-]+", Category::Name),
        FieldRule::new("To", r"[\w.-]+@[\w.-]+", Category::Name),
        FieldRule::new("Subject", r"[^\r\n]*", Category::Name),
        FieldRule::new("X-Origin", r"[A-Za-z-]+", Category::Name),
        FieldRule::new("X-FileName", r"[\w.-]+", Category::Name),
    ]
}

/// External detector backends. A missing backend disables its pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorsConfig {
    /// Statistical named-entity detector
    pub statistical: Option<DetectorBackend>,
    /// Transformer token classifier
    pub transformer: Option<DetectorBackend>,
    /// Lexical synonym service
    pub synonyms: Option<DetectorBackend>,
}

/// How to reach an external detector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectorBackend {
    /// JSON over HTTP
    Http {
        /// Endpoint receiving POST requests
        endpoint: String,
        /// Request timeout in seconds
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    /// Local TOML lexicon file
    Lexicon {
        /// Path to the lexicon
        path: PathBuf,
    },
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CensorConfig::default();
        assert_eq!(config.glyph, '█');
        assert_eq!(config.transformer_threshold, 0.6);
        assert!(config.stages.field_anchors);
        assert!(!config.any_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config: CensorConfig = toml::from_str(
            r#"
            concepts = ["cancer"]

            [categories]
            names = true
            "#,
        )
        .unwrap();
        assert!(config.categories.names);
        assert!(!config.categories.dates);
        assert!(config.enabled(Category::Concept));
        assert_eq!(config.field_rules.len(), default_field_rules().len());
    }

    #[test]
    fn test_concept_stage_toggle() {
        let mut config = CensorConfig::default();
        config.concepts = vec!["cancer".into()];
        assert!(config.enabled(Category::Concept));
        config.stages.concepts = false;
        assert!(!config.enabled(Category::Concept));
    }

    #[test]
    fn test_reject_alphanumeric_glyph() {
        let config = CensorConfig {
            glyph: 'x',
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_reject_bad_threshold() {
        let config = CensorConfig {
            transformer_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_blank_concept() {
        let config = CensorConfig {
            concepts: vec!["  ".into()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_detector_backend_tagging() {
        let config: CensorConfig = toml::from_str(
            r#"
            [detectors.statistical]
            kind = "http"
            endpoint = "http://127.0.0.1:8080/ner"

            [detectors.synonyms]
            kind = "lexicon"
            path = "thesaurus.toml"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.detectors.statistical,
            Some(DetectorBackend::Http {
                endpoint: "http://127.0.0.1:8080/ner".into(),
                timeout_secs: 30,
            })
        );
        assert!(matches!(
            config.detectors.synonyms,
            Some(DetectorBackend::Lexicon { .. })
        ));
        assert!(config.detectors.transformer.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("censor.toml");
        std::fs::write(&path, "glyph = \"#\"\n[categories]\ndates = true\n").unwrap();
        let config = CensorConfig::load(&path).unwrap();
        assert_eq!(config.glyph, '#');
        assert!(config.enabled(Category::Date));
    }

    #[test]
    fn test_load_missing_file() {
        let result = CensorConfig::load(Path::new("/nonexistent/censor.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
