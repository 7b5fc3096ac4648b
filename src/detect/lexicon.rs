//! File-backed detectors
//!
//! Offline stand-ins for the statistical NER model and the synonym
//! service, loaded from TOML tables:
//!
//! ```toml
//! # lexicon.toml
//! PERSON = ["John Doe", "Trae Young"]
//! GPE = ["Oregon", "Atlanta"]
//!
//! # thesaurus.toml
//! cancer = ["malignancy", "neoplasm"]
//! ```

use super::{DetectorResult, EntityDetector, SynonymSource};
use crate::error::{Error, Result};
use crate::span::RawEntity;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

fn read_table(path: &Path) -> Result<BTreeMap<String, Vec<String>>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read lexicon '{}': {}", path.display(), e))
    })?;
    Ok(toml::from_str(&content)?)
}

/// Whole-word alternation, longest surface form first.
fn surface_pattern(label: &str, forms: &[String]) -> Result<Option<Regex>> {
    let mut forms: Vec<&str> = forms
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect();
    if forms.is_empty() {
        return Ok(None);
    }
    forms.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    forms.dedup();

    let alternatives: Vec<String> = forms
        .iter()
        .map(|form| {
            let lead = if form.starts_with(|c: char| c.is_alphanumeric()) { r"\b" } else { "" };
            let tail = if form.ends_with(|c: char| c.is_alphanumeric()) { r"\b" } else { "" };
            format!("{}{}{}", lead, regex::escape(form), tail)
        })
        .collect();

    Regex::new(&format!("(?:{})", alternatives.join("|")))
        .map(Some)
        .map_err(|e| Error::Pattern(format!("Invalid lexicon entry for '{}': {}", label, e)))
}

/// Gazetteer entity detector: labelled surface forms matched as whole words.
pub struct Gazetteer {
    entries: Vec<(String, Regex)>,
}

impl Gazetteer {
    /// Build from `label -> surface forms`
    pub fn new(table: BTreeMap<String, Vec<String>>) -> Result<Self> {
        let mut entries = Vec::new();
        for (label, forms) in table {
            if let Some(pattern) = surface_pattern(&label, &forms)? {
                entries.push((label, pattern));
            }
        }
        Ok(Self { entries })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::new(read_table(path)?)
    }
}

impl EntityDetector for Gazetteer {
    fn detect(&self, text: &str) -> DetectorResult<Vec<RawEntity>> {
        let mut found: Vec<RawEntity> = self
            .entries
            .iter()
            .flat_map(|(label, pattern)| {
                pattern
                    .find_iter(text)
                    .map(move |m| RawEntity::new(label.clone(), m.start(), m.end()))
            })
            .collect();
        found.sort_by_key(|e| e.start);
        Ok(found)
    }

    fn name(&self) -> &str {
        "gazetteer"
    }
}

/// Thesaurus synonym source with case-insensitive lookup.
pub struct Thesaurus {
    entries: BTreeMap<String, HashSet<String>>,
}

impl Thesaurus {
    pub fn new(table: BTreeMap<String, Vec<String>>) -> Self {
        let entries = table
            .into_iter()
            .map(|(term, forms)| {
                let forms = forms
                    .into_iter()
                    .map(|f| f.trim().to_lowercase())
                    .filter(|f| !f.is_empty())
                    .collect();
                (term.trim().to_lowercase(), forms)
            })
            .collect();
        Self { entries }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self::new(read_table(path)?))
    }
}

impl SynonymSource for Thesaurus {
    fn synonyms(&self, term: &str) -> DetectorResult<HashSet<String>> {
        Ok(self
            .entries
            .get(&term.trim().to_lowercase())
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "thesaurus"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_gazetteer_whole_words() {
        let gazetteer = Gazetteer::new(table(&[("PERSON", &["Ann"])])).unwrap();
        let found = gazetteer.detect("Ann met Annabel.").unwrap();
        assert_eq!(found, vec![RawEntity::new("PERSON", 0, 3)]);
    }

    #[test]
    fn test_gazetteer_prefers_longest_form() {
        let gazetteer =
            Gazetteer::new(table(&[("PERSON", &["John", "John Doe"])])).unwrap();
        let found = gazetteer.detect("John Doe lives here").unwrap();
        assert_eq!(found, vec![RawEntity::new("PERSON", 0, 8)]);
    }

    #[test]
    fn test_gazetteer_multiple_labels_sorted() {
        let gazetteer = Gazetteer::new(table(&[
            ("GPE", &["Oregon"]),
            ("PERSON", &["Trae Young"]),
        ]))
        .unwrap();
        let text = "Trae Young left Oregon";
        let found = gazetteer.detect(text).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].label, "PERSON");
        assert_eq!(&text[found[1].start..found[1].end], "Oregon");
    }

    #[test]
    fn test_gazetteer_punctuated_form() {
        let gazetteer = Gazetteer::new(table(&[("GPE", &["U.S."])])).unwrap();
        let found = gazetteer.detect("Back to the U.S. soon").unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_gazetteer_skips_blank_forms() {
        let gazetteer = Gazetteer::new(table(&[("PERSON", &["  "])])).unwrap();
        assert!(gazetteer.detect("anything").unwrap().is_empty());
    }

    #[test]
    fn test_thesaurus_lookup_is_case_insensitive() {
        let thesaurus = Thesaurus::new(table(&[("Cancer", &["Malignancy", "neoplasm"])]));
        let forms = thesaurus.synonyms("CANCER").unwrap();
        assert!(forms.contains("malignancy"));
        assert!(forms.contains("neoplasm"));
        assert!(thesaurus.synonyms("flu").unwrap().is_empty());
    }

    #[test]
    fn test_from_path_missing_file() {
        assert!(Gazetteer::from_path(Path::new("/nonexistent/lexicon.toml")).is_err());
    }
}
