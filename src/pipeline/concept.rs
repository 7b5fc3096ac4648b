//! Concept (sentence-level) redaction
//!
//! A sentence is censored whole when it contains a concept term or one of
//! the term's synonyms. Runs on the already-redacted text,
//! so visible words around censored entities still count.

use super::apply::Applier;
use super::normalize::{carries_payload, is_weekday};
use super::stats::Statistics;
use crate::detect::{SentenceTokenizer, SynonymSource, WordTokenizer};
use crate::span::{Category, Source, Span};
use std::collections::{HashMap, HashSet};

/// Concept redactor for a single document run.
///
/// Synonym expansions are cached per term for the lifetime of the value,
/// so each term hits the synonym service at most once per run.
pub struct ConceptRedactor<'a> {
    concepts: &'a [String],
    synonyms: Option<&'a dyn SynonymSource>,
    sentences: &'a dyn SentenceTokenizer,
    words: &'a dyn WordTokenizer,
    cache: HashMap<String, Vec<Vec<String>>>,
}

impl<'a> ConceptRedactor<'a> {
    pub fn new(
        concepts: &'a [String],
        synonyms: Option<&'a dyn SynonymSource>,
        sentences: &'a dyn SentenceTokenizer,
        words: &'a dyn WordTokenizer,
    ) -> Self {
        Self {
            concepts,
            synonyms,
            sentences,
            words,
            cache: HashMap::new(),
        }
    }

    /// Tokenized surface forms for `term`, always including the term itself.
    ///
    /// A failing synonym service degrades to exact-term matching.
    fn expand(&mut self, term: &str) -> &[Vec<String>] {
        let key = term.trim().to_lowercase();
        let synonyms = self.synonyms;
        let words = self.words;
        self.cache.entry(key.clone()).or_insert_with(|| {
            let mut forms: HashSet<String> = match synonyms {
                Some(source) => match source.synonyms(&key) {
                    Ok(forms) => forms,
                    Err(e) => {
                        tracing::warn!(
                            term = %key,
                            source = source.name(),
                            error = %e,
                            "Synonym service unavailable, matching exact term only"
                        );
                        HashSet::new()
                    }
                },
                None => HashSet::new(),
            };
            forms.insert(key);

            let mut tokenized: Vec<Vec<String>> = forms
                .iter()
                .map(|form| words.tokens(form))
                .filter(|tokens| !tokens.is_empty())
                .collect();
            tokenized.sort();
            tokenized.dedup();
            tokenized
        })
    }

    /// Whether any configured concept occurs in `sentence`.
    ///
    /// Single-word forms match any word; multi-word forms ("breast cancer")
    /// must appear as a contiguous run of words.
    fn matches(&mut self, sentence: &str) -> bool {
        let tokens = self.words.tokens(sentence);
        if tokens.is_empty() {
            return false;
        }
        let words: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        let concepts = self.concepts;
        concepts
            .iter()
            .filter(|term| !is_weekday(term))
            .any(|term| {
                self.expand(term).iter().any(|form| match form.as_slice() {
                    [word] => words.contains(word.as_str()),
                    run => tokens.windows(run.len()).any(|window| window == run),
                })
            })
    }

    /// Sentence spans to censor in `text`
    pub fn detect(&mut self, text: &str) -> Vec<Span> {
        let mut flagged = Vec::new();
        for range in self.sentences.sentences(text) {
            let Some(sentence) = text.get(range.clone()) else {
                tracing::debug!(
                    start = range.start,
                    end = range.end,
                    len = text.len(),
                    "Dropping sentence range that does not fit the text"
                );
                continue;
            };
            if carries_payload(sentence) && self.matches(sentence) {
                flagged.push(Span::new(range.start, range.end, Category::Concept, Source::Lexical));
            }
        }
        flagged
    }

    /// Censor matching sentences in place, returning how many were censored
    pub fn redact(&mut self, text: &mut String, applier: &Applier, stats: &mut Statistics) -> usize {
        let snapshot = text.as_str();
        let spans: Vec<Span> = self
            .detect(snapshot)
            .into_iter()
            .filter_map(|span| span.checked(snapshot).ok())
            .collect();
        applier.apply(text, &spans, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{AlphanumericWordTokenizer, DetectorError, DetectorResult, RuleSentenceTokenizer};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSynonyms {
        calls: AtomicUsize,
    }

    impl SynonymSource for CountingSynonyms {
        fn synonyms(&self, term: &str) -> DetectorResult<HashSet<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut forms = HashSet::new();
            if term == "cancer" {
                forms.insert("malignancy".to_string());
                forms.insert("Tumor".to_string());
            }
            Ok(forms)
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct BrokenSynonyms;

    impl SynonymSource for BrokenSynonyms {
        fn synonyms(&self, _term: &str) -> DetectorResult<HashSet<String>> {
            Err(DetectorError::Unavailable("offline".into()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn run(concepts: &[&str], synonyms: Option<&dyn SynonymSource>, text: &str) -> (String, usize) {
        let concepts: Vec<String> = concepts.iter().map(|s| s.to_string()).collect();
        let mut redactor = ConceptRedactor::new(
            &concepts,
            synonyms,
            &RuleSentenceTokenizer,
            &AlphanumericWordTokenizer,
        );
        let mut text = text.to_string();
        let mut stats = Statistics::new();
        let n = redactor.redact(&mut text, &Applier::new('█'), &mut stats);
        assert_eq!(stats.get(Category::Concept), n);
        (text, n)
    }

    #[test]
    fn test_whole_sentence_censored() {
        let input = "The patient has cancer and was treated with chemotherapy.";
        let (text, n) = run(&["cancer", "chemotherapy"], None, input);
        assert_eq!(n, 1);
        assert_eq!(text, "█".repeat(input.chars().count()));
    }

    #[test]
    fn test_only_matching_sentences_censored() {
        let input = "He has a tumor. The weather is nice.";
        let synonyms = CountingSynonyms {
            calls: AtomicUsize::new(0),
        };
        let (text, n) = run(&["cancer"], Some(&synonyms), input);
        assert_eq!(n, 1);
        assert_eq!(text, format!("{} The weather is nice.", "█".repeat(15)));
    }

    #[test]
    fn test_synonyms_cached_per_run() {
        let synonyms = CountingSynonyms {
            calls: AtomicUsize::new(0),
        };
        let input = "One sentence. Another sentence. A third sentence.";
        run(&["cancer", "flu"], Some(&synonyms), input);
        assert_eq!(synonyms.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_weekday_concepts_skipped() {
        let synonyms = CountingSynonyms {
            calls: AtomicUsize::new(0),
        };
        let (text, n) = run(&["Monday"], Some(&synonyms), "See you on Monday.");
        assert_eq!(n, 0);
        assert_eq!(text, "See you on Monday.");
        assert_eq!(synonyms.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_broken_service_falls_back_to_exact_term() {
        let (text, n) = run(&["cancer"], Some(&BrokenSynonyms), "No tumor. Has cancer.");
        assert_eq!(n, 1);
        assert_eq!(text, "No tumor. ███████████");
    }

    #[test]
    fn test_censored_sentence_not_recounted() {
        let input = "The patient has cancer.";
        let (once, _) = run(&["cancer"], None, input);
        let (twice, n) = run(&["cancer"], None, &once);
        assert_eq!(n, 0);
        assert_eq!(once, twice);
    }

    struct FixedSentences(Vec<std::ops::Range<usize>>);

    impl SentenceTokenizer for FixedSentences {
        fn sentences(&self, _text: &str) -> Vec<std::ops::Range<usize>> {
            self.0.clone()
        }
    }

    #[test]
    fn test_bad_sentence_ranges_dropped() {
        let concepts = vec!["cancer".to_string()];
        let text = "Zoë has cancer.";
        let tokenizer = FixedSentences(vec![0..text.len() + 5, 0..3, 5..2, 0..text.len()]);
        let mut redactor =
            ConceptRedactor::new(&concepts, None, &tokenizer, &AlphanumericWordTokenizer);

        let spans = redactor.detect(text);
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start, spans[0].end), (0, text.len()));
    }

    #[test]
    fn test_out_of_range_sentence_leaves_text_alone() {
        let concepts = vec!["cancer".to_string()];
        let input = "He has cancer.";
        let tokenizer = FixedSentences(vec![0..input.len() + 5]);
        let mut redactor =
            ConceptRedactor::new(&concepts, None, &tokenizer, &AlphanumericWordTokenizer);

        let mut text = input.to_string();
        let mut stats = Statistics::new();
        assert_eq!(redactor.redact(&mut text, &Applier::new('█'), &mut stats), 0);
        assert_eq!(text, input);
    }

    #[test]
    fn test_multi_word_concept() {
        let input = "She was treated for breast cancer last year. Her breast is fine.";
        let (text, n) = run(&["breast cancer"], None, input);
        assert_eq!(n, 1);
        assert_eq!(text, format!("{} Her breast is fine.", "█".repeat(44)));
    }

    #[test]
    fn test_multi_word_concept_needs_contiguous_words() {
        let input = "Cancer of the breast was ruled out.";
        let (text, n) = run(&["breast cancer"], None, input);
        assert_eq!(n, 0);
        assert_eq!(text, input);
    }

    struct PhraseSynonyms;

    impl SynonymSource for PhraseSynonyms {
        fn synonyms(&self, _term: &str) -> DetectorResult<HashSet<String>> {
            Ok(["malignant tumor".to_string(), "breast_cancer".to_string()]
                .into_iter()
                .collect())
        }

        fn name(&self) -> &str {
            "phrases"
        }
    }

    #[test]
    fn test_multi_word_synonyms() {
        let (_, n) = run(&["carcinoma"], Some(&PhraseSynonyms), "A malignant tumor was found.");
        assert_eq!(n, 1);
        let (_, n) = run(&["carcinoma"], Some(&PhraseSynonyms), "History of breast cancer.");
        assert_eq!(n, 1);
        let (_, n) = run(&["carcinoma"], Some(&PhraseSynonyms), "The tumor is benign.");
        assert_eq!(n, 0);
    }

    #[test]
    fn test_case_insensitive_match() {
        let (_, n) = run(&["CANCER"], None, "Cancer runs in the family.");
        assert_eq!(n, 1);
    }
}
