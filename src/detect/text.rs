//! Rule-based text segmentation and offset helpers

use super::{SentenceTokenizer, WordTokenizer};
use std::ops::Range;

/// Character-offset to byte-offset lookup for one text.
pub struct CharIndex {
    /// Byte offset of every char, plus the text length as the final entry
    offsets: Vec<usize>,
}

impl CharIndex {
    pub fn new(text: &str) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());
        Self { offsets }
    }

    /// Byte offset of the `char_offset`-th char (the text length for one past the end).
    pub fn byte_offset(&self, char_offset: usize) -> Option<usize> {
        self.offsets.get(char_offset).copied()
    }
}

const TERMINATORS: &[char] = &['.', '!', '?'];

const CLOSERS: &[char] = &['"', '\'', ')', ']', '\u{201D}', '\u{2019}'];

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "jr", "sr", "vs", "etc", "inc", "ltd", "e.g", "i.e",
];

/// Sentence splitter on terminal punctuation and blank lines.
///
/// A sentence ends after `.`, `!` or `?` (plus closing quotes/brackets)
/// followed by whitespace or end of text, unless the period closes a known
/// abbreviation or a single-letter initial. Returned ranges exclude
/// surrounding whitespace.
#[derive(Debug, Clone, Default)]
pub struct RuleSentenceTokenizer;

impl RuleSentenceTokenizer {
    fn closes_abbreviation(fragment: &str) -> bool {
        let word = fragment
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or("")
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        let single_initial = word.chars().count() == 1 && word.chars().all(char::is_alphabetic);
        single_initial || ABBREVIATIONS.contains(&word.as_str())
    }
}

fn trimmed(text: &str, start: usize, end: usize) -> Option<Range<usize>> {
    let end = start + text[start..end].trim_end().len();
    (end > start).then_some(start..end)
}

impl SentenceTokenizer for RuleSentenceTokenizer {
    fn sentences(&self, text: &str) -> Vec<Range<usize>> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut out = Vec::new();
        let mut start: Option<usize> = None;
        let mut i = 0;

        while i < chars.len() {
            let (pos, c) = chars[i];
            let Some(s) = start else {
                if !c.is_whitespace() {
                    start = Some(pos);
                }
                i += 1;
                continue;
            };

            if c == '\n' {
                let mut j = i + 1;
                while j < chars.len() && chars[j].1 != '\n' && chars[j].1.is_whitespace() {
                    j += 1;
                }
                if j < chars.len() && chars[j].1 == '\n' {
                    out.extend(trimmed(text, s, pos));
                    start = None;
                    i = j + 1;
                    continue;
                }
            }

            if TERMINATORS.contains(&c) {
                let mut j = i + 1;
                while j < chars.len() && TERMINATORS.contains(&chars[j].1) {
                    j += 1;
                }
                while j < chars.len() && CLOSERS.contains(&chars[j].1) {
                    j += 1;
                }
                let at_boundary = j >= chars.len() || chars[j].1.is_whitespace();
                let abbreviation = c == '.' && j == i + 1 && Self::closes_abbreviation(&text[s..pos]);
                if at_boundary && !abbreviation {
                    let end = chars.get(j).map(|(p, _)| *p).unwrap_or(text.len());
                    out.extend(trimmed(text, s, end));
                    start = None;
                }
                i = j;
                continue;
            }

            i += 1;
        }

        if let Some(s) = start {
            out.extend(trimmed(text, s, text.len()));
        }
        out
    }
}

/// Word splitter on non-alphanumeric characters; words are lowercased.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphanumericWordTokenizer;

impl WordTokenizer for AlphanumericWordTokenizer {
    fn tokens(&self, sentence: &str) -> Vec<String> {
        sentence
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect()
    }
}
