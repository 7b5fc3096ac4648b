//! Redaction applier

use super::stats::Statistics;
use crate::span::Span;

/// Rewrites a text buffer, replacing spans with censor glyphs.
#[derive(Debug, Clone, Copy)]
pub struct Applier {
    glyph: char,
}

impl Applier {
    pub fn new(glyph: char) -> Self {
        Self { glyph }
    }

    /// One glyph per char of `fragment`
    pub fn mask(&self, fragment: &str) -> String {
        std::iter::repeat(self.glyph)
            .take(fragment.chars().count())
            .collect()
    }

    /// Replacement text for `span` in `text`.
    ///
    /// Plain spans keep their char length. Field-anchored spans become
    /// `prefix + mask(value) + suffix`, which normalizes the blanks after
    /// the label and so may differ in length from the source.
    pub fn replacement(&self, text: &str, span: &Span) -> String {
        match &span.rewrite {
            Some(rw) => format!("{}{}{}", rw.prefix, self.mask(&text[rw.value.clone()]), rw.suffix),
            None => self.mask(span.text(text)),
        }
    }

    /// Apply sorted, non-overlapping spans to `text`, counting each one.
    ///
    /// Spans are applied right to left so offsets of the remaining spans
    /// stay valid even when a replacement changes byte length.
    pub fn apply(&self, text: &mut String, spans: &[Span], stats: &mut Statistics) -> usize {
        debug_assert!(spans.windows(2).all(|w| w[0].end <= w[1].start));

        for span in spans.iter().rev() {
            let replacement = self.replacement(text, span);
            text.replace_range(span.start..span.end, &replacement);
            stats.record(span.category);
        }
        spans.len()
    }
}
