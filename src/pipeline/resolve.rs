//! Conflict resolution within one pass

use crate::span::Span;
use std::cmp::Ordering;

/// Select a non-overlapping subset of `spans`, sorted by start.
///
/// Order: earliest start, then longest, then higher source priority, then
/// higher confidence. A greedy sweep keeps every span that does not overlap
/// one already kept; overlapping spans are discarded, never merged.
pub fn resolve(mut spans: Vec<Span>) -> Vec<Span> {
    if spans.len() <= 1 {
        return spans;
    }

    spans.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(b.len().cmp(&a.len()))
            .then(b.source.priority().cmp(&a.source.priority()))
            .then(b.score().partial_cmp(&a.score()).unwrap_or(Ordering::Equal))
    });

    let mut accepted: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        // Kept spans are disjoint and sorted, so the last one has the furthest end
        if accepted.last().map_or(true, |last| span.start >= last.end) {
            accepted.push(span);
        }
    }
    accepted
}
