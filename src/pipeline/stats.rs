//! Per-run redaction statistics

use crate::span::Category;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Redaction counts for one censoring run.
///
/// One value per document run; callers aggregate across documents with
/// [`Statistics::merge`] when they want totals. Concept (sentence)
/// redactions are counted under [`Category::Concept`] and are not part of
/// the four-category report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    counts: BTreeMap<Category, usize>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one redaction event
    pub fn record(&mut self, category: Category) {
        *self.counts.entry(category).or_insert(0) += 1;
    }

    /// Count for `category` (zero if never recorded)
    pub fn get(&self, category: Category) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Total across the four entity categories
    pub fn entity_total(&self) -> usize {
        Category::REPORTED.iter().map(|c| self.get(*c)).sum()
    }

    /// Read-only snapshot including zero counts for every category
    pub fn snapshot(&self) -> BTreeMap<Category, usize> {
        Category::REPORTED
            .iter()
            .chain(std::iter::once(&Category::Concept))
            .map(|c| (*c, self.get(*c)))
            .collect()
    }

    /// Add another run's counts into this one
    pub fn merge(&mut self, other: &Statistics) {
        for (category, count) in &other.counts {
            *self.counts.entry(*category).or_insert(0) += count;
        }
    }

    /// Render the statistics block for one source file
    pub fn render_report(&self, source: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "--- Censoring statistics for {} ---", source);
        for category in Category::REPORTED {
            let _ = writeln!(out, "{}: {}", category.report_label(), self.get(category));
        }
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_counts_are_zero() {
        let stats = Statistics::new();
        for (_, count) in stats.snapshot() {
            assert_eq!(count, 0);
        }
        assert_eq!(stats.snapshot().len(), 5);
    }

    #[test]
    fn test_record_and_get() {
        let mut stats = Statistics::new();
        stats.record(Category::Name);
        stats.record(Category::Name);
        stats.record(Category::Concept);
        assert_eq!(stats.get(Category::Name), 2);
        assert_eq!(stats.get(Category::Concept), 1);
        assert_eq!(stats.entity_total(), 2);
    }

    #[test]
    fn test_merge() {
        let mut a = Statistics::new();
        a.record(Category::Date);
        let mut b = Statistics::new();
        b.record(Category::Date);
        b.record(Category::Phone);
        a.merge(&b);
        assert_eq!(a.get(Category::Date), 2);
        assert_eq!(a.get(Category::Phone), 1);
    }

    #[test]
    fn test_report_format() {
        let mut stats = Statistics::new();
        stats.record(Category::Name);
        stats.record(Category::Phone);
        stats.record(Category::Concept);
        assert_eq!(
            stats.render_report("docs/a.txt"),
            "--- Censoring statistics for docs/a.txt ---\n\
             Names: 1\n\
             Address and Country: 0\n\
             Date: 0\n\
             Phone Numbers or Important Numbers: 1\n\
             \n"
        );
    }
}
