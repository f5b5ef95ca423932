//! Category support filtering.
//!
//! Counts examples per category, then only keeps the categories that have strictly more than a given number of examples.
use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use serde::Serialize;

use super::Filter;
use crate::labeler::LabeledExample;

/// A category and its number of examples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Number of examples per category.
#[derive(Debug, Default)]
pub struct CategoryFrequencies {
    counts: HashMap<String, usize>,
    nb_examples: usize,
}

impl CategoryFrequencies {
    pub fn count(examples: &[LabeledExample]) -> Self {
        let mut frequencies = Self::default();
        for example in examples {
            frequencies.add(example.category());
        }
        frequencies
    }

    #[inline]
    fn add(&mut self, category: &str) {
        // avoid allocating for already seen categories
        if let Some(count) = self.counts.get_mut(category) {
            *count += 1;
        } else {
            self.counts.insert(category.to_string(), 1);
        }
        self.nb_examples += 1;
    }

    /// Number of examples for `category` (0 if unknown).
    pub fn get(&self, category: &str) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }

    /// Number of distinct categories.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of counted examples.
    pub fn nb_examples(&self) -> usize {
        self.nb_examples
    }

    /// `n` largest categories, by decreasing count.
    /// Ties are broken by category name so that the output is stable.
    pub fn top(&self, n: usize) -> Vec<CategoryCount> {
        self.counts
            .iter()
            .sorted_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)))
            .take(n)
            .map(|(category, count)| CategoryCount {
                category: category.clone(),
                count: *count,
            })
            .collect()
    }

    /// Build a filter keeping categories that have strictly more than `min_count` examples.
    pub fn supported(&self, min_count: usize) -> FrequencyFilter {
        let keep = self
            .counts
            .iter()
            .filter(|(_, count)| **count > min_count)
            .map(|(category, _)| category.clone())
            .collect();
        FrequencyFilter { keep: Some(keep) }
    }
}

/// Keeps examples whose category belongs to a set of supported categories.
///
/// The default filter keeps everything.
#[derive(Debug, Default)]
pub struct FrequencyFilter {
    keep: Option<HashSet<String>>,
}

impl FrequencyFilter {
    /// Kept categories, `None` if every category is kept.
    pub fn categories(&self) -> Option<&HashSet<String>> {
        self.keep.as_ref()
    }

    /// Only retain supported examples. Examples are moved, never modified.
    pub fn apply(&self, examples: Vec<LabeledExample>) -> Vec<LabeledExample> {
        examples.into_iter().filter(|e| self.detect(e)).collect()
    }
}

impl Filter<&LabeledExample> for FrequencyFilter {
    fn detect(&self, example: &LabeledExample) -> bool {
        match &self.keep {
            Some(keep) => keep.contains(example.category()),
            None => true,
        }
    }
}
