/*! Text normalization.

Item names are turned into a canonical form:

1. split into words following Unicode word boundaries (UAX#29),
1. whitespace and punctuation tokens are dropped,
1. tokens are lowercased and stopwords are dropped,
1. hyphens are removed,
1. tokens are stemmed (English Snowball/Porter2 stemmer) until the stem no longer changes,
   and stems that are stopwords are dropped.

Stemming to a fixed point keeps normalization idempotent: a single Porter2 pass
can still shorten its own output (`televisions` → `televis` → `televi`).

Tokens are then joined with single spaces, keeping their original order.
!*/
use std::collections::HashSet;

use itertools::Itertools;
use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};
use unic_ucd::GeneralCategory;
use unicode_segmentation::UnicodeSegmentation;

lazy_static! {
    static ref ENGLISH_STOPWORDS: HashSet<String> = stop_words::get(stop_words::LANGUAGE::English)
        .into_iter()
        .map(|word| word.to_lowercase())
        .collect();
}

/// Stem `token` repeatedly until it is stable.
///
/// A round that changes the stem either shortens it or rewrites a final `y`,
/// so the number of useful rounds is bounded by the token length.
fn stem_fully(stemmer: &Stemmer, token: &str) -> String {
    let mut current = token.to_string();
    for _ in 0..=token.len() {
        let next = stemmer.stem(&current);
        if next == current {
            break;
        }
        current = next.into_owned();
    }
    current
}

/// `true` if every char of the token is punctuation.
fn is_punctuation(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_ascii_punctuation() || GeneralCategory::of(c).is_punctuation())
}

pub struct TextNormalizer {
    stopwords: HashSet<String>,
    stemmer: Stemmer,
}

impl TextNormalizer {
    /// Create a normalizer using a custom stopword list.
    /// Stopwords are matched case-insensitively.
    pub fn with_stopwords<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stopwords: stopwords
                .into_iter()
                .map(|word| word.as_ref().to_lowercase())
                .collect(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Whether `word` (lowercase) is a stopword.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Normalize `text`. Empty or stopword-only text gives an empty string.
    pub fn normalize(&self, text: &str) -> String {
        text.split_word_bounds()
            .filter(|token| !token.trim().is_empty() && !is_punctuation(token))
            .map(str::to_lowercase)
            .filter(|token| !self.is_stopword(token))
            .map(|token| token.replace('-', ""))
            .filter(|token| !token.is_empty())
            .map(|token| stem_fully(&self.stemmer, &token))
            .filter(|stem| !stem.is_empty() && !self.is_stopword(stem))
            .join(" ")
    }
}

impl Default for TextNormalizer {
    /// English stopwords and stemmer.
    fn default() -> Self {
        Self::with_stopwords(ENGLISH_STOPWORDS.iter())
    }
}
