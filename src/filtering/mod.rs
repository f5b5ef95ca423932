/*! Filtering utilities

Filters operate on raw catalog records (taxonomy rules) or on labeled examples (category support).

Filters implement [filter::Filter], which is a pure predicate: two equal inputs always give the same answer.
The [Default] implementation of a filter is its usual configuration.
! */
mod filter;
pub mod frequency;
pub mod taxonomy;

pub use filter::Filter;
pub use frequency::{CategoryCount, CategoryFrequencies, FrequencyFilter};
pub use taxonomy::Taxonomy;
