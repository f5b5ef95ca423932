//! Pipelines.
//!
//! - [TrainingData] extracts labeled training data from a folder of catalog files,
//! - [Synonyms] builds a synonym table from a trained embedding model.
//!
//! The module provides a light [pipeline::Pipeline] trait, and the generic parallel [collector].
pub mod collector;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod synonyms;
pub mod training_data;

pub use pipeline::Pipeline;
pub use synonyms::Synonyms;
pub use training_data::{RunSummary, TrainingData};
