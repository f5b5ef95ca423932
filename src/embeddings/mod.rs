/*! Word embedding models

Holds a [NearestNeighbors] trait for querying a pre-trained embedding model.

The current implementation uses [fasttext](https://fasttext.cc) binary models.
!*/
mod model;

pub use model::{FastText, FastTextBuilder, NearestNeighbors, VocabularyIndex};
