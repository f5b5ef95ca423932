/*! fastText embedding model.

The model is opaque: it is loaded from a `.bin` file and only queried for word vectors.

Nearest neighbors are found the way fastText does it: every vocabulary word vector is
L2-normalized once when the model is loaded, and candidates are ranked by their dot product
with the query vector (cosine similarity). The query word itself is never returned.
!*/
use std::cmp::Ordering;
use std::path::Path;

use fasttext::FastText as FastTextLib;
use itertools::Itertools;
use log::{debug, info};

use crate::error::Error;

/// Nearest neighbor lookup.
pub trait NearestNeighbors {
    /// `k` nearest neighbors of `word`, as `(similarity, neighbor)` pairs by decreasing similarity.
    fn nearest_neighbors(&self, word: &str, k: usize) -> Result<Vec<(f32, String)>, Error>;
}

fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Normalized word vectors, stored row by row.
#[derive(Debug, Clone, Default)]
pub struct VocabularyIndex {
    words: Vec<String>,
    matrix: Vec<f32>,
    dim: usize,
}

impl VocabularyIndex {
    /// Build an index of `dim`-sized vectors.
    ///
    /// # Errors
    /// Fails if a vector does not have `dim` components.
    pub fn new<I>(dim: usize, vectors: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        let mut index = Self {
            words: Vec::new(),
            matrix: Vec::new(),
            dim,
        };
        for (word, mut vector) in vectors {
            if vector.len() != dim {
                return Err(Error::Custom(format!(
                    "vector of {:?} has {} components, expected {}",
                    word,
                    vector.len(),
                    dim
                )));
            }
            l2_normalize(&mut vector);
            index.words.push(word);
            index.matrix.extend(vector);
        }
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn row(&self, i: usize) -> &[f32] {
        &self.matrix[i * self.dim..(i + 1) * self.dim]
    }

    /// Rank vocabulary words by cosine similarity with `query`, skipping `exclude`.
    pub fn nearest(&self, query: &[f32], exclude: &str, k: usize) -> Vec<(f32, String)> {
        let mut query = query.to_vec();
        l2_normalize(&mut query);

        self.words
            .iter()
            .enumerate()
            .filter(|(_, word)| word.as_str() != exclude)
            .map(|(i, word)| {
                let score: f32 = self.row(i).iter().zip(&query).map(|(a, b)| a * b).sum();
                (score, word)
            })
            .sorted_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal))
            .take(k)
            .map(|(score, word)| (score, word.clone()))
            .collect()
    }

    fn vector_of(&self, word: &str) -> Option<&[f32]> {
        self.words
            .iter()
            .position(|w| w == word)
            .map(|i| self.row(i))
    }
}

/// In-vocabulary lookup only: unknown words have no neighbors.
impl NearestNeighbors for VocabularyIndex {
    fn nearest_neighbors(&self, word: &str, k: usize) -> Result<Vec<(f32, String)>, Error> {
        Ok(self
            .vector_of(word)
            .map(|query| self.nearest(query, word, k))
            .unwrap_or_default())
    }
}

/// Holds a [fasttext::FastText] instance, its vocabulary index and the number of neighbors to look up.
pub struct FastText {
    inner: FastTextLib,
    index: VocabularyIndex,
    pub k: usize,
}

impl FastText {
    /// Neighbors of `word` using [FastText::k].
    pub fn neighbors(&self, word: &str) -> Result<Vec<(f32, String)>, Error> {
        self.nearest_neighbors(word, self.k)
    }
}

impl NearestNeighbors for FastText {
    /// Out of vocabulary words are supported, their vector being built from subwords.
    fn nearest_neighbors(&self, word: &str, k: usize) -> Result<Vec<(f32, String)>, Error> {
        let query = self.inner.get_word_vector(word)?;
        let neighbors = self.index.nearest(&query, word, k);
        debug!("{}: {:?}", word, neighbors);
        Ok(neighbors)
    }
}

/// Fasttext builder.
pub struct FastTextBuilder<'a> {
    path: Option<&'a Path>,
    k: Option<usize>,
}

impl<'a> FastTextBuilder<'a> {
    fn init_fasttextlib(path: &str) -> Result<FastTextLib, Error> {
        let mut ft = FastTextLib::new();
        ft.load_model(path)?;
        Ok(ft)
    }

    fn index_vocabulary(ft: &FastTextLib) -> Result<VocabularyIndex, Error> {
        let dim = usize::try_from(ft.get_dimension())
            .map_err(|e| Error::Custom(format!("invalid model dimension: {}", e)))?;
        let (words, _) = ft.get_vocab()?;
        let vectors = words
            .into_iter()
            .map(|word| ft.get_word_vector(&word).map(|v| (word, v)))
            .collect::<Result<Vec<_>, String>>()?;
        VocabularyIndex::new(dim, vectors)
    }

    /// attempt to build, resorting to `k = 10` if not set.
    ///
    /// # Errors
    /// Fails if no path is provided, if the path is not valid UTF-8 or if the model can't be loaded.
    pub fn build(&self) -> Result<FastText, Error> {
        let path = self
            .path
            .ok_or_else(|| Error::Custom("No model path provided".to_string()))?;
        let path = path
            .to_str()
            .ok_or_else(|| Error::Custom(format!("Couldn't parse path {:?}", path)))?;

        debug!("loading embedding model {}", path);
        let inner = Self::init_fasttextlib(path)?;
        let index = Self::index_vocabulary(&inner)?;
        info!("indexed {} words from {}", index.len(), path);

        Ok(FastText {
            inner,
            index,
            k: self.k.unwrap_or(10),
        })
    }

    pub fn path<'b>(&'b mut self, path: &'a Path) -> &'b mut FastTextBuilder<'a> {
        self.path = Some(path);
        self
    }

    pub fn k<'b>(&'b mut self, k: usize) -> &'b mut FastTextBuilder<'a> {
        self.k = Some(k);
        self
    }
}

impl<'a> Default for FastTextBuilder<'a> {
    fn default() -> Self {
        Self {
            path: None,
            k: Some(10),
        }
    }
}
