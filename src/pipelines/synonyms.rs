/*! Synonym generation pipeline

For each seed word, look up its nearest neighbors in a trained embedding model
and keep the ones whose similarity is strictly above a threshold.
!*/
use std::io::BufRead;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::embeddings::{FastTextBuilder, NearestNeighbors};
use crate::error::Error;
use crate::io::writer::{SynonymRow, SynonymWriter, WriterTrait};
use crate::pipelines::pipeline::Pipeline;

/// Default similarity threshold.
pub const DEFAULT_THRESHOLD: f32 = 0.75;

/// Read seed words, one per line. Surrounding whitespace is trimmed and blank lines are skipped.
pub fn read_words<R: BufRead>(reader: R) -> Result<Vec<String>, Error> {
    let mut words = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let word = line.trim();
        if !word.is_empty() {
            words.push(word.to_string());
        }
    }
    Ok(words)
}

/// Build a synonym row for each word.
pub fn synonyms_for<M: NearestNeighbors>(
    model: &M,
    words: &[String],
    k: usize,
    threshold: f32,
) -> Result<Vec<SynonymRow>, Error> {
    words
        .iter()
        .map(|word| {
            let synonyms = model
                .nearest_neighbors(word, k)?
                .into_iter()
                .filter(|(score, _)| *score > threshold)
                .map(|(_, neighbor)| neighbor)
                .collect::<Vec<_>>();
            debug!("{}: {} synonyms", word, synonyms.len());
            Ok(SynonymRow::new(word.clone(), synonyms))
        })
        .collect()
}

pub struct Synonyms {
    model_path: PathBuf,
    words_path: PathBuf,
    dst: PathBuf,
    threshold: f32,
    k: usize,
}

impl Synonyms {
    pub fn new(model_path: PathBuf, words_path: PathBuf, dst: PathBuf) -> Self {
        Self {
            model_path,
            words_path,
            dst,
            threshold: DEFAULT_THRESHOLD,
            k: 10,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Generate synonyms with an already loaded model and write them.
    /// Returns the number of written rows.
    pub fn run_with<M: NearestNeighbors>(&self, model: &M) -> Result<usize, Error> {
        let words = read_words(std::io::BufReader::new(std::fs::File::open(
            &self.words_path,
        )?))?;
        info!("{} seed words from {:?}", words.len(), self.words_path);

        let rows = synonyms_for(model, &words, self.k, self.threshold)?;
        let nb_rows = rows.len();

        let mut writer = SynonymWriter::new(&self.dst)?;
        writer.write(rows)?;
        writer.flush()?;
        info!("wrote {} rows to {:?}", nb_rows, self.dst);
        Ok(nb_rows)
    }

    pub fn dst(&self) -> &Path {
        &self.dst
    }
}

impl Pipeline<usize> for Synonyms {
    fn version() -> &'static str {
        "0.1.0"
    }

    fn run(&self) -> Result<usize, Error> {
        let model = FastTextBuilder::default()
            .path(&self.model_path)
            .k(self.k)
            .build()?;
        self.run_with(&model)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Cursor;

    use super::*;
    use crate::embeddings::VocabularyIndex;

    struct Table(HashMap<&'static str, Vec<(f32, String)>>);

    impl NearestNeighbors for Table {
        fn nearest_neighbors(&self, word: &str, k: usize) -> Result<Vec<(f32, String)>, Error> {
            Ok(self
                .0
                .get(word)
                .map(|n| n.iter().take(k).cloned().collect())
                .unwrap_or_default())
        }
    }

    fn table() -> Table {
        let mut t = HashMap::new();
        t.insert(
            "laptop",
            vec![
                (0.91, "notebook".to_string()),
                (0.80, "ultrabook".to_string()),
                (0.75, "netbook".to_string()),
                (0.40, "desk".to_string()),
            ],
        );
        t.insert("stove", vec![(0.2, "oven".to_string())]);
        Table(t)
    }

    #[test]
    fn read_seed_words() {
        let words = read_words(Cursor::new("laptop\n\n  stove \r\nphone")).unwrap();
        assert_eq!(words, vec!["laptop", "stove", "phone"]);
    }

    #[test]
    fn threshold_is_strict() {
        let words = vec!["laptop".to_string(), "stove".to_string(), "unknown".to_string()];
        let rows = synonyms_for(&table(), &words, 10, 0.75).unwrap();
        assert_eq!(
            rows,
            vec![
                SynonymRow::new(
                    "laptop".to_string(),
                    vec!["notebook".to_string(), "ultrabook".to_string()]
                ),
                SynonymRow::new("stove".to_string(), vec![]),
                SynonymRow::new("unknown".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn k_limits_neighbors() {
        let rows = synonyms_for(&table(), &["laptop".to_string()], 1, 0.0).unwrap();
        assert_eq!(rows[0].synonyms, vec!["notebook".to_string()]);
    }

    #[test]
    fn run_with_model() {
        let dir = tempfile::tempdir().unwrap();
        let words = dir.path().join("top_words.txt");
        std::fs::write(&words, "laptop\nstove\n").unwrap();
        let dst = dir.path().join("out").join("synonyms.csv");

        let p = Synonyms::new(dir.path().join("unused.bin"), words, dst.clone());
        assert_eq!(p.run_with(&table()).unwrap(), 2);
        assert_eq!(
            std::fs::read_to_string(&dst).unwrap(),
            "laptop\tnotebook\tultrabook\nstove\n"
        );
    }

    #[test]
    fn run_with_vocabulary_index() {
        let index = VocabularyIndex::new(
            2,
            vec![
                ("laptop".to_string(), vec![1.0, 0.0]),
                ("notebook".to_string(), vec![0.95, 0.1]),
                ("desk".to_string(), vec![0.5, 0.5]),
                ("stove".to_string(), vec![0.0, 1.0]),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let words = dir.path().join("top_words.txt");
        std::fs::write(&words, "laptop\nstove\n").unwrap();
        let dst = dir.path().join("synonyms.tsv");

        let p = Synonyms::new(dir.path().join("unused.bin"), words, dst.clone());
        assert_eq!(p.run_with(&index).unwrap(), 2);
        assert_eq!(
            std::fs::read_to_string(&dst).unwrap(),
            "laptop\tnotebook\nstove\n"
        );
    }
}
