//! Synonym table writer.
use std::fs::File;
use std::path::Path;

use serde::Serialize;

use super::writertrait::{ensure_parent, WriterTrait};
use crate::error::Error;

/// A seed word and its synonyms, by decreasing similarity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynonymRow {
    pub word: String,
    pub synonyms: Vec<String>,
}

impl SynonymRow {
    pub fn new(word: String, synonyms: Vec<String>) -> Self {
        Self { word, synonyms }
    }
}

/// Writes `word<TAB>synonym<TAB>synonym...` lines, without quoting.
pub struct SynonymWriter {
    inner: csv::Writer<File>,
}

impl WriterTrait for SynonymWriter {
    type Item = SynonymRow;

    fn new(dst: &Path) -> Result<Self, Error> {
        ensure_parent(dst)?;
        let inner = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(csv::QuoteStyle::Never)
            .has_headers(false)
            .flexible(true)
            .from_path(dst)?;
        Ok(Self { inner })
    }

    fn write(&mut self, vals: Vec<SynonymRow>) -> Result<(), Error> {
        for val in &vals {
            self.write_single(val)?;
        }
        Ok(())
    }

    fn write_single(&mut self, val: &SynonymRow) -> Result<(), Error> {
        let record = std::iter::once(&val.word).chain(val.synonyms.iter());
        self.inner.write_record(record)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        Ok(self.inner.flush()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_rows() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("syn").join("synonyms.tsv");
        let mut w = SynonymWriter::new(&dst).unwrap();
        w.write(vec![
            SynonymRow::new(
                "laptop".to_string(),
                vec!["notebook".to_string(), "macbook".to_string()],
            ),
            SynonymRow::new("stove".to_string(), vec![]),
        ])
        .unwrap();
        w.flush().unwrap();

        let content = std::fs::read_to_string(&dst).unwrap();
        assert_eq!(content, "laptop\tnotebook\tmacbook\nstove\n");
    }
}
