//! fastText supervised training data writer.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use super::writertrait::{ensure_parent, WriterTrait};
use crate::error::Error;
use crate::labeler::LabeledExample;

/// fastText label prefix.
pub const LABEL_PREFIX: &str = "__label__";

/// Writes one `__label__<category> <text>` line per example.
///
/// The destination file is created (truncated if it exists) as soon as the writer is,
/// so that an empty run still leaves an empty file behind.
pub struct LabelWriter {
    dst: PathBuf,
    inner: BufWriter<File>,
    nb_lines: usize,
}

impl LabelWriter {
    /// Number of lines written so far.
    pub fn nb_lines(&self) -> usize {
        self.nb_lines
    }

    /// Flush and close the file, returning the number of written lines.
    pub fn finish(mut self) -> Result<usize, Error> {
        self.inner.flush()?;
        debug!("closing {:?} ({} lines)", self.dst, self.nb_lines);
        Ok(self.nb_lines)
    }
}

impl WriterTrait for LabelWriter {
    type Item = LabeledExample;

    fn new(dst: &Path) -> Result<Self, Error> {
        ensure_parent(dst)?;
        let file = File::create(dst)?;
        Ok(Self {
            dst: dst.to_path_buf(),
            inner: BufWriter::new(file),
            nb_lines: 0,
        })
    }

    fn write(&mut self, vals: Vec<LabeledExample>) -> Result<(), Error> {
        for val in &vals {
            self.write_single(val)?;
        }
        Ok(())
    }

    fn write_single(&mut self, val: &LabeledExample) -> Result<(), Error> {
        writeln!(
            self.inner,
            "{}{} {}",
            LABEL_PREFIX,
            val.category(),
            val.text()
        )?;
        self.nb_lines += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        Ok(self.inner.flush()?)
    }
}
