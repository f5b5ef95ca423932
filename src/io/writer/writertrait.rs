use std::path::Path;

use crate::error::Error;

/// Common interface of output file writers.
pub trait WriterTrait {
    type Item;

    /// Create the destination file, creating missing parent directories.
    fn new(dst: &Path) -> Result<Self, Error>
    where
        Self: Sized;
    fn write(&mut self, vals: Vec<Self::Item>) -> Result<(), Error>;
    fn write_single(&mut self, val: &Self::Item) -> Result<(), Error>;
    /// Flush buffered content.
    fn flush(&mut self) -> Result<(), Error>;
}

/// Create the parent directory of `dst` if it does not exist.
pub(crate) fn ensure_parent(dst: &Path) -> Result<(), Error> {
    match dst.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            log::warn!("Destination directory {:?} does not exist. Creating", parent);
            std::fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}
