/*!
# Output files

- [LabelWriter] writes labeled examples in the fastText supervised format (`__label__<category> <text>`), one per line.
- [SynonymWriter] writes synonym rows as tab-separated lines.

Both create the parent directory of their destination if needed.
!*/
mod labelwriter;
mod synonymwriter;
mod writertrait;

pub use labelwriter::LabelWriter;
pub use synonymwriter::{SynonymRow, SynonymWriter};
pub(crate) use writertrait::ensure_parent;
pub use writertrait::WriterTrait;
