/*!
# IO utilities

Catalog reading lives in [crate::catalog]; this module holds the writers for generated files.
!*/
pub mod writer;

pub use writer::{LabelWriter, SynonymWriter};
