/*! Catalog files.

A catalog is an XML dump of product items, each carrying a name and a category path.
[CatalogReader] streams [RawRecord]s out of a single catalog file.
!*/
mod reader;
mod record;

pub use reader::CatalogReader;
pub use record::{CategoryPathSegment, RawRecord};
