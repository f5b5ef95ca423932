/*! Streaming catalog reader.

Catalog files are XML documents whose root holds one element per item:

```xml
<products>
  <product>
    <name>Wireless Mouse</name>
    <categoryPath>
      <category><id>cat00000</id><name>Best Buy</name></category>
      <category><id>abcat0100000</id><name>Electronics</name></category>
    </categoryPath>
  </product>
</products>
```

Only the first `name` and the first `categoryPath` children of an item are read.
Each child of `categoryPath` is a segment, whose first child is the category id and second child the category name.
Everything else is skipped. Items are yielded lazily, one per root child.
!*/
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::record::{CategoryPathSegment, RawRecord};
use crate::error::Error;

// element depths, counting the root as 1.
const ITEM_DEPTH: usize = 2;
const FIELD_DEPTH: usize = 3;
const SEGMENT_DEPTH: usize = 4;
const SEGMENT_FIELD_DEPTH: usize = 5;

const NAME_TAG: &[u8] = b"name";
const CATEGORY_PATH_TAG: &[u8] = b"categoryPath";

fn malformed(path: &Path, position: usize, reason: &str) -> Error {
    Error::MalformedInput {
        path: path.to_path_buf(),
        reason: format!("{} (at byte {})", reason, position),
    }
}

/// Owned, trimmed down version of a [quick_xml] event.
enum Step {
    Open(Vec<u8>),
    Leaf(Vec<u8>),
    Close,
    Text(String),
    Eof,
    Skip,
}

/// Field whose text is currently being read.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Name,
    SegmentId,
    SegmentName,
}

/// Item being built.
#[derive(Default)]
struct ItemState {
    record: RawRecord,
    name_seen: bool,
    path_seen: bool,
    in_path: bool,
    segment_children: usize,
    capture: Option<(Field, String)>,
}

impl ItemState {
    fn open(&mut self, tag: &[u8], depth: usize) {
        match depth {
            FIELD_DEPTH if tag == NAME_TAG && !self.name_seen => {
                self.name_seen = true;
                self.capture = Some((Field::Name, String::new()));
            }
            FIELD_DEPTH if tag == CATEGORY_PATH_TAG && !self.path_seen => {
                self.path_seen = true;
                self.in_path = true;
            }
            SEGMENT_DEPTH if self.in_path => {
                self.record
                    .category_path_mut()
                    .push(CategoryPathSegment::default());
                self.segment_children = 0;
            }
            SEGMENT_FIELD_DEPTH if self.in_path => {
                let field = match self.segment_children {
                    0 => Some(Field::SegmentId),
                    1 => Some(Field::SegmentName),
                    _ => None,
                };
                self.segment_children += 1;
                self.capture = field.map(|f| (f, String::new()));
            }
            _ => (),
        }
    }

    /// `depth` is the depth of the element that has just been closed.
    fn close(&mut self, depth: usize) {
        match depth {
            FIELD_DEPTH => {
                self.in_path = false;
                self.finish_capture();
            }
            SEGMENT_FIELD_DEPTH => self.finish_capture(),
            _ => (),
        }
    }

    fn text(&mut self, text: &str, depth: usize) {
        // only keep text that is directly under the captured element
        let direct = match self.capture {
            Some((Field::Name, _)) => depth == FIELD_DEPTH,
            Some(_) => depth == SEGMENT_FIELD_DEPTH,
            None => false,
        };
        if let (true, Some((_, buf))) = (direct, self.capture.as_mut()) {
            buf.push_str(text);
        }
    }

    fn finish_capture(&mut self) {
        if let Some((field, text)) = self.capture.take() {
            let value = if text.is_empty() { None } else { Some(text) };
            match field {
                Field::Name => self.record.set_name(value),
                Field::SegmentId => {
                    if let Some(s) = self.record.category_path_mut().last_mut() {
                        s.set_id(value)
                    }
                }
                Field::SegmentName => {
                    if let Some(s) = self.record.category_path_mut().last_mut() {
                        s.set_name(value)
                    }
                }
            }
        }
    }
}

/// Lazy iterator over the [RawRecord]s of a catalog file.
///
/// Structural errors are yielded once, then iteration stops.
pub struct CatalogReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    origin: PathBuf,
    depth: usize,
    seen_root: bool,
    finished: bool,
}

impl CatalogReader<Box<dyn BufRead>> {
    /// Open a catalog file.
    ///
    /// Files ending in `.gz` are decompressed on the fly.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let inner: Box<dyn BufRead> = if path.extension().map_or(false, |ext| ext == "gz") {
            debug!("opening {:?} as gzip", path);
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        Ok(Self::new(inner, path))
    }
}

impl<R: BufRead> CatalogReader<R> {
    /// `origin` is only used in error messages.
    pub fn new(inner: R, origin: &Path) -> Self {
        let mut reader = Reader::from_reader(inner);
        reader.check_end_names(true);
        Self {
            reader,
            buf: Vec::new(),
            origin: origin.to_path_buf(),
            depth: 0,
            seen_root: false,
            finished: false,
        }
    }

    fn malformed(&self, reason: &str) -> Error {
        malformed(&self.origin, self.reader.buffer_position(), reason)
    }

    fn next_step(&mut self) -> Result<Step, Error> {
        self.buf.clear();
        let step = match self.reader.read_event_into(&mut self.buf) {
            Ok(Event::Start(e)) => Step::Open(e.name().as_ref().to_vec()),
            Ok(Event::Empty(e)) => Step::Leaf(e.name().as_ref().to_vec()),
            Ok(Event::End(_)) => Step::Close,
            Ok(Event::Text(t)) => match t.unescape() {
                Ok(text) => Step::Text(text.into_owned()),
                Err(e) => {
                    return Err(malformed(
                        &self.origin,
                        self.reader.buffer_position(),
                        &e.to_string(),
                    ))
                }
            },
            Ok(Event::CData(c)) => match std::str::from_utf8(&c) {
                Ok(text) => Step::Text(text.to_string()),
                Err(e) => {
                    return Err(malformed(
                        &self.origin,
                        self.reader.buffer_position(),
                        &format!("invalid CDATA: {}", e),
                    ))
                }
            },
            Ok(Event::Eof) => Step::Eof,
            Ok(_) => Step::Skip,
            Err(e) => {
                return Err(malformed(
                    &self.origin,
                    self.reader.buffer_position(),
                    &e.to_string(),
                ))
            }
        };
        Ok(step)
    }

    /// Read events until an item is complete.
    fn next_record(&mut self) -> Result<Option<RawRecord>, Error> {
        let mut item: Option<ItemState> = None;
        loop {
            match self.next_step()? {
                Step::Open(tag) => {
                    self.depth += 1;
                    match self.depth {
                        1 => self.seen_root = true,
                        ITEM_DEPTH => item = Some(ItemState::default()),
                        depth => {
                            if let Some(state) = item.as_mut() {
                                state.open(&tag, depth);
                            }
                        }
                    }
                }
                Step::Leaf(tag) => match self.depth + 1 {
                    1 => self.seen_root = true,
                    ITEM_DEPTH => return Ok(Some(RawRecord::default())),
                    depth => {
                        if let Some(state) = item.as_mut() {
                            state.open(&tag, depth);
                            state.close(depth);
                        }
                    }
                },
                Step::Close => {
                    if self.depth == 0 {
                        return Err(self.malformed("unexpected closing tag"));
                    }
                    let closed = self.depth;
                    self.depth -= 1;
                    if closed == ITEM_DEPTH {
                        return Ok(item.take().map(|state| state.record));
                    }
                    if let Some(state) = item.as_mut() {
                        state.close(closed);
                    }
                }
                Step::Text(text) => {
                    if let Some(state) = item.as_mut() {
                        state.text(&text, self.depth);
                    }
                }
                Step::Eof => {
                    if self.depth > 0 {
                        return Err(self.malformed("unexpected end of file"));
                    }
                    if !self.seen_root {
                        return Err(self.malformed("no root element"));
                    }
                    return Ok(None);
                }
                Step::Skip => (),
            }
        }
    }
}

impl<R: BufRead> Iterator for CatalogReader<R> {
    type Item = Result<RawRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use flate2::{write::GzEncoder, Compression};

    use super::*;

    fn read(xml: &str) -> Vec<Result<RawRecord, Error>> {
        CatalogReader::new(Cursor::new(xml.as_bytes().to_vec()), Path::new("test.xml")).collect()
    }

    const CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<products>
  <product>
    <sku>1234</sku>
    <name>Wireless-Mouse
2.4GHz</name>
    <categoryPath>
      <category><id>cat00000</id><name>Best Buy</name></category>
      <category><id>abcat0100000</id><name>Electronics</name></category>
      <category><id>abcat0101000</id><name>Computer Mice</name></category>
    </categoryPath>
    <details><detail><name>Color</name></detail></details>
  </product>
  <product>
    <name>Orphan</name>
  </product>
</products>"#;

    #[test]
    fn reads_items() {
        let records: Vec<RawRecord> = read(CATALOG).into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.name(), Some("Wireless-Mouse\n2.4GHz"));
        assert_eq!(first.category_path().len(), 3);
        assert_eq!(first.leaf().unwrap().id(), Some("abcat0101000"));
        assert_eq!(first.leaf().unwrap().name(), Some("Computer Mice"));

        let second = &records[1];
        assert_eq!(second.name(), Some("Orphan"));
        assert!(second.category_path().is_empty());
    }

    #[test]
    fn nested_names_are_ignored() {
        let xml = "<products><product><details><name>Color</name></details></product></products>";
        let records: Vec<RawRecord> = read(xml).into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(records, vec![RawRecord::default()]);
    }

    #[test]
    fn first_name_wins() {
        let xml = "<p><i><name>first</name><name>second</name></i></p>";
        let records: Vec<RawRecord> = read(xml).into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(records[0].name(), Some("first"));
    }

    #[test]
    fn empty_elements() {
        let xml = r#"<products>
            <product/>
            <product><name/><categoryPath/></product>
            <product><name></name><categoryPath><category><id/><name>Leaf</name></category></categoryPath></product>
        </products>"#;
        let records: Vec<RawRecord> = read(xml).into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], RawRecord::default());
        assert_eq!(records[1], RawRecord::default());
        assert_eq!(records[2].name(), None);
        assert_eq!(
            records[2].category_path(),
            &[CategoryPathSegment::new(None, Some("Leaf".to_string()))]
        );
    }

    #[test]
    fn positional_segment_fields() {
        let xml = "<r><i><categoryPath><c><a>id0</a><b>Name 0</b><z>ignored</z></c></categoryPath></i></r>";
        let records: Vec<RawRecord> = read(xml).into_iter().map(|r| r.unwrap()).collect();
        let seg = &records[0].category_path()[0];
        assert_eq!(seg.id(), Some("id0"));
        assert_eq!(seg.name(), Some("Name 0"));
    }

    #[test]
    fn escapes_and_cdata() {
        let xml = "<r><i><name>Tom &amp; Jerry <![CDATA[<DVD>]]></name></i></r>";
        let records: Vec<RawRecord> = read(xml).into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(records[0].name(), Some("Tom & Jerry <DVD>"));
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let read_bytes = |xml: &[u8]| -> Vec<Result<RawRecord, Error>> {
            CatalogReader::new(Cursor::new(xml.to_vec()), Path::new("test.xml")).collect()
        };

        for xml in [
            &b"<r><i><name><![CDATA[Mouse \xff\xfe]]></name></i></r>"[..],
            &b"<r><i><name>Mouse \xff\xfe</name></i></r>"[..],
        ] {
            let results = read_bytes(xml);
            assert_eq!(results.len(), 1);
            assert!(matches!(results[0], Err(Error::MalformedInput { .. })));
        }
    }

    #[test]
    fn mismatched_tags() {
        let results = read("<products><product><name>x</product></products>");
        let last = results.last().unwrap();
        assert!(matches!(last, Err(Error::MalformedInput { .. })));
    }

    #[test]
    fn truncated() {
        let results = read("<products><product><name>x</name></product><product>");
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::MalformedInput { .. })));
    }

    #[test]
    fn not_xml() {
        let results = read("this is not a catalog");
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn empty_root() {
        assert!(read("<products/>").is_empty());
        assert!(read("<products></products>").is_empty());
    }

    #[test]
    fn from_gzip_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.xml.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(CATALOG.as_bytes()).unwrap();
        enc.finish().unwrap();

        let records: Vec<RawRecord> = CatalogReader::from_path(&path)
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(records.len(), 2);
    }
}
