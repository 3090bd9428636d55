//! Newline-delimited JSON record reader.
//!
//! Source files may interleave bulk-action header lines
//! (`{"index": {"_index": "movies"}}`) with data records, the way `_bulk`
//! dump files do. Headers are discarded here; the index client regenerates
//! them per document with its own `_index` and `_id`.

use std::io::{BufRead, Lines};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::MovieDoc;

/// Iterator over an NDJSON source yielding parsed `MovieDoc` records.
///
/// Blank lines are skipped. Action-header lines are counted and skipped.
/// A malformed line yields `Error::Parse` carrying its 1-based line number.
pub struct RecordReader<R> {
    lines: Lines<R>,
    line_no: usize,
    headers_skipped: usize,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: reader.lines(), line_no: 0, headers_skipped: 0 }
    }

    /// Action-header lines recognized so far.
    pub fn headers_skipped(&self) -> usize {
        self.headers_skipped
    }
}

/// A bulk-action header is an object whose only key is `index` mapping to an
/// object. Data records never match: they carry a `title` alongside anything
/// else.
fn is_action_header(value: &Value) -> bool {
    value
        .as_object()
        .map(|obj| obj.len() == 1 && obj.get("index").is_some_and(Value::is_object))
        .unwrap_or(false)
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<MovieDoc>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(Error::Io(e))),
            };
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let value: Value = match serde_json::from_str(trimmed) {
                Ok(v) => v,
                Err(e) => return Some(Err(Error::Parse { line: self.line_no, source: e })),
            };
            if is_action_header(&value) {
                self.headers_skipped += 1;
                continue;
            }
            return Some(
                serde_json::from_value::<MovieDoc>(value)
                    .map_err(|e| Error::Parse { line: self.line_no, source: e }),
            );
        }
    }
}
