// src/parse/mod.rs
use csv::{ByteRecord, ReaderBuilder};
use std::io::Cursor;
use tracing::{debug, instrument};

use crate::error::TableError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Raw parser output: row 0 is the header row, `None` is an absent cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInput {
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawInput {
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// Build from fully-present string cells.
    pub fn from_strings<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|cell| Some(cell.into())).collect())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Fixed delimiter; `None` means detect from the first line.
    pub delimiter: Option<u8>,
}

/// Guess the delimiter from the first line. Comma wins whenever it is present.
pub fn detect_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let has = |c: u8| first_line.contains(&c);

    if has(b',') {
        b','
    } else if has(b';') {
        b';'
    } else if has(b'\t') {
        b'\t'
    } else {
        b','
    }
}

/// Parse delimited text into rows of raw cells. The first record is not treated as a header;
/// the normalizer does its own header extraction.
#[instrument(level = "debug", skip(bytes), fields(len = bytes.len()))]
pub fn parse_bytes(bytes: &[u8], options: &ParseOptions) -> Result<RawInput, TableError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let delimiter = options.delimiter.unwrap_or_else(|| detect_delimiter(bytes));

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(Cursor::new(bytes));

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    let mut skipped = 0usize;
    while rdr.read_byte_record(&mut record)? {
        if record.iter().all(|field| field.trim_ascii().is_empty()) {
            skipped += 1;
            continue;
        }
        rows.push(
            record
                .iter()
                .map(|field| Some(String::from_utf8_lossy(field).into_owned()))
                .collect(),
        );
    }

    debug!(
        rows = rows.len(),
        skipped,
        delimiter = %(delimiter as char).escape_default(),
        "parsed delimited input"
    );
    Ok(RawInput { rows })
}
