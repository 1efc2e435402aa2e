//! CSV import and export
//!
//! `parse` turns CSV text into ordered rows keyed by the header row and
//! `serialize` writes rows back out. The remaining helpers map rows to and
//! from book records.
//!
//! Both directions work on whole strings; files are read completely before
//! parsing.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Terminator, Writer, WriterBuilder};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Book, BookDraft, Field};

/// One CSV record: header → cell, in column order
pub type Row = IndexMap<String, String>;

/// Errors from parsing CSV text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A record has a different number of fields than the header
    #[error("Line {line}: expected {expected} field(s) but found {found}")]
    FieldCount {
        line: u64,
        expected: u64,
        found: u64,
    },

    /// The same column name appears twice in the header row
    #[error("Duplicate column '{0}' in header row")]
    DuplicateHeader(String),

    /// Any other reader failure
    #[error("Malformed CSV: {0}")]
    Malformed(String),
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => ParseError::FieldCount {
                line: pos.as_ref().map(|p| p.line()).unwrap_or(0),
                expected: *expected_len,
                found: *len,
            },
            _ => ParseError::Malformed(err.to_string()),
        }
    }
}

/// Errors from writing CSV text
#[derive(Error, Debug)]
#[error("Failed to write CSV: {0}")]
pub struct SerializeError(String);

impl From<csv::Error> for SerializeError {
    fn from(err: csv::Error) -> Self {
        SerializeError(err.to_string())
    }
}

/// Which labels to use for the header row on export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStyle {
    /// `title,author,year,isbn`
    #[default]
    English,
    /// `タイトル,著者,発行年,ISBNコード`
    Japanese,
}

impl HeaderStyle {
    /// Header label for a field
    pub fn header(self, field: Field) -> &'static str {
        match self {
            HeaderStyle::English => field.key(),
            HeaderStyle::Japanese => field.japanese_label(),
        }
    }
}

impl fmt::Display for HeaderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderStyle::English => write!(f, "english"),
            HeaderStyle::Japanese => write!(f, "japanese"),
        }
    }
}

impl FromStr for HeaderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(HeaderStyle::English),
            "japanese" | "ja" => Ok(HeaderStyle::Japanese),
            other => Err(format!(
                "unknown header style '{}' (expected 'english' or 'japanese')",
                other
            )),
        }
    }
}

/// Parse CSV text into rows keyed by the header row
///
/// Empty lines are skipped. A leading byte-order mark is ignored.
pub fn parse(csv_text: &str) -> Result<Vec<Row>, ParseError> {
    let text = csv_text.strip_prefix('\u{feff}').unwrap_or(csv_text);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    check_unique_headers(&headers)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), cell.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

fn check_unique_headers(headers: &StringRecord) -> Result<(), ParseError> {
    let mut seen = Vec::with_capacity(headers.len());
    for header in headers.iter() {
        if seen.contains(&header) {
            return Err(ParseError::DuplicateHeader(header.to_string()));
        }
        seen.push(header);
    }
    Ok(())
}

/// Serialize rows to CSV text
///
/// The header row and column order come from the first row's keys. Cells a
/// later row lacks are written empty; keys the first row lacks are dropped.
pub fn serialize(rows: &[Row]) -> Result<String, SerializeError> {
    let Some(first) = rows.first() else {
        return Ok(String::new());
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut writer = new_writer();
    writer.write_record(&headers)?;
    for row in rows {
        writer.write_record(
            headers
                .iter()
                .map(|header| row.get(*header).map(String::as_str).unwrap_or("")),
        )?;
    }
    finish(writer)
}

fn new_writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new())
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String, SerializeError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| SerializeError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SerializeError(e.to_string()))
}

/// Map a header to the book field it holds, if any
///
/// English keys match case-insensitively; the Japanese catalog labels match
/// exactly.
pub fn field_for_header(header: &str) -> Option<Field> {
    let header = header.trim();
    Field::ALL
        .into_iter()
        .find(|f| f.key().eq_ignore_ascii_case(header) || f.japanese_label() == header)
}

/// Build a draft from a parsed row
///
/// Missing columns become empty strings and unknown columns are dropped.
/// When two columns map to the same field the first non-empty one wins.
pub fn draft_from_row(row: &Row) -> BookDraft {
    let mut draft = BookDraft::default();
    for (header, value) in row {
        if let Some(field) = field_for_header(header) {
            if draft.get(field).is_empty() {
                draft.set(field, value.as_str());
            }
        }
    }
    draft
}

/// Parse CSV text straight into drafts
pub fn drafts_from_csv(csv_text: &str) -> Result<Vec<BookDraft>, ParseError> {
    Ok(parse(csv_text)?.iter().map(draft_from_row).collect())
}

/// Project books to the four catalog columns (the id is not exported)
pub fn rows_from_books(books: &[Book], style: HeaderStyle) -> Vec<Row> {
    books
        .iter()
        .map(|book| {
            Field::ALL
                .into_iter()
                .map(|field| (style.header(field).to_string(), book.get(field).to_string()))
                .collect()
        })
        .collect()
}

/// Serialize books for export
///
/// An empty catalog still gets a header row so the file opens as a table.
pub fn books_to_csv(books: &[Book], style: HeaderStyle) -> Result<String, SerializeError> {
    if books.is_empty() {
        let mut writer = new_writer();
        writer.write_record(Field::ALL.into_iter().map(|field| style.header(field)))?;
        return finish(writer);
    }
    serialize(&rows_from_books(books, style))
}

/// File name for an export made on `date`: `{prefix}_{YYYY-MM-DD}.csv`
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, date.format("%Y-%m-%d"))
}

/// Column names of parsed rows, empty when there are no rows
pub fn columns(rows: &[Row]) -> Vec<&str> {
    rows.first()
        .map(|row| row.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Rows with `query` in any cell (case-insensitive), paired with their
/// 1-based row number
///
/// A blank query keeps every row.
pub fn filter_rows<'a>(rows: &'a [Row], query: &str) -> Vec<(usize, &'a Row)> {
    let query = query.trim().to_lowercase();
    rows.iter()
        .enumerate()
        .map(|(i, row)| (i + 1, row))
        .filter(|(_, row)| {
            query.is_empty() || row.values().any(|cell| cell.to_lowercase().contains(&query))
        })
        .collect()
}
