//! Book form validation
//!
//! Checks the user-entered fields of a book before it is saved. Validation
//! never touches the store; callers decide what to do with the errors.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Local};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{BookDraft, Field};

/// Earliest accepted publication year
pub const MIN_YEAR: i32 = 1000;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}$").expect("valid year regex"));
static DASHED_ISBN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^978-[0-9]-[0-9]{2}-[0-9]{6}-[0-9]$").expect("valid dashed isbn regex")
});
static BARE_ISBN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{13}$").expect("valid bare isbn regex"));

/// Per-field validation failures, ordered by field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field (first error per field wins)
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    /// Error message for a field, if it failed
    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over failing fields in display order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, msg)| format!("{}: {}", field.key(), msg))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a draft against the given current year
///
/// Values are trimmed. On success the trimmed draft is returned.
pub fn validate_draft(draft: &BookDraft, current_year: i32) -> Result<BookDraft, ValidationErrors> {
    let trimmed = BookDraft::new(
        draft.title.trim(),
        draft.author.trim(),
        draft.year.trim(),
        draft.isbn.trim(),
    );

    let mut errors = ValidationErrors::new();

    if trimmed.title.is_empty() {
        errors.add(Field::Title, "Title is required.");
    }
    if trimmed.author.is_empty() {
        errors.add(Field::Author, "Author is required.");
    }
    if let Err(msg) = validate_year(&trimmed.year, current_year) {
        errors.add(Field::Year, msg);
    }
    if let Err(msg) = validate_isbn(&trimmed.isbn) {
        errors.add(Field::Isbn, msg);
    }

    if errors.is_empty() {
        Ok(trimmed)
    } else {
        Err(errors)
    }
}

/// Validate a draft against the local clock's current year
pub fn validate_draft_now(draft: &BookDraft) -> Result<BookDraft, ValidationErrors> {
    validate_draft(draft, current_year())
}

/// Current year from the local clock
pub fn current_year() -> i32 {
    Local::now().year()
}

/// Validate a publication year: exactly four digits, 1000..=current_year+1
pub fn validate_year(year: &str, current_year: i32) -> Result<(), String> {
    let year = year.trim();
    if year.is_empty() {
        return Err("Year is required.".to_string());
    }
    if !YEAR_RE.is_match(year) {
        return Err("Year must be exactly 4 digits.".to_string());
    }

    let max = current_year + 1;
    match year.parse::<i32>() {
        Ok(n) if (MIN_YEAR..=max).contains(&n) => Ok(()),
        _ => Err(format!("Year must be between {} and {}.", MIN_YEAR, max)),
    }
}

/// Validate an ISBN-13
///
/// Accepts the dashed `978-D-DD-DDDDDD-D` form or 13 digits once dashes are
/// removed. The digits must carry a 978/979 prefix and a correct check digit.
pub fn validate_isbn(isbn: &str) -> Result<(), String> {
    let isbn = isbn.trim();
    if isbn.is_empty() {
        return Err("ISBN is required.".to_string());
    }

    let digits = isbn.replace('-', "");
    if !DASHED_ISBN_RE.is_match(isbn) && !BARE_ISBN_RE.is_match(&digits) {
        return Err("ISBN format is invalid (e.g. 978-4-06-182009-8).".to_string());
    }
    if !digits.starts_with("978") && !digits.starts_with("979") {
        return Err("ISBN must start with 978 or 979.".to_string());
    }
    if !has_valid_check_digit(&digits) {
        return Err("ISBN check digit is invalid.".to_string());
    }
    Ok(())
}

/// ISBN-13 checksum: digits weighted 1,3,1,3,... sum to a multiple of 10
fn has_valid_check_digit(digits: &str) -> bool {
    let values: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
    if values.len() != 13 {
        return false;
    }
    let sum: u32 = values
        .iter()
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { *d } else { d * 3 })
        .sum();
    sum % 10 == 0
}
