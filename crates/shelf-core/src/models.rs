//! Data models for SHELF
//!
//! Defines the book record stored in the catalog together with the
//! id-less draft used for creation and the partial patch used for edits.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A book in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    /// Unique identifier, assigned by the store
    pub id: Uuid,
    /// Book title
    #[serde(default)]
    pub title: String,
    /// Author(s) as entered
    #[serde(default)]
    pub author: String,
    /// Publication year, kept as entered (four digits)
    #[serde(default)]
    pub year: String,
    /// ISBN-13, dashed or bare
    #[serde(default)]
    pub isbn: String,
}

impl Book {
    /// Create a book from a draft with a freshly generated ID
    pub fn new(draft: BookDraft) -> Self {
        Self::with_id(Uuid::new_v4(), draft)
    }

    /// Create a book with a specific ID (for loading from storage)
    pub fn with_id(id: Uuid, draft: BookDraft) -> Self {
        Self {
            id,
            title: draft.title,
            author: draft.author,
            year: draft.year,
            isbn: draft.isbn,
        }
    }

    /// The editable fields of this book, without the ID
    pub fn draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            year: self.year.clone(),
            isbn: self.isbn.clone(),
        }
    }

    /// Merge the fields set in `patch` into this book. The ID never changes.
    pub fn apply(&mut self, patch: &BookPatch) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref author) = patch.author {
            self.author = author.clone();
        }
        if let Some(ref year) = patch.year {
            self.year = year.clone();
        }
        if let Some(ref isbn) = patch.isbn {
            self.isbn = isbn.clone();
        }
    }

    /// Get a field value by field
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Author => &self.author,
            Field::Year => &self.year,
            Field::Isbn => &self.isbn,
        }
    }

    /// Short form of the ID for listings
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}

/// The user-supplied fields of a book, before an ID is assigned
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub isbn: String,
}

impl BookDraft {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year: year.into(),
            isbn: isbn.into(),
        }
    }

    /// Get a field value by field
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Author => &self.author,
            Field::Year => &self.year,
            Field::Isbn => &self.isbn,
        }
    }

    /// Set a field value by field
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Title => self.title = value,
            Field::Author => self.author = value,
            Field::Year => self.year = value,
            Field::Isbn => self.isbn = value,
        }
    }
}

/// A partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<String>,
    pub isbn: Option<String>,
}

impl BookPatch {
    /// Patch that only changes the year
    pub fn year(year: impl Into<String>) -> Self {
        Self {
            year: Some(year.into()),
            ..Self::default()
        }
    }

    /// Patch that replaces every field with the draft's values
    pub fn from_draft(draft: BookDraft) -> Self {
        Self {
            title: Some(draft.title),
            author: Some(draft.author),
            year: Some(draft.year),
            isbn: Some(draft.isbn),
        }
    }

    /// True if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.year.is_none() && self.isbn.is_none()
    }
}

/// The editable fields of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Author,
    Year,
    Isbn,
}

impl Field {
    /// All fields, in display order
    pub const ALL: [Field; 4] = [Field::Title, Field::Author, Field::Year, Field::Isbn];

    /// Machine key, also the English CSV header
    pub fn key(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Author => "author",
            Field::Year => "year",
            Field::Isbn => "isbn",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Author => "Author",
            Field::Year => "Year",
            Field::Isbn => "ISBN",
        }
    }

    /// Japanese column label, accepted on import and used by Japanese-style exports
    pub fn japanese_label(self) -> &'static str {
        match self {
            Field::Title => "タイトル",
            Field::Author => "著者",
            Field::Year => "発行年",
            Field::Isbn => "ISBNコード",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
