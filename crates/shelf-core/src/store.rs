//! Record store
//!
//! The `BookStore` keeps the whole catalog as one JSON array in a single
//! slot. Every mutation reads the full collection, applies the change and
//! writes the full collection back; there is a single writer, so no locking.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = BookStore::open()?;  // file slots in the data directory
//!
//! let book = store.add(BookDraft::new("Kokoro", "Natsume Soseki", "1914", "9784061820098"))?;
//! assert_eq!(store.get_by_id(book.id)?, Some(book));
//! ```
//!
//! Tests and embedders can pass any `SlotStore`, e.g. `MemorySlots`.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Book, BookDraft, BookPatch, Field};
use crate::notice::{self, Notice};
use crate::storage::{FileSlots, SlotStore, StorageError};

/// Slot holding the book collection
pub const BOOKS_KEY: &str = "books";

/// CRUD interface over the persisted catalog
#[derive(Debug)]
pub struct BookStore<S: SlotStore = FileSlots> {
    slots: S,
}

impl BookStore<FileSlots> {
    /// Open the store in the configured data directory
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(&config)
    }

    /// Open the store with a specific configuration
    pub fn open_with_config(config: &Config) -> Result<Self> {
        let slots = FileSlots::open(config).context("Failed to open data directory")?;
        Ok(Self::new(slots))
    }
}

impl<S: SlotStore> BookStore<S> {
    /// Create a store over the given slots
    pub fn new(slots: S) -> Self {
        Self { slots }
    }

    /// Access the underlying slots
    pub fn slots(&self) -> &S {
        &self.slots
    }

    // ==================== Reads ====================

    /// Get all books in insertion order
    pub fn get_all(&self) -> Result<Vec<Book>> {
        let Some(content) = self
            .slots
            .read(BOOKS_KEY)
            .context("Failed to read book collection")?
        else {
            return Ok(Vec::new());
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let books: Vec<Book> =
            serde_json::from_str(&content).map_err(|e| StorageError::InvalidFormat {
                key: BOOKS_KEY.to_string(),
                details: e.to_string(),
            })?;

        let mut seen = HashSet::with_capacity(books.len());
        if !books.iter().all(|b| seen.insert(b.id)) {
            warn!("Book collection contains duplicate ids");
        }

        debug!(count = books.len(), "Loaded book collection");
        Ok(books)
    }

    /// Get a book by ID
    pub fn get_by_id(&self, id: Uuid) -> Result<Option<Book>> {
        Ok(self.get_all()?.into_iter().find(|b| b.id == id))
    }

    /// Count stored books
    pub fn count(&self) -> Result<usize> {
        Ok(self.get_all()?.len())
    }

    /// Search title, author, year and ISBN, case-insensitive
    ///
    /// A blank query matches every book.
    pub fn search(&self, query: &str) -> Result<Vec<Book>> {
        let query = query.trim().to_lowercase();
        let books = self.get_all()?;
        if query.is_empty() {
            return Ok(books);
        }

        Ok(books
            .into_iter()
            .filter(|book| {
                Field::ALL
                    .into_iter()
                    .any(|field| book.get(field).to_lowercase().contains(&query))
            })
            .collect())
    }

    /// Resolve a full ID or unique ID prefix to a stored book's ID
    pub fn resolve_id(&self, id: &str) -> Result<Uuid> {
        let id = id.trim();
        if let Ok(uuid) = Uuid::parse_str(id) {
            return Ok(uuid);
        }
        if id.is_empty() {
            bail!("No book ID given");
        }

        let prefix = id.to_lowercase();
        let books = self.get_all()?;
        let matches: Vec<&Book> = books
            .iter()
            .filter(|b| b.id.to_string().starts_with(&prefix))
            .collect();

        match matches.as_slice() {
            [] => bail!("No book found matching: {}", id),
            [book] => Ok(book.id),
            many => {
                let candidates: Vec<String> = many
                    .iter()
                    .map(|b| format!("  {} - {}", b.id, b.title))
                    .collect();
                bail!(
                    "Ambiguous ID '{}' matches:\n{}\nPlease provide more characters.",
                    id,
                    candidates.join("\n")
                )
            }
        }
    }

    // ==================== Mutations ====================

    /// Add a book, assigning a fresh ID
    pub fn add(&mut self, draft: BookDraft) -> Result<Book> {
        let mut books = self.get_all()?;
        let id = fresh_id(&books.iter().map(|b| b.id).collect());
        let book = Book::with_id(id, draft);

        books.push(book.clone());
        self.save_all(&books).context("Failed to add book")?;

        info!(id = %book.id, "Added book");
        Ok(book)
    }

    /// Merge `patch` into the book with `id`
    ///
    /// Returns the updated book, or `None` if no book has that ID.
    pub fn update(&mut self, id: Uuid, patch: &BookPatch) -> Result<Option<Book>> {
        let mut books = self.get_all()?;
        let Some(book) = books.iter_mut().find(|b| b.id == id) else {
            debug!(%id, "Update target not found");
            return Ok(None);
        };

        book.apply(patch);
        let updated = book.clone();
        self.save_all(&books).context("Failed to update book")?;

        info!(%id, "Updated book");
        Ok(Some(updated))
    }

    /// Delete the book with `id`. Returns whether a book was removed.
    pub fn delete(&mut self, id: Uuid) -> Result<bool> {
        let mut books = self.get_all()?;
        let before = books.len();
        books.retain(|b| b.id != id);

        if books.len() == before {
            debug!(%id, "Delete target not found");
            return Ok(false);
        }

        self.save_all(&books).context("Failed to delete book")?;
        info!(%id, "Deleted book");
        Ok(true)
    }

    /// Replace the whole catalog with the given drafts, assigning fresh IDs
    pub fn import_all(&mut self, drafts: Vec<BookDraft>) -> Result<Vec<Book>> {
        let mut ids = HashSet::with_capacity(drafts.len());
        let books: Vec<Book> = drafts
            .into_iter()
            .map(|draft| {
                let id = fresh_id(&ids);
                ids.insert(id);
                Book::with_id(id, draft)
            })
            .collect();

        self.save_all(&books).context("Failed to import books")?;
        info!(count = books.len(), "Imported books, replacing catalog");
        Ok(books)
    }

    /// Remove every book
    pub fn clear(&mut self) -> Result<()> {
        self.slots
            .remove(BOOKS_KEY)
            .context("Failed to clear book collection")?;
        info!("Cleared catalog");
        Ok(())
    }

    // ==================== Notices ====================

    /// Raise a one-shot notice for the next listing
    pub fn raise_notice(&mut self, notice: Notice) -> Result<()> {
        notice::raise(&mut self.slots, notice).context("Failed to save notice")
    }

    /// Take (and clear) every raised notice
    pub fn take_notices(&mut self) -> Result<Vec<Notice>> {
        notice::take_all(&mut self.slots).context("Failed to read notices")
    }

    /// Write the whole collection back
    fn save_all(&mut self, books: &[Book]) -> Result<()> {
        let json = serde_json::to_string(books).context("Failed to serialize books")?;
        self.slots.write(BOOKS_KEY, &json)?;
        debug!(count = books.len(), "Saved book collection");
        Ok(())
    }
}

/// Generate a UUID not already in `taken`
fn fresh_id(taken: &HashSet<Uuid>) -> Uuid {
    loop {
        let id = Uuid::new_v4();
        if !taken.contains(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySlots;

    fn store() -> BookStore<MemorySlots> {
        BookStore::new(MemorySlots::new())
    }

    fn kokoro() -> BookDraft {
        BookDraft::new("Kokoro", "Natsume Soseki", "1914", "978-4-06-182009-8")
    }

    fn botchan() -> BookDraft {
        BookDraft::new("Botchan", "Natsume Soseki", "1906", "9784061820098")
    }

    fn snow_country() -> BookDraft {
        BookDraft::new("Snow Country", "Yasunari Kawabata", "1948", "9784061820098")
    }

    #[test]
    fn test_empty_store() {
        let store = store();
        assert!(store.get_all().unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_add_and_get_by_id() {
        let mut store = store();

        let book = store.add(kokoro()).unwrap();
        assert_eq!(book.title, "Kokoro");

        let retrieved = store.get_by_id(book.id).unwrap().unwrap();
        assert_eq!(retrieved, book);
    }

    #[test]
    fn test_get_by_id_missing() {
        let mut store = store();
        store.add(kokoro()).unwrap();
        assert!(store.get_by_id(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_insertion_order() {
        let mut store = store();
        store.add(snow_country()).unwrap();
        store.add(kokoro()).unwrap();
        store.add(botchan()).unwrap();

        let titles: Vec<String> = store
            .get_all()
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Snow Country", "Kokoro", "Botchan"]);
    }

    #[test]
    fn test_ids_unique() {
        let mut store = store();
        for _ in 0..20 {
            store.add(kokoro()).unwrap();
        }
        let ids: HashSet<Uuid> = store.get_all().unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn test_update_only_changes_patched_fields() {
        let mut store = store();
        let book = store.add(kokoro()).unwrap();

        let updated = store
            .update(book.id, &BookPatch::year("1999"))
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, book.id);
        assert_eq!(updated.year, "1999");
        assert_eq!(updated.title, book.title);
        assert_eq!(updated.author, book.author);
        assert_eq!(updated.isbn, book.isbn);
        assert_eq!(store.get_by_id(book.id).unwrap().unwrap(), updated);
    }

    #[test]
    fn test_update_keeps_position() {
        let mut store = store();
        store.add(kokoro()).unwrap();
        let middle = store.add(botchan()).unwrap();
        store.add(snow_country()).unwrap();

        store
            .update(middle.id, &BookPatch::from_draft(snow_country()))
            .unwrap();

        let books = store.get_all().unwrap();
        assert_eq!(books[1].id, middle.id);
        assert_eq!(books[1].title, "Snow Country");
    }

    #[test]
    fn test_update_missing() {
        let mut store = store();
        store.add(kokoro()).unwrap();
        let before = store.get_all().unwrap();

        assert!(store
            .update(Uuid::new_v4(), &BookPatch::year("1999"))
            .unwrap()
            .is_none());
        assert_eq!(store.get_all().unwrap(), before);
    }

    #[test]
    fn test_delete() {
        let mut store = store();
        let keep = store.add(kokoro()).unwrap();
        let gone = store.add(botchan()).unwrap();

        assert!(store.delete(gone.id).unwrap());
        assert_eq!(store.get_all().unwrap(), vec![keep]);
        assert!(store.get_by_id(gone.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_leaves_collection_unchanged() {
        let mut store = store();
        store.add(kokoro()).unwrap();
        store.add(botchan()).unwrap();
        let before = store.get_all().unwrap();

        assert!(!store.delete(Uuid::new_v4()).unwrap());
        assert_eq!(store.get_all().unwrap(), before);
    }

    #[test]
    fn test_import_all_replaces_catalog() {
        let mut store = store();
        let old = store.add(kokoro()).unwrap();

        let imported = store.import_all(vec![botchan(), snow_country()]).unwrap();

        let books = store.get_all().unwrap();
        assert_eq!(books, imported);
        assert_eq!(books.len(), 2);
        assert!(store.get_by_id(old.id).unwrap().is_none());
        assert_eq!(books[0].draft(), botchan());
        assert_ne!(books[0].id, books[1].id);
    }

    #[test]
    fn test_import_empty() {
        let mut store = store();
        store.add(kokoro()).unwrap();
        store.import_all(Vec::new()).unwrap();
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_clear() {
        let mut store = store();
        store.add(kokoro()).unwrap();
        store.clear().unwrap();
        assert!(store.get_all().unwrap().is_empty());
        // Clearing an empty store is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_search() {
        let mut store = store();
        store.add(kokoro()).unwrap();
        store.add(botchan()).unwrap();
        store.add(snow_country()).unwrap();

        assert_eq!(store.search("soseki").unwrap().len(), 2);
        assert_eq!(store.search("KAWABATA").unwrap().len(), 1);
        assert_eq!(store.search("1906").unwrap()[0].title, "Botchan");
        assert_eq!(store.search("182009").unwrap().len(), 1);
        assert_eq!(store.search("  ").unwrap().len(), 3);
        assert!(store.search("tolstoy").unwrap().is_empty());
    }

    #[test]
    fn test_resolve_id() {
        let mut store = store();
        let book = store.add(kokoro()).unwrap();

        assert_eq!(store.resolve_id(&book.id.to_string()).unwrap(), book.id);
        assert_eq!(store.resolve_id(&book.short_id()).unwrap(), book.id);
        assert_eq!(
            store.resolve_id(&book.short_id().to_uppercase()).unwrap(),
            book.id
        );
        assert!(store.resolve_id("zzzz").is_err());
        assert!(store.resolve_id("").is_err());
    }

    #[test]
    fn test_resolve_id_ambiguous() {
        let mut slots = MemorySlots::new();
        slots
            .write(
                BOOKS_KEY,
                r#"[
                    {"id":"abcd1234-0000-4000-8000-000000000001","title":"Kokoro"},
                    {"id":"abcd5678-0000-4000-8000-000000000002","title":"Botchan"}
                ]"#,
            )
            .unwrap();
        let store = BookStore::new(slots);

        let err = store.resolve_id("abcd").unwrap_err();
        assert!(err.to_string().contains("Ambiguous"));
        assert!(err.to_string().contains("Botchan"));

        assert_eq!(
            store.resolve_id("abcd5").unwrap().to_string(),
            "abcd5678-0000-4000-8000-000000000002"
        );
    }

    #[test]
    fn test_corrupt_collection_is_an_error() {
        let mut slots = MemorySlots::new();
        slots.write(BOOKS_KEY, "{not json").unwrap();
        let store = BookStore::new(slots);

        let err = store.get_all().unwrap_err();
        assert!(err.to_string().contains("Invalid data in slot 'books'"));
    }

    #[test]
    fn test_blank_slot_reads_as_empty() {
        let mut slots = MemorySlots::new();
        slots.write(BOOKS_KEY, "").unwrap();
        let store = BookStore::new(slots);
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_notices() {
        let mut store = store();
        store.raise_notice(Notice::Updated).unwrap();

        assert_eq!(store.take_notices().unwrap(), vec![Notice::Updated]);
        assert!(store.take_notices().unwrap().is_empty());
    }
}
