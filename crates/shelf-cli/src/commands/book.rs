//! Book command handlers

use anyhow::{anyhow, bail, Context, Result};

use shelf_core::{
    validate_draft_now, BookDraft, BookPatch, BookStore, Field, Notice, SlotStore,
};

use crate::editor::{self, confirm, prompt_with_default};
use crate::output::{Output, OutputFormat};

/// List books, showing any pending notices first
pub fn list<S: SlotStore>(
    store: &mut BookStore<S>,
    search: Option<String>,
    output: &Output,
) -> Result<()> {
    for notice in store.take_notices()? {
        output.notice(notice.message());
    }

    let books = match search {
        Some(ref query) => store.search(query)?,
        None => store.get_all()?,
    };

    output.print_books(&books);
    Ok(())
}

/// Show a single book
pub fn show<S: SlotStore>(store: &BookStore<S>, id: String, output: &Output) -> Result<()> {
    let uuid = store.resolve_id(&id)?;

    let book = store
        .get_by_id(uuid)?
        .ok_or_else(|| anyhow!("Book not found: {}", id))?;

    output.print_book(&book);
    Ok(())
}

/// Register a new book
///
/// Fields not given as flags are prompted for on a terminal.
pub fn add<S: SlotStore>(
    store: &mut BookStore<S>,
    fields: BookPatch,
    output: &Output,
) -> Result<()> {
    let draft = collect_draft(fields, output)?;
    let cleaned = validate_or_report(&draft, output, "Book not registered")?;

    if output.should_prompt() {
        output.print_pending("New book:", &cleaned);
        if !confirm("Register this book?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let book = store.add(cleaned).context("Failed to register book")?;
    store.raise_notice(Notice::Registered)?;

    output.success(&format!("Registered book: {}", book.id));
    output.print_book(&book);

    Ok(())
}

/// Edit a book
///
/// With no field flags, each field is prompted for with its current value.
pub fn edit<S: SlotStore>(
    store: &mut BookStore<S>,
    id: String,
    fields: BookPatch,
    output: &Output,
) -> Result<()> {
    let uuid = store.resolve_id(&id)?;

    let book = store
        .get_by_id(uuid)?
        .ok_or_else(|| anyhow!("Book not found: {}", id))?;

    let patch = if fields.is_empty() {
        if !can_prompt(output) {
            bail!("Nothing to change. Pass --title, --author, --year or --isbn.");
        }
        prompt_patch(&book.draft(), &book.id.to_string())?
    } else {
        fields
    };

    let mut merged = book.clone();
    merged.apply(&patch);
    let cleaned = validate_or_report(&merged.draft(), output, "Book not updated")?;

    if cleaned == book.draft() {
        output.message("No changes.");
        return Ok(());
    }

    if output.should_prompt() {
        output.print_pending("Updated book:", &cleaned);
        if !confirm("Save these changes?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let updated = store
        .update(uuid, &BookPatch::from_draft(cleaned))
        .context("Failed to update book")?
        .ok_or_else(|| anyhow!("Book not found: {}", id))?;
    store.raise_notice(Notice::Updated)?;

    output.success(&format!("Updated book: {}", updated.id));
    output.print_book(&updated);

    Ok(())
}

/// Delete a book
pub fn delete<S: SlotStore>(store: &mut BookStore<S>, id: String, output: &Output) -> Result<()> {
    let uuid = store.resolve_id(&id)?;

    let book = store
        .get_by_id(uuid)?
        .ok_or_else(|| anyhow!("Book not found: {}", id))?;

    if output.should_prompt() {
        println!("Delete book: {} - {}", book.short_id(), book.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if !store.delete(uuid).context("Failed to delete book")? {
        bail!("Book not found: {}", id);
    }

    output.success(&format!("Deleted book: {}", uuid));

    Ok(())
}

/// Delete every book
pub fn clear<S: SlotStore>(store: &mut BookStore<S>, output: &Output) -> Result<()> {
    let count = store.count()?;
    if count == 0 {
        output.message("Catalog is already empty.");
        return Ok(());
    }

    if output.should_prompt() {
        println!("Delete all {} book(s)? This cannot be undone.", count);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.clear()?;
    output.success(&format!("Deleted {} book(s)", count));

    Ok(())
}

/// Prompting for field values only happens in human mode on a terminal
fn can_prompt(output: &Output) -> bool {
    output.format == OutputFormat::Human && editor::is_interactive()
}

/// Build a draft from the given flags, prompting for the rest when possible
fn collect_draft(fields: BookPatch, output: &Output) -> Result<BookDraft> {
    let interactive = can_prompt(output);
    let given = [
        (Field::Title, fields.title),
        (Field::Author, fields.author),
        (Field::Year, fields.year),
        (Field::Isbn, fields.isbn),
    ];

    let mut draft = BookDraft::default();
    for (field, value) in given {
        let value = match value {
            Some(v) => v,
            None if interactive => editor::prompt(field.label())?,
            None => String::new(),
        };
        draft.set(field, value);
    }
    Ok(draft)
}

/// Prompt for every field, keeping the current value on empty input
fn prompt_patch(current: &BookDraft, id: &str) -> Result<BookPatch> {
    println!("Editing book: {}", id);
    println!("Press Enter to keep current value, or type new value.\n");

    let mut draft = current.clone();
    for field in Field::ALL {
        if let Some(value) = prompt_with_default(field.label(), current.get(field))? {
            draft.set(field, value);
        }
    }
    Ok(BookPatch::from_draft(draft))
}

/// Validate a draft, printing per-field errors on failure
fn validate_or_report(draft: &BookDraft, output: &Output, action: &str) -> Result<BookDraft> {
    validate_draft_now(draft).map_err(|errors| {
        output.print_validation_errors(&errors);
        anyhow!("{}: {} invalid field(s)", action, errors.len())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::MemorySlots;

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet, true)
    }

    fn store_with_kokoro() -> (BookStore<MemorySlots>, String) {
        let mut store = BookStore::new(MemorySlots::new());
        let book = store
            .add(BookDraft::new(
                "Kokoro",
                "Natsume Soseki",
                "1914",
                "978-4-06-182009-8",
            ))
            .unwrap();
        (store, book.id.to_string())
    }

    fn kokoro_fields() -> BookPatch {
        BookPatch {
            title: Some("  Kokoro ".to_string()),
            author: Some("Natsume Soseki".to_string()),
            year: Some("1914".to_string()),
            isbn: Some("9784061820098".to_string()),
        }
    }

    #[test]
    fn test_add_registers_trimmed_book_and_raises_notice() {
        let mut store = BookStore::new(MemorySlots::new());
        add(&mut store, kokoro_fields(), &quiet()).unwrap();

        let books = store.get_all().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Kokoro");
        assert_eq!(store.take_notices().unwrap(), vec![Notice::Registered]);
    }

    #[test]
    fn test_add_invalid_saves_nothing() {
        let mut store = BookStore::new(MemorySlots::new());
        let fields = BookPatch {
            year: Some("19".to_string()),
            ..kokoro_fields()
        };

        let err = add(&mut store, fields, &quiet()).unwrap_err();
        assert!(err.to_string().contains("1 invalid field(s)"));
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.take_notices().unwrap().is_empty());
    }

    #[test]
    fn test_add_missing_fields_without_terminal() {
        let mut store = BookStore::new(MemorySlots::new());
        let fields = BookPatch {
            title: Some("Kokoro".to_string()),
            ..BookPatch::default()
        };

        let err = add(&mut store, fields, &quiet()).unwrap_err();
        assert!(err.to_string().contains("3 invalid field(s)"));
    }

    #[test]
    fn test_edit_by_prefix() {
        let (mut store, id) = store_with_kokoro();
        edit(&mut store, id[..8].to_string(), BookPatch::year("1915"), &quiet()).unwrap();

        let book = store.get_all().unwrap().remove(0);
        assert_eq!(book.id.to_string(), id);
        assert_eq!(book.year, "1915");
        assert_eq!(book.title, "Kokoro");
        assert_eq!(store.take_notices().unwrap(), vec![Notice::Updated]);
    }

    #[test]
    fn test_edit_invalid_keeps_stored_book() {
        let (mut store, id) = store_with_kokoro();
        let patch = BookPatch {
            isbn: Some("1234567890123".to_string()),
            ..BookPatch::default()
        };

        assert!(edit(&mut store, id, patch, &quiet()).is_err());
        assert_eq!(store.get_all().unwrap()[0].isbn, "978-4-06-182009-8");
        assert!(store.take_notices().unwrap().is_empty());
    }

    #[test]
    fn test_edit_without_fields_needs_terminal() {
        let (mut store, id) = store_with_kokoro();
        let err = edit(&mut store, id, BookPatch::default(), &quiet()).unwrap_err();
        assert!(err.to_string().contains("Nothing to change"));
    }

    #[test]
    fn test_edit_unknown_id() {
        let (mut store, _) = store_with_kokoro();
        assert!(edit(&mut store, "zzzz".to_string(), BookPatch::year("1915"), &quiet()).is_err());
    }

    #[test]
    fn test_delete() {
        let (mut store, id) = store_with_kokoro();
        delete(&mut store, id.clone(), &quiet()).unwrap();
        assert_eq!(store.count().unwrap(), 0);

        assert!(delete(&mut store, id, &quiet()).is_err());
    }

    #[test]
    fn test_clear() {
        let (mut store, _) = store_with_kokoro();
        clear(&mut store, &quiet()).unwrap();
        assert_eq!(store.count().unwrap(), 0);

        // Already empty is fine
        clear(&mut store, &quiet()).unwrap();
    }

    #[test]
    fn test_list_consumes_notices() {
        let (mut store, _) = store_with_kokoro();
        store.raise_notice(Notice::Registered).unwrap();

        list(&mut store, None, &quiet()).unwrap();
        assert!(store.take_notices().unwrap().is_empty());
    }
}
