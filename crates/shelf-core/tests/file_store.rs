use std::fs;
use std::path::PathBuf;

use shelf_core::csv_bridge::{books_to_csv, drafts_from_csv, parse};
use shelf_core::{
    validate_draft, BookDraft, BookPatch, BookStore, Config, HeaderStyle, Notice,
};
use tempfile::TempDir;

fn test_config(temp_dir: &TempDir) -> Config {
    Config {
        data_dir: temp_dir.path().join("data"),
        export_dir: Some(temp_dir.path().join("exports")),
        ..Config::default()
    }
}

fn kokoro() -> BookDraft {
    BookDraft::new("Kokoro", "Natsume Soseki", "1914", "978-4-06-182009-8")
}

#[test]
fn data_persists_across_reopens() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);

    let id = {
        let mut store = BookStore::open_with_config(&config).unwrap();
        store.add(kokoro()).unwrap().id
    };

    let store = BookStore::open_with_config(&config).unwrap();
    let book = store.get_by_id(id).unwrap().unwrap();
    assert_eq!(book.title, "Kokoro");
    assert!(config.data_dir.join("books.json").exists());
}

#[test]
fn collection_is_a_json_array_of_records() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let mut store = BookStore::open_with_config(&config).unwrap();
    let book = store.add(kokoro()).unwrap();

    let raw = fs::read_to_string(config.data_dir.join("books.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], book.id.to_string());
    assert_eq!(records[0]["isbn"], "978-4-06-182009-8");
}

#[test]
fn edit_flow_updates_in_place() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = BookStore::open_with_config(&test_config(&temp_dir)).unwrap();
    let book = store.add(kokoro()).unwrap();

    let mut merged = book.clone();
    merged.apply(&BookPatch::year("1999"));
    let cleaned = validate_draft(&merged.draft(), 2026).unwrap();

    let updated = store
        .update(book.id, &BookPatch::from_draft(cleaned))
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, book.id);
    assert_eq!(updated.year, "1999");
    assert_eq!(updated.title, "Kokoro");
}

#[test]
fn import_file_replaces_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = BookStore::open_with_config(&test_config(&temp_dir)).unwrap();
    store.add(kokoro()).unwrap();

    let csv_path = temp_dir.path().join("import.csv");
    fs::write(
        &csv_path,
        "タイトル,著者,発行年,ISBNコード\n\
         ノルウェイの森,村上春樹,1987,978-4-06-182009-8\n\
         \n\
         雪国,川端康成,1948,9784061820098\n",
    )
    .unwrap();

    let text = fs::read_to_string(&csv_path).unwrap();
    let drafts = drafts_from_csv(&text).unwrap();
    store.import_all(drafts).unwrap();

    let books = store.get_all().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].title, "ノルウェイの森");
    assert_eq!(books[1].author, "川端康成");
    assert!(books.iter().all(|b| b.title != "Kokoro"));
}

#[test]
fn malformed_import_leaves_catalog_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = BookStore::open_with_config(&test_config(&temp_dir)).unwrap();
    store.add(kokoro()).unwrap();
    let before = store.get_all().unwrap();

    let result = drafts_from_csv("title,author\nonly-one-field\n");
    assert!(result.is_err());

    assert_eq!(store.get_all().unwrap(), before);
}

#[test]
fn export_then_import_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let mut store = BookStore::open_with_config(&config).unwrap();
    store.add(kokoro()).unwrap();
    store
        .add(BookDraft::new("Botchan, Revised", "Natsume \"Soseki\"", "1906", "9784061820098"))
        .unwrap();

    let books = store.get_all().unwrap();
    let csv = books_to_csv(&books, HeaderStyle::Japanese).unwrap();

    let date = chrono::NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let path: PathBuf = config.export_path(date);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, &csv).unwrap();
    assert!(path.ends_with("books_2026-10-19.csv"));

    let rows = parse(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["タイトル"], "Botchan, Revised");

    store.import_all(drafts_from_csv(&csv).unwrap()).unwrap();
    let reimported: Vec<BookDraft> = store.get_all().unwrap().iter().map(|b| b.draft()).collect();
    let original: Vec<BookDraft> = books.iter().map(|b| b.draft()).collect();
    assert_eq!(reimported, original);
}

#[test]
fn notices_survive_reopen_and_clear_once_read() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);

    {
        let mut store = BookStore::open_with_config(&config).unwrap();
        store.add(kokoro()).unwrap();
        store.raise_notice(Notice::Registered).unwrap();
    }

    let mut store = BookStore::open_with_config(&config).unwrap();
    assert_eq!(store.take_notices().unwrap(), vec![Notice::Registered]);
    assert!(store.take_notices().unwrap().is_empty());
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn clear_removes_collection_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let mut store = BookStore::open_with_config(&config).unwrap();
    store.add(kokoro()).unwrap();

    store.clear().unwrap();
    assert!(!config.data_dir.join("books.json").exists());
    assert!(store.get_all().unwrap().is_empty());
}

#[test]
fn corrupt_collection_reports_error() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    fs::create_dir_all(&config.data_dir).unwrap();
    fs::write(config.data_dir.join("books.json"), "[{\"title\": ").unwrap();

    let store = BookStore::open_with_config(&config).unwrap();
    assert!(store.get_all().is_err());
}
