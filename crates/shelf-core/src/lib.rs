//! SHELF Core Library
//!
//! This crate provides the core functionality for SHELF, a local book
//! catalog with CSV import and export.
//!
//! # Architecture
//!
//! - **Slots**: the catalog is one JSON array kept in a local key-value slot
//!
//! Every mutation is a whole-collection read-modify-write.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = BookStore::open()?;
//!
//! // Validate and add a book
//! let draft = validate_draft_now(&BookDraft::new("Kokoro", "Natsume Soseki", "1914", "9784061820098"))?;
//! let book = store.add(draft)?;
//!
//! // Export
//! let csv = books_to_csv(&store.get_all()?, HeaderStyle::English)?;
//! ```
//!
//! # Modules
//!
//! - `store`: Record store (main entry point)
//! - `models`: Book, draft and patch types
//! - `csv_bridge`: CSV parsing and serialization
//! - `validate`: Form validation
//! - `notice`: One-shot notices
//! - `storage`: Key-value slot persistence
//! - `config`: Application configuration

pub mod config;
pub mod csv_bridge;
pub mod models;
pub mod notice;
pub mod storage;
pub mod store;
pub mod validate;

pub use config::Config;
pub use csv_bridge::{HeaderStyle, ParseError, Row, SerializeError};
pub use models::{Book, BookDraft, BookPatch, Field};
pub use notice::Notice;
pub use storage::{FileSlots, MemorySlots, SlotStore, StorageError, StorageResult};
pub use store::BookStore;
pub use validate::{validate_draft, validate_draft_now, ValidationErrors};
