//! Storage layer
//!
//! Local key-value slots backing the catalog.
//!
//! ## Architecture
//!
//! - **`SlotStore`**: the key-value seam the record store is generic over
//! - **`FileSlots`**: one file per slot in the data directory, atomic writes
//! - **`MemorySlots`**: process-local slots for tests and embedding

pub mod error;
pub mod slots;

pub use error::{StorageError, StorageResult};
pub use slots::{FileSlots, MemorySlots, SlotStore};
