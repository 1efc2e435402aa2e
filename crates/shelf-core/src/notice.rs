//! One-shot notices
//!
//! After a book is registered or updated the CLI raises a notice; the next
//! listing reads it and it is gone. Each notice lives in its own slot.

use tracing::debug;

use crate::storage::{SlotStore, StorageResult};

/// Value written to a raised notice slot
const RAISED: &str = "true";

/// A one-shot notice shown by the next listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// A book was just registered
    Registered,
    /// A book was just updated
    Updated,
}

impl Notice {
    /// All notices, in the order they are reported
    pub const ALL: [Notice; 2] = [Notice::Registered, Notice::Updated];

    /// Slot key holding this notice
    pub fn slot_key(self) -> &'static str {
        match self {
            Notice::Registered => "notice.registered",
            Notice::Updated => "notice.updated",
        }
    }

    /// Message shown to the user
    pub fn message(self) -> &'static str {
        match self {
            Notice::Registered => "Book registered.",
            Notice::Updated => "Book updated.",
        }
    }
}

/// Raise a notice
pub fn raise<S: SlotStore>(slots: &mut S, notice: Notice) -> StorageResult<()> {
    debug!(?notice, "Raising notice");
    slots.write(notice.slot_key(), RAISED)
}

/// Take every raised notice, clearing them
pub fn take_all<S: SlotStore>(slots: &mut S) -> StorageResult<Vec<Notice>> {
    let mut raised = Vec::new();
    for notice in Notice::ALL {
        let value = slots.read(notice.slot_key())?;
        if value.is_some() {
            slots.remove(notice.slot_key())?;
        }
        if value.as_deref().map(str::trim) == Some(RAISED) {
            raised.push(notice);
        }
    }
    Ok(raised)
}
