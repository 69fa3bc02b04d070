use std::fmt;

use serde::{Deserialize, Serialize};

use super::generate_id;

// ---------------------------------------------------------------------------
// EntryStatus — tri-state lifecycle of a stock slot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Empty,
    Stocked,
    Sold,
}

impl EntryStatus {
    pub const ALL: [EntryStatus; 3] = [EntryStatus::Empty, EntryStatus::Stocked, EntryStatus::Sold];

    /// The status a slot moves to when it is cycled.
    ///
    /// `Empty -> Stocked -> Sold -> Empty`. Applying it three times is the identity.
    pub fn next(self) -> EntryStatus {
        match self {
            EntryStatus::Empty => EntryStatus::Stocked,
            EntryStatus::Stocked => EntryStatus::Sold,
            EntryStatus::Sold => EntryStatus::Empty,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Empty => "empty",
            EntryStatus::Stocked => "stocked",
            EntryStatus::Sold => "sold",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-function form of [`EntryStatus::next`].
pub fn next(status: EntryStatus) -> EntryStatus {
    status.next()
}

// ---------------------------------------------------------------------------
// Entry — one countable stock unit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub status: EntryStatus,
}

impl Entry {
    pub fn new(status: EntryStatus) -> Self {
        Self {
            id: generate_id(),
            status,
        }
    }

    /// Advance this entry to its next status and return the new value.
    pub fn cycle(&mut self) -> EntryStatus {
        self.status = self.status.next();
        self.status
    }
}
