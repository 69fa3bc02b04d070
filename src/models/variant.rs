use serde::{Deserialize, Serialize};

use super::{generate_id, validated_name, Entry, EntryStatus};
use crate::config::DEFAULT_ENTRY_BATCH;
use crate::error::Result;

// ---------------------------------------------------------------------------
// ColorVariant — a color of a product and its stock slots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorVariant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl ColorVariant {
    /// Create a variant with the default batch of empty entries.
    pub fn new(name: &str) -> Result<Self> {
        Self::with_entries(name, DEFAULT_ENTRY_BATCH)
    }

    /// Create a variant with `count` empty entries.
    pub fn with_entries(name: &str, count: usize) -> Result<Self> {
        Ok(Self {
            id: generate_id(),
            name: validated_name(name, "variant")?,
            entries: (0..count).map(|_| Entry::new(EntryStatus::Empty)).collect(),
        })
    }

    pub fn entry(&self, entry_id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == entry_id)
    }

    pub fn entry_mut(&mut self, entry_id: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id == entry_id)
    }

    /// Number of entries currently in `status`.
    pub fn count(&self, status: EntryStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }
}
