use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::{generate_id, validated_name, ColorVariant};
use crate::error::Result;

/// Current time as an ISO-8601 string with millisecond precision, e.g.
/// `2024-05-01T09:30:00.123Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// Product — root aggregate
// ---------------------------------------------------------------------------

/// A product and the color variants it owns.
///
/// `updated_at` is kept as the exact string that was read so snapshots from
/// the remote sheet round-trip byte for byte. It is refreshed by [`touch`]
/// whenever a command modifies the product.
///
/// [`touch`]: Product::touch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub variants: Vec<ColorVariant>,
    pub updated_at: String,
}

impl Product {
    /// Create a product with no variants.
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self {
            id: generate_id(),
            name: validated_name(name, "product")?,
            category: None,
            variants: Vec::new(),
            updated_at: timestamp_now(),
        })
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Mark the product as modified now.
    pub fn touch(&mut self) {
        self.updated_at = timestamp_now();
    }

    pub fn variant(&self, variant_id: &str) -> Option<&ColorVariant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    pub fn variant_mut(&mut self, variant_id: &str) -> Option<&mut ColorVariant> {
        self.variants.iter_mut().find(|v| v.id == variant_id)
    }

    /// Total number of entries across all variants.
    pub fn total_entries(&self) -> usize {
        self.variants.iter().map(|v| v.entries.len()).sum()
    }
}
