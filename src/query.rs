//! Read-only views derived from a snapshot.
//!
//! `InventoryQuery` borrows an [`InventoryData`] and never mutates it. The
//! stock summary it produces is the aggregate handed to insight consumers
//! (counts per variant, no ids).

use serde::Serialize;

use crate::models::{ColorVariant, EntryStatus, InventoryData, Product};

// ---------------------------------------------------------------------------
// StockCounts / summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCounts {
    pub total_slots: usize,
    pub stocked: usize,
    pub sold: usize,
    pub empty: usize,
}

impl StockCounts {
    pub fn of(variant: &ColorVariant) -> Self {
        Self {
            total_slots: variant.entries.len(),
            stocked: variant.count(EntryStatus::Stocked),
            sold: variant.count(EntryStatus::Sold),
            empty: variant.count(EntryStatus::Empty),
        }
    }

    fn add(&mut self, other: StockCounts) {
        self.total_slots += other.total_slots;
        self.stocked += other.stocked;
        self.sold += other.sold;
        self.empty += other.empty;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSummary {
    pub color: String,
    #[serde(flatten)]
    pub counts: StockCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    pub name: String,
    pub variants: Vec<VariantSummary>,
}

// ---------------------------------------------------------------------------
// InventoryQuery
// ---------------------------------------------------------------------------

pub struct InventoryQuery<'a> {
    data: &'a InventoryData,
}

impl<'a> InventoryQuery<'a> {
    pub fn new(data: &'a InventoryData) -> Self {
        Self { data }
    }

    /// Products whose name contains `needle`, ignoring case.
    ///
    /// An empty needle matches everything. Snapshot order is preserved.
    pub fn search(&self, needle: &str) -> Vec<&'a Product> {
        let needle = needle.to_lowercase();
        self.data
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn get(&self, product_id: &str) -> Option<&'a Product> {
        self.data.product(product_id)
    }

    /// Products filed under `category`, compared ignoring case.
    pub fn by_category(&self, category: &str) -> Vec<&'a Product> {
        self.data
            .products
            .iter()
            .filter(|p| {
                p.category
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(category))
            })
            .collect()
    }

    /// Per-product, per-variant stock counts.
    pub fn stock_summary(&self) -> Vec<ProductSummary> {
        self.data
            .products
            .iter()
            .map(|p| ProductSummary {
                name: p.name.clone(),
                variants: p
                    .variants
                    .iter()
                    .map(|v| VariantSummary {
                        color: v.name.clone(),
                        counts: StockCounts::of(v),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Counts summed over every variant of every product.
    pub fn totals(&self) -> StockCounts {
        let mut totals = StockCounts::default();
        for variant in self.data.products.iter().flat_map(|p| &p.variants) {
            totals.add(StockCounts::of(variant));
        }
        totals
    }

    /// Variants with no stocked entries left, as `(product, variant)` pairs.
    pub fn out_of_stock(&self) -> Vec<(&'a Product, &'a ColorVariant)> {
        self.data
            .products
            .iter()
            .flat_map(|p| p.variants.iter().map(move |v| (p, v)))
            .filter(|(_, v)| v.count(EntryStatus::Stocked) == 0)
            .collect()
    }
}
