use serde::{Deserialize, Serialize};

use super::Product;
use crate::query::InventoryQuery;

// ---------------------------------------------------------------------------
// InventoryData — the whole snapshot
// ---------------------------------------------------------------------------

/// The complete inventory at a point in time.
///
/// This is the unit of persistence: it is always stored and transferred as
/// a whole, serialized as a bare JSON array of products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryData {
    pub products: Vec<Product>,
}

impl InventoryData {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    pub fn product_mut(&mut self, product_id: &str) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == product_id)
    }

    /// Read-only query interface over this snapshot.
    pub fn query(&self) -> InventoryQuery<'_> {
        InventoryQuery::new(self)
    }
}

impl From<Vec<Product>> for InventoryData {
    fn from(products: Vec<Product>) -> Self {
        Self { products }
    }
}
