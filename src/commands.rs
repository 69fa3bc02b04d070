//! Whole-snapshot mutation commands issued by the UI.
//!
//! Every command is applied to an owned [`InventoryData`] value. The engine
//! applies commands to a clone of the current snapshot and swaps the result
//! in, so a command that fails leaves the active snapshot untouched.

use crate::error::{InventoryError, Result};
use crate::models::{ColorVariant, Entry, EntryStatus, InventoryData, Product};

// ---------------------------------------------------------------------------
// InventoryCommand
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum InventoryCommand {
    /// Insert a new product at the front of the list.
    AddProduct {
        name: String,
        category: Option<String>,
    },
    /// Replace a product wholesale, matched by id.
    UpdateProduct { product: Product },
    RenameProduct { product_id: String, name: String },
    SetCategory {
        product_id: String,
        category: Option<String>,
    },
    DeleteProduct { product_id: String },
    /// Append a variant carrying the default batch of empty entries.
    AddVariant { product_id: String, name: String },
    RenameVariant {
        product_id: String,
        variant_id: String,
        name: String,
    },
    RemoveVariant {
        product_id: String,
        variant_id: String,
    },
    /// Advance one entry to its next status.
    CycleEntry {
        product_id: String,
        variant_id: String,
        entry_id: String,
    },
    /// Append one entry, already stocked.
    AddEntry {
        product_id: String,
        variant_id: String,
    },
    RemoveEntry {
        product_id: String,
        variant_id: String,
        entry_id: String,
    },
}

fn product_not_found(product_id: &str) -> InventoryError {
    InventoryError::NotFound(format!("product {}", product_id))
}

fn variant_not_found(product_id: &str, variant_id: &str) -> InventoryError {
    InventoryError::NotFound(format!("variant {} in product {}", variant_id, product_id))
}

fn entry_not_found(variant_id: &str, entry_id: &str) -> InventoryError {
    InventoryError::NotFound(format!("entry {} in variant {}", entry_id, variant_id))
}

impl InventoryData {
    /// Apply `command` in place.
    ///
    /// Returns the id of the entity the command created, if it created one.
    /// Every command that changes a product refreshes its `updatedAt`.
    pub fn apply(&mut self, command: InventoryCommand) -> Result<Option<String>> {
        match command {
            InventoryCommand::AddProduct { name, category } => {
                let mut product = Product::new(&name)?;
                product.category = category.filter(|c| !c.trim().is_empty());
                let id = product.id.clone();
                self.products.insert(0, product);
                Ok(Some(id))
            }
            InventoryCommand::UpdateProduct { mut product } => {
                let slot = self
                    .product_mut(&product.id)
                    .ok_or_else(|| product_not_found(&product.id))?;
                product.touch();
                *slot = product;
                Ok(None)
            }
            InventoryCommand::RenameProduct { product_id, name } => {
                let name = crate::models::validated_name(&name, "product")?;
                let product = self.find_product(&product_id)?;
                product.name = name;
                product.touch();
                Ok(None)
            }
            InventoryCommand::SetCategory {
                product_id,
                category,
            } => {
                let product = self.find_product(&product_id)?;
                product.category = category.filter(|c| !c.trim().is_empty());
                product.touch();
                Ok(None)
            }
            InventoryCommand::DeleteProduct { product_id } => {
                let before = self.products.len();
                self.products.retain(|p| p.id != product_id);
                if self.products.len() == before {
                    return Err(product_not_found(&product_id));
                }
                Ok(None)
            }
            InventoryCommand::AddVariant { product_id, name } => {
                let variant = ColorVariant::new(&name)?;
                let id = variant.id.clone();
                let product = self.find_product(&product_id)?;
                product.variants.push(variant);
                product.touch();
                Ok(Some(id))
            }
            InventoryCommand::RenameVariant {
                product_id,
                variant_id,
                name,
            } => {
                let name = crate::models::validated_name(&name, "variant")?;
                let product = self.find_product(&product_id)?;
                let variant = product
                    .variant_mut(&variant_id)
                    .ok_or_else(|| variant_not_found(&product_id, &variant_id))?;
                variant.name = name;
                product.touch();
                Ok(None)
            }
            InventoryCommand::RemoveVariant {
                product_id,
                variant_id,
            } => {
                let product = self.find_product(&product_id)?;
                let before = product.variants.len();
                product.variants.retain(|v| v.id != variant_id);
                if product.variants.len() == before {
                    return Err(variant_not_found(&product_id, &variant_id));
                }
                product.touch();
                Ok(None)
            }
            InventoryCommand::CycleEntry {
                product_id,
                variant_id,
                entry_id,
            } => {
                let product = self.find_product(&product_id)?;
                let variant = product
                    .variant_mut(&variant_id)
                    .ok_or_else(|| variant_not_found(&product_id, &variant_id))?;
                variant
                    .entry_mut(&entry_id)
                    .ok_or_else(|| entry_not_found(&variant_id, &entry_id))?
                    .cycle();
                product.touch();
                Ok(None)
            }
            InventoryCommand::AddEntry {
                product_id,
                variant_id,
            } => {
                let product = self.find_product(&product_id)?;
                let variant = product
                    .variant_mut(&variant_id)
                    .ok_or_else(|| variant_not_found(&product_id, &variant_id))?;
                let entry = Entry::new(EntryStatus::Stocked);
                let id = entry.id.clone();
                variant.entries.push(entry);
                product.touch();
                Ok(Some(id))
            }
            InventoryCommand::RemoveEntry {
                product_id,
                variant_id,
                entry_id,
            } => {
                let product = self.find_product(&product_id)?;
                let variant = product
                    .variant_mut(&variant_id)
                    .ok_or_else(|| variant_not_found(&product_id, &variant_id))?;
                let before = variant.entries.len();
                variant.entries.retain(|e| e.id != entry_id);
                if variant.entries.len() == before {
                    return Err(entry_not_found(&variant_id, &entry_id));
                }
                product.touch();
                Ok(None)
            }
        }
    }

    fn find_product(&mut self, product_id: &str) -> Result<&mut Product> {
        self.product_mut(product_id)
            .ok_or_else(|| product_not_found(product_id))
    }
}
