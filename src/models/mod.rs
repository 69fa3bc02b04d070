pub mod entry;
pub mod inventory;
pub mod product;
pub mod variant;

pub use entry::*;
pub use inventory::*;
pub use product::*;
pub use variant::*;

use rand::Rng;

use crate::error::{InventoryError, Result};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

/// Generate an opaque identifier: nine random base-36 characters.
///
/// Uniqueness is probabilistic and never checked.
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Trim a display name, rejecting one that is empty afterwards.
pub(crate) fn validated_name(name: &str, what: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(InventoryError::InvalidArgument(format!(
            "{} name must not be empty",
            what
        )));
    }
    Ok(trimmed.to_string())
}
