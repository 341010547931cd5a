//! Per-user persistence of imagery layers.

mod file;
mod memory;
mod record;

pub use file::JsonFileLayerStore;
pub use memory::InMemoryLayerStore;
pub use record::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    InvalidKey(String),
    /// The record cannot become a layer (no tile URL).
    Incomplete(String),
    Corrupt(String),
    Io(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::InvalidKey(msg) => write!(f, "invalid catalog key: {msg}"),
            CatalogError::Incomplete(id) => write!(f, "layer record {id} has no tile url"),
            CatalogError::Corrupt(msg) => write!(f, "catalog storage corrupt: {msg}"),
            CatalogError::Io(msg) => write!(f, "catalog storage error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Saved layers, keyed by user.
pub trait LayerStore {
    /// Inserts or replaces `record` under `layer_id`. Replacing keeps the
    /// record's position in the user's list.
    fn save(
        &mut self,
        user: &str,
        layer_id: &str,
        record: LayerRecord,
    ) -> Result<(), CatalogError>;
    fn delete(&mut self, user: &str, layer_id: &str) -> Result<bool, CatalogError>;
    /// Records in the order they were first saved.
    fn list(&self, user: &str) -> Result<Vec<LayerRecord>, CatalogError>;
    /// Removes all of the user's records; returns how many there were.
    fn clear_all(&mut self, user: &str) -> Result<usize, CatalogError>;
}

pub(crate) fn check_key(kind: &str, key: &str) -> Result<(), CatalogError> {
    if key.trim().is_empty() {
        return Err(CatalogError::InvalidKey(format!("empty {kind}")));
    }
    Ok(())
}
