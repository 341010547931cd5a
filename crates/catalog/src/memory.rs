use crate::record::{CatalogSnapshot, LayerRecord};
use crate::{CatalogError, LayerStore, check_key};

#[derive(Debug, Default)]
pub struct InMemoryLayerStore {
    snapshot: CatalogSnapshot,
}

impl InMemoryLayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }
}

impl LayerStore for InMemoryLayerStore {
    fn save(
        &mut self,
        user: &str,
        layer_id: &str,
        record: LayerRecord,
    ) -> Result<(), CatalogError> {
        check_key("user id", user)?;
        check_key("layer id", layer_id)?;
        self.snapshot.save(user, layer_id, record);
        Ok(())
    }

    fn delete(&mut self, user: &str, layer_id: &str) -> Result<bool, CatalogError> {
        Ok(self.snapshot.delete(user, layer_id))
    }

    fn list(&self, user: &str) -> Result<Vec<LayerRecord>, CatalogError> {
        Ok(self.snapshot.list(user))
    }

    fn clear_all(&mut self, user: &str) -> Result<usize, CatalogError> {
        Ok(self.snapshot.clear_all(user))
    }
}
