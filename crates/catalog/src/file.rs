use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::record::{CatalogSnapshot, LayerRecord};
use crate::{CatalogError, LayerStore, check_key};

/// File name of the snapshot inside the store directory.
pub const SNAPSHOT_FILE: &str = "layers.json";

/// Store persisted as one JSON snapshot on disk.
///
/// Every call reads the snapshot; mutations write it back through a
/// temporary file renamed over the original.
#[derive(Debug)]
pub struct JsonFileLayerStore {
    path: PathBuf,
}

impl JsonFileLayerStore {
    /// Opens (creating if needed) the store directory `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .map_err(|e| CatalogError::Io(format!("create {}: {e}", dir.display())))?;
        Ok(Self {
            path: dir.join(SNAPSHOT_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<CatalogSnapshot, CatalogError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CatalogSnapshot::default()),
            Err(e) => return Err(CatalogError::Io(format!("read {}: {e}", self.path.display()))),
        };
        if raw.trim().is_empty() {
            return Ok(CatalogSnapshot::default());
        }
        serde_json::from_str(&raw).map_err(|e| CatalogError::Corrupt(e.to_string()))
    }

    fn store(&self, snapshot: &CatalogSnapshot) -> Result<(), CatalogError> {
        let raw =
            serde_json::to_vec_pretty(snapshot).map_err(|e| CatalogError::Io(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)
            .map_err(|e| CatalogError::Io(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| CatalogError::Io(format!("rename {}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), users = snapshot.users.len(), "catalog written");
        Ok(())
    }
}

impl LayerStore for JsonFileLayerStore {
    fn save(
        &mut self,
        user: &str,
        layer_id: &str,
        record: LayerRecord,
    ) -> Result<(), CatalogError> {
        check_key("user id", user)?;
        check_key("layer id", layer_id)?;
        let mut snapshot = self.load()?;
        snapshot.save(user, layer_id, record);
        self.store(&snapshot)
    }

    fn delete(&mut self, user: &str, layer_id: &str) -> Result<bool, CatalogError> {
        let mut snapshot = self.load()?;
        let removed = snapshot.delete(user, layer_id);
        if removed {
            self.store(&snapshot)?;
        }
        Ok(removed)
    }

    fn list(&self, user: &str) -> Result<Vec<LayerRecord>, CatalogError> {
        Ok(self.load()?.list(user))
    }

    fn clear_all(&mut self, user: &str) -> Result<usize, CatalogError> {
        let mut snapshot = self.load()?;
        let removed = snapshot.clear_all(user);
        if removed > 0 {
            self.store(&snapshot)?;
        }
        Ok(removed)
    }
}
