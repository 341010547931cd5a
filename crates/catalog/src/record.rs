use std::collections::BTreeMap;

use foundation::math::LonLat;
use layers::{DEFAULT_OPACITY, Layer, Metadata, ProcessingType, Visibility};
use serde::{Deserialize, Serialize};

use crate::CatalogError;

fn default_opacity() -> f64 {
    DEFAULT_OPACITY
}

fn default_visibility() -> String {
    Visibility::Visible.layout_value().to_string()
}

/// Stored form of a layer, as exchanged with the persistence service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub id: String,
    #[serde(default)]
    pub tile_url: Option<String>,
    pub location: String,
    pub processing_type: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_visibility")]
    pub visibility: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl From<&Layer> for LayerRecord {
    fn from(layer: &Layer) -> Self {
        Self {
            id: layer.id.to_string(),
            tile_url: Some(layer.tile_url_template.clone()),
            location: layer.location.clone(),
            processing_type: layer.processing_type.to_string(),
            latitude: layer.anchor.map(|a| a.lat),
            longitude: layer.anchor.map(|a| a.lon),
            opacity: layer.opacity,
            visibility: layer.visibility.layout_value().to_string(),
            metadata: (!layer.metadata.is_empty()).then(|| layer.metadata.clone()),
        }
    }
}

impl LayerRecord {
    /// Rebuilds the layer. Records saved without a tile URL cannot be shown.
    pub fn into_layer(self) -> Result<Layer, CatalogError> {
        let Some(tile_url) = self.tile_url else {
            return Err(CatalogError::Incomplete(self.id));
        };
        let mut layer = Layer::new(
            self.id,
            tile_url,
            self.location,
            ProcessingType::parse(&self.processing_type),
        )
        .with_opacity(self.opacity)
        .with_metadata(self.metadata.unwrap_or_default());
        if let (Some(lon), Some(lat)) = (self.longitude, self.latitude) {
            layer = layer.with_anchor(LonLat::new(lon, lat));
        }
        if matches!(self.visibility.as_str(), "none" | "hidden") {
            layer.visibility = Visibility::Hidden;
        }
        Ok(layer)
    }
}

/// Everything a store holds: per user, records in save order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub users: BTreeMap<String, Vec<LayerRecord>>,
}

impl CatalogSnapshot {
    pub(crate) fn save(&mut self, user: &str, layer_id: &str, mut record: LayerRecord) {
        record.id = layer_id.to_string();
        let records = self.users.entry(user.to_string()).or_default();
        match records.iter_mut().find(|r| r.id == layer_id) {
            Some(slot) => *slot = record,
            None => records.push(record),
        }
    }

    pub(crate) fn delete(&mut self, user: &str, layer_id: &str) -> bool {
        let Some(records) = self.users.get_mut(user) else {
            return false;
        };
        let before = records.len();
        records.retain(|r| r.id != layer_id);
        let removed = records.len() != before;
        if records.is_empty() {
            self.users.remove(user);
        }
        removed
    }

    pub(crate) fn list(&self, user: &str) -> Vec<LayerRecord> {
        self.users.get(user).cloned().unwrap_or_default()
    }

    pub(crate) fn clear_all(&mut self, user: &str) -> usize {
        self.users.remove(user).map_or(0, |r| r.len())
    }
}

#[cfg(test)]
mod tests {
    use super::LayerRecord;
    use crate::CatalogError;
    use foundation::math::LonLat;
    use layers::{Layer, Metadata, ProcessingType, Visibility};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn layer_survives_a_record() {
        let mut metadata = Metadata::new();
        metadata.insert("DATASET".into(), json!("MODIS/061/MOD13Q1"));
        let mut layer = Layer::new(
            "nairobi_NDVI_abc",
            "https://t/{z}/{x}/{y}",
            "Nairobi",
            ProcessingType::Ndvi,
        )
        .with_anchor(LonLat::new(36.8, -1.3))
        .with_metadata(metadata)
        .with_opacity(0.5);
        layer.visibility = Visibility::Hidden;

        let record = LayerRecord::from(&layer);
        assert_eq!(record.visibility, "none");
        assert_eq!(record.processing_type, "NDVI");
        assert_eq!(record.into_layer().unwrap(), layer);
    }

    #[test]
    fn sparse_records_use_defaults() {
        let record: LayerRecord = serde_json::from_value(json!({
            "id": "x",
            "tile_url": "https://t/{z}/{x}/{y}",
            "location": "Kisumu",
            "processing_type": "SURFACE WATER",
        }))
        .unwrap();
        assert_eq!(record.opacity, 0.8);
        assert_eq!(record.visibility, "visible");
        let layer = record.into_layer().unwrap();
        assert_eq!(layer.processing_type, ProcessingType::SurfaceWater);
        assert_eq!(layer.anchor, None);
    }

    #[test]
    fn records_without_tiles_are_incomplete() {
        let record: LayerRecord = serde_json::from_value(json!({
            "id": "x",
            "location": "Kisumu",
            "processing_type": "LST",
        }))
        .unwrap();
        assert_eq!(
            record.into_layer(),
            Err(CatalogError::Incomplete("x".to_string()))
        );
    }
}
