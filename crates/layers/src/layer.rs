use std::collections::BTreeMap;
use std::fmt;

use foundation::math::{LonLat, clamp_unit};
use map::spec::{VISIBILITY_NONE, VISIBILITY_VISIBLE};
use serde::{Deserialize, Serialize};

use crate::processing::ProcessingType;

/// Opacity of a freshly added layer.
pub const DEFAULT_OPACITY: f64 = 0.8;

/// Hex digits of the tile URL digest kept in query-derived ids.
const URL_DIGEST_LEN: usize = 12;

/// Opaque layer identifier, unique within a stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id for a query result: location slug, processing type and a digest
    /// of the tile URL. The same result always maps to the same id.
    pub fn for_query(location: &str, processing_type: &ProcessingType, tile_url: &str) -> Self {
        let slug: String = location
            .trim()
            .chars()
            .filter(|c| *c != ',')
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        let digest = blake3::hash(tile_url.as_bytes()).to_hex();
        Self(format!(
            "{slug}_{}_{}",
            processing_type.as_str().replace(' ', "_"),
            &digest.as_str()[..URL_DIGEST_LEN]
        ))
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for LayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

impl Visibility {
    pub fn toggled(self) -> Self {
        match self {
            Self::Visible => Self::Hidden,
            Self::Hidden => Self::Visible,
        }
    }

    /// Value of the renderer's `visibility` layout property.
    pub fn layout_value(self) -> &'static str {
        match self {
            Self::Visible => VISIBILITY_VISIBLE,
            Self::Hidden => VISIBILITY_NONE,
        }
    }
}

/// Free-form values attached by the backend (dates, dataset, statistics).
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// One imagery overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub tile_url_template: String,
    pub location: String,
    pub processing_type: ProcessingType,
    pub opacity: f64,
    pub visibility: Visibility,
    pub anchor: Option<LonLat>,
    pub metadata: Metadata,
}

impl Layer {
    pub fn new(
        id: impl Into<LayerId>,
        tile_url_template: impl Into<String>,
        location: impl Into<String>,
        processing_type: ProcessingType,
    ) -> Self {
        Self {
            id: id.into(),
            tile_url_template: tile_url_template.into(),
            location: location.into(),
            processing_type,
            opacity: DEFAULT_OPACITY,
            visibility: Visibility::Visible,
            anchor: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_anchor(mut self, anchor: LonLat) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = clamp_unit(opacity);
        self
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    /// Display label, e.g. `Nairobi (NDVI)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.location, self.processing_type)
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_OPACITY, Layer, LayerId, Visibility};
    use crate::processing::ProcessingType;

    #[test]
    fn new_layers_are_visible_at_default_opacity() {
        let layer = Layer::new("a", "https://t/{z}/{x}/{y}", "Nairobi", ProcessingType::Ndvi);
        assert_eq!(layer.opacity, DEFAULT_OPACITY);
        assert!(layer.is_visible());
        assert_eq!(layer.label(), "Nairobi (NDVI)");
        assert_eq!(layer.with_opacity(3.0).opacity, 1.0);
    }

    #[test]
    fn visibility_maps_to_layout_values() {
        assert_eq!(Visibility::Visible.layout_value(), "visible");
        assert_eq!(Visibility::Hidden.layout_value(), "none");
        assert_eq!(Visibility::Visible.toggled().toggled(), Visibility::Visible);
    }

    #[test]
    fn query_ids_are_deterministic_and_url_sensitive() {
        let a = LayerId::for_query("Nairobi, Kenya", &ProcessingType::Ndvi, "https://t/1/{z}/{x}/{y}");
        let b = LayerId::for_query("Nairobi, Kenya", &ProcessingType::Ndvi, "https://t/1/{z}/{x}/{y}");
        let c = LayerId::for_query("Nairobi, Kenya", &ProcessingType::Ndvi, "https://t/2/{z}/{x}/{y}");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.as_str().starts_with("Nairobi_Kenya_NDVI_"));
        assert_eq!(a.as_str().len(), "Nairobi_Kenya_NDVI_".len() + 12);
    }
}
