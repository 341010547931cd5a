use catalog::LayerRecord;
use foundation::math::LonLat;
use layers::{Layer, LayerId, LocationFix, Metadata, ProcessingType};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::BackendError;

/// Shown when the service fails without saying why.
pub const DEFAULT_REJECTION: &str = "Error fetching image for this location";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub prompt: String,
}

impl QueryRequest {
    /// Trims the prompt; blank prompts never reach the network.
    pub fn new(prompt: &str) -> Result<Self, BackendError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(BackendError::EmptyPrompt);
        }
        Ok(Self {
            prompt: prompt.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<QueryData>,
}

impl QueryResponse {
    pub fn into_data(self) -> Result<QueryData, BackendError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(BackendError::Rejected(
                self.message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_REJECTION.to_string()),
            )),
        }
    }
}

/// Payload of a successful query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryData {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub processing_type: Option<String>,
    #[serde(default, alias = "tileUrlTemplate", alias = "tileUrl")]
    pub tile_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// A query result ready to be stacked.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    pub layer: Layer,
    /// Where to put the marker and send the camera, when the service
    /// located the place.
    pub location: Option<LocationFix>,
}

impl QueryData {
    /// Processing type as reported, or the prompt when the service left it
    /// out.
    pub fn processing_type_or(&self, prompt: &str) -> ProcessingType {
        match self.processing_type.as_deref().map(str::trim) {
            Some(pt) if !pt.is_empty() => ProcessingType::parse(pt),
            _ => ProcessingType::parse(prompt),
        }
    }

    fn coordinate(&self) -> Option<LonLat> {
        let at = LonLat::new(self.longitude?, self.latitude?);
        let in_range = (-180.0..=180.0).contains(&at.lon) && (-90.0..=90.0).contains(&at.lat);
        (at.is_finite() && in_range).then_some(at)
    }

    pub fn into_layer(self, prompt: &str, opacity: f64) -> Result<ResolvedQuery, BackendError> {
        let Some(tile_url) = self.tile_url.clone().filter(|u| !u.trim().is_empty()) else {
            return Err(BackendError::MissingTileUrl);
        };
        let processing_type = self.processing_type_or(prompt);
        let id = LayerId::for_query(&self.location, &processing_type, &tile_url);
        let at = self.coordinate();
        let location = self.location.trim().to_string();

        let mut layer = Layer::new(id, tile_url, location.clone(), processing_type)
            .with_opacity(opacity)
            .with_metadata(self.metadata.unwrap_or_default());
        if let Some(at) = at {
            layer = layer.with_anchor(at);
        }

        Ok(ResolvedQuery {
            layer,
            location: at
                .filter(|_| !location.is_empty())
                .map(|at| LocationFix { label: location, at }),
        })
    }
}

fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Body of `POST /api/layers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveLayerRequest {
    pub user_id: String,
    pub layer_id: String,
    pub layer: LayerRecord,
}

/// Body of `GET /api/layers/{user}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerListResponse {
    #[serde(default)]
    pub layers: Vec<LayerRecord>,
}

/// Body of `DELETE /api/layers/{user}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClearResponse {
    #[serde(default)]
    pub cleared: usize,
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_REJECTION, QueryData, QueryRequest, QueryResponse};
    use crate::BackendError;
    use foundation::math::LonLat;
    use layers::ProcessingType;
    use serde_json::json;

    fn response(value: serde_json::Value) -> QueryResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn blank_prompts_are_rejected_locally() {
        assert_eq!(QueryRequest::new("   "), Err(BackendError::EmptyPrompt));
        assert_eq!(
            QueryRequest::new("  ndvi for Nairobi ").unwrap().prompt,
            "ndvi for Nairobi"
        );
    }

    #[test]
    fn failed_responses_carry_the_service_message() {
        let r = response(json!({ "success": false, "message": "Location not found" }));
        assert_eq!(
            r.into_data(),
            Err(BackendError::Rejected("Location not found".to_string()))
        );

        let r = response(json!({ "success": true }));
        assert_eq!(
            r.into_data(),
            Err(BackendError::Rejected(DEFAULT_REJECTION.to_string()))
        );
    }

    #[test]
    fn successful_response_becomes_an_anchored_layer() {
        let r = response(json!({
            "success": true,
            "data": {
                "location": "Nairobi, Kenya",
                "processing_type": "ndvi",
                "tile_url": "https://ee.test/{z}/{x}/{y}",
                "latitude": "-1.29",
                "longitude": 36.82,
                "metadata": { "SATELLITE": "Sentinel-2" }
            }
        }));
        let resolved = r.into_data().unwrap().into_layer("prompt", 0.6).unwrap();
        let layer = resolved.layer;
        assert_eq!(layer.processing_type, ProcessingType::Ndvi);
        assert_eq!(layer.location, "Nairobi, Kenya");
        assert_eq!(layer.opacity, 0.6);
        assert_eq!(layer.anchor, Some(LonLat::new(36.82, -1.29)));
        assert_eq!(layer.metadata["SATELLITE"], json!("Sentinel-2"));
        assert!(layer.id.as_str().starts_with("Nairobi_Kenya_NDVI_"));

        let fix = resolved.location.unwrap();
        assert_eq!(fix.label, "Nairobi, Kenya");
        assert_eq!(fix.at, LonLat::new(36.82, -1.29));
    }

    #[test]
    fn same_result_maps_to_the_same_id() {
        let data: QueryData = serde_json::from_value(json!({
            "location": "Lagos",
            "processing_type": "RGB",
            "tileUrlTemplate": "https://ee.test/a/{z}/{x}/{y}"
        }))
        .unwrap();
        let a = data.clone().into_layer("p", 0.8).unwrap().layer.id;
        let b = data.into_layer("p", 0.8).unwrap().layer.id;
        assert_eq!(a, b);
    }

    #[test]
    fn missing_processing_type_falls_back_to_prompt() {
        let data: QueryData = serde_json::from_value(json!({
            "location": "Delta",
            "tile_url": "https://ee.test/{z}/{x}/{y}"
        }))
        .unwrap();
        let resolved = data.into_layer("surface water", 0.8).unwrap();
        assert_eq!(resolved.layer.processing_type, ProcessingType::SurfaceWater);
        assert_eq!(resolved.location, None);
        assert_eq!(resolved.layer.anchor, None);
    }

    #[test]
    fn result_without_tiles_is_an_error() {
        let data: QueryData = serde_json::from_value(json!({
            "location": "Delta",
            "tile_url": "  "
        }))
        .unwrap();
        assert_eq!(
            data.into_layer("rgb", 0.8),
            Err(BackendError::MissingTileUrl)
        );
    }

    #[test]
    fn out_of_range_coordinates_do_not_anchor() {
        let data: QueryData = serde_json::from_value(json!({
            "location": "Nowhere",
            "tile_url": "https://ee.test/{z}/{x}/{y}",
            "latitude": 123.0,
            "longitude": "abc"
        }))
        .unwrap();
        assert_eq!(data.into_layer("rgb", 0.8).unwrap().layer.anchor, None);
    }
}
