use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use foundation::math::LonLat;
use layers::symbology::focus_zoom;
use layers::tiles::{TileCoord, expand_tile_url};
use layers::{LayerId, LayerStack};
use tracing::debug;

use crate::sample::{PixelSample, SampleError};
use crate::sampler::PixelSampler;

/// A sample together with where it was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelReading {
    pub layer: LayerId,
    pub at: LonLat,
    pub sample: PixelSample,
    /// Tile covering `at` at the layer's focus zoom.
    pub tile: TileCoord,
    pub tile_url: String,
}

/// Latest reading per layer.
#[derive(Debug, Clone, Default)]
pub struct Inspector {
    readings: BTreeMap<LayerId, PixelReading>,
}

impl Inspector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples layer `id` of `stack` at `at`, replacing that layer's
    /// previous reading.
    pub fn inspect<S: PixelSampler + ?Sized>(
        &mut self,
        sampler: &S,
        stack: &LayerStack,
        id: &LayerId,
        at: LonLat,
    ) -> Result<&PixelReading, SampleError> {
        let layer = stack
            .get(id)
            .ok_or_else(|| SampleError::UnknownLayer(id.clone()))?;
        let sample = sampler.sample(layer, at)?;
        let tile = TileCoord::containing(at, focus_zoom(&layer.processing_type) as u8);
        debug!(layer = %id, at = %at, "pixel sampled");

        let reading = PixelReading {
            layer: id.clone(),
            at,
            sample,
            tile,
            tile_url: expand_tile_url(&layer.tile_url_template, tile),
        };
        match self.readings.entry(id.clone()) {
            Entry::Occupied(mut slot) => {
                slot.insert(reading);
                Ok(slot.into_mut())
            }
            Entry::Vacant(slot) => Ok(slot.insert(reading)),
        }
    }

    pub fn reading(&self, id: &LayerId) -> Option<&PixelReading> {
        self.readings.get(id)
    }

    pub fn readings(&self) -> impl Iterator<Item = &PixelReading> {
        self.readings.values()
    }

    pub fn clear(&mut self, id: &LayerId) -> bool {
        self.readings.remove(id).is_some()
    }

    pub fn clear_all(&mut self) {
        self.readings.clear();
    }

    /// Drops readings of layers no longer in `stack`.
    pub fn retain_stack(&mut self, stack: &LayerStack) {
        self.readings.retain(|id, _| stack.get(id).is_some());
    }
}

#[cfg(test)]
mod tests {
    use super::Inspector;
    use crate::sample::{PixelSample, SampleError};
    use crate::sampler::HashSampler;
    use foundation::math::LonLat;
    use layers::{Layer, LayerId, LayerStack, ProcessingType};
    use map::MapSession;

    fn stack_with(ids: &[(&str, ProcessingType)]) -> (MapSession, LayerStack) {
        let mut map: MapSession = MapSession::default();
        let mut stack = LayerStack::default();
        for (id, pt) in ids {
            stack.add_layer(
                &mut map,
                Layer::new(*id, "https://t/{z}/{x}/{y}.png", "Nairobi", pt.clone()),
            );
        }
        (map, stack)
    }

    #[test]
    fn readings_are_cached_per_layer() {
        let (_map, stack) = stack_with(&[("lulc", ProcessingType::Lulc), ("rgb", ProcessingType::Rgb)]);
        let mut inspector = Inspector::new();
        let at = LonLat::new(36.82, -1.29);

        let reading = inspector
            .inspect(&HashSampler, &stack, &"lulc".into(), at)
            .unwrap();
        assert!(matches!(reading.sample, PixelSample::Categorical { .. }));
        assert_eq!(reading.tile.z, 10);
        assert!(reading.tile_url.starts_with("https://t/10/"));

        inspector
            .inspect(&HashSampler, &stack, &"rgb".into(), at)
            .unwrap();
        assert_eq!(inspector.readings().count(), 2);

        assert!(inspector.clear(&"rgb".into()));
        assert!(!inspector.clear(&"rgb".into()));
        assert!(inspector.reading(&"lulc".into()).is_some());
        inspector.clear_all();
        assert_eq!(inspector.readings().count(), 0);
    }

    #[test]
    fn unknown_layer_is_an_error() {
        let (_map, stack) = stack_with(&[]);
        let mut inspector = Inspector::new();
        let err = inspector
            .inspect(&HashSampler, &stack, &LayerId::from("ghost"), LonLat::new(0.0, 0.0))
            .unwrap_err();
        assert_eq!(err, SampleError::UnknownLayer("ghost".into()));
    }

    #[test]
    fn removed_layers_lose_their_readings() {
        let (mut map, mut stack) = stack_with(&[("a", ProcessingType::Ndvi)]);
        let mut inspector = Inspector::new();
        inspector
            .inspect(&HashSampler, &stack, &"a".into(), LonLat::new(1.0, 1.0))
            .unwrap();
        stack.remove_layer(&mut map, &"a".into());
        inspector.retain_stack(&stack);
        assert!(inspector.reading(&"a".into()).is_none());
    }
}
