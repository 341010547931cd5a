//! Renderer registration of one imagery layer: a raster source plus the
//! visual layer drawing it.

use map::engine::{MapEngine, MapError};
use map::session::MapSession;
use map::spec::{LayerKind, LayerSpec, RASTER_OPACITY, SourceSpec, VISIBILITY};

use crate::layer::{Layer, LayerId};

pub const SOURCE_PREFIX: &str = "ee-source-";
pub const LAYER_PREFIX: &str = "ee-layer-";

pub fn source_id(id: &LayerId) -> String {
    format!("{SOURCE_PREFIX}{id}")
}

pub fn map_layer_id(id: &LayerId) -> String {
    format!("{LAYER_PREFIX}{id}")
}

/// True for renderer layer ids owned by the imagery stack.
pub fn is_stack_layer(map_id: &str) -> bool {
    map_id.starts_with(LAYER_PREFIX)
}

pub(crate) fn register<E: MapEngine>(
    map: &mut MapSession<E>,
    layer: &Layer,
    tile_size: u32,
) -> Result<(), MapError> {
    let source = source_id(&layer.id);
    map.add_source(
        &source,
        SourceSpec::Raster {
            tiles: vec![layer.tile_url_template.clone()],
            tile_size,
        },
    )?;
    map.add_layer(
        LayerSpec::new(map_layer_id(&layer.id), source, LayerKind::Raster)
            .with_paint(RASTER_OPACITY, layer.opacity)
            .with_layout(VISIBILITY, layer.visibility.layout_value()),
    )
}

/// Removes the pair if present. Returns `true` if anything was removed.
pub(crate) fn unregister<E: MapEngine>(map: &mut MapSession<E>, id: &LayerId) -> bool {
    let layer = map.remove_layer_if_present(&map_layer_id(id));
    let source = map.remove_source_if_present(&source_id(id));
    layer || source
}
