//! Slippy-map tile coordinates and `{z}/{x}/{y}` URL templates.

use std::f64::consts::PI;

use foundation::bounds::LonLatBounds;
use foundation::math::LonLat;
use serde::{Deserialize, Serialize};

/// Highest zoom the raster sources are requested at.
pub const MAX_TILE_ZOOM: u8 = 22;

/// Web Mercator latitude limit.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Tile coordinate in ZXY scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Tile at zoom `z` containing `at`. Latitudes beyond the Mercator
    /// limit are clamped; `z` is capped at [`MAX_TILE_ZOOM`].
    pub fn containing(at: LonLat, z: u8) -> Self {
        let z = z.min(MAX_TILE_ZOOM);
        let n = (1u64 << z) as f64;
        let lat = at.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
        let lon = at.lon.clamp(-180.0, 180.0);

        let x = ((lon + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - lat.tan().asinh() / PI) / 2.0 * n).floor();
        let max = n - 1.0;
        Self {
            z,
            x: x.clamp(0.0, max) as u32,
            y: y.clamp(0.0, max) as u32,
        }
    }

    /// Geographic bounds of this tile.
    pub fn bounds(&self) -> LonLatBounds {
        let n = (1u64 << self.z) as f64;
        let lon_min = (self.x as f64 / n) * 360.0 - 180.0;
        let lon_max = ((self.x + 1) as f64 / n) * 360.0 - 180.0;

        // Web Mercator Y flip
        let lat_max = tile_y_to_lat(self.y, self.z);
        let lat_min = tile_y_to_lat(self.y + 1, self.z);

        LonLatBounds::new(LonLat::new(lon_min, lat_min), LonLat::new(lon_max, lat_max))
    }
}

fn tile_y_to_lat(y: u32, z: u8) -> f64 {
    let n = PI - 2.0 * PI * (y as f64) / (1u64 << z) as f64;
    n.sinh().atan().to_degrees()
}

/// True if `template` carries all of `{z}`, `{x}` and `{y}`.
pub fn is_tile_template(template: &str) -> bool {
    ["{z}", "{x}", "{y}"].iter().all(|p| template.contains(p))
}

/// Substitutes the tile coordinate into a `{z}/{x}/{y}` template.
pub fn expand_tile_url(template: &str, tile: TileCoord) -> String {
    template
        .replace("{z}", &tile.z.to_string())
        .replace("{x}", &tile.x.to_string())
        .replace("{y}", &tile.y.to_string())
}

#[cfg(test)]
mod tests {
    use super::{TileCoord, expand_tile_url, is_tile_template};
    use foundation::math::LonLat;

    #[test]
    fn world_tile_covers_everything() {
        let tile = TileCoord::new(0, 0, 0);
        let b = tile.bounds();
        assert!((b.min.lon - (-180.0)).abs() < 0.01);
        assert!((b.max.lon - 180.0).abs() < 0.01);
        assert!(b.min.lat < b.max.lat);
        assert_eq!(TileCoord::containing(LonLat::new(12.0, -40.0), 0), tile);
    }

    #[test]
    fn containing_tile_bounds_the_point() {
        for (lon, lat) in [(36.82, -1.29), (-122.42, 37.77), (151.2, -33.87)] {
            let p = LonLat::new(lon, lat);
            let tile = TileCoord::containing(p, 12);
            let b = tile.bounds();
            assert!(b.min.lon <= lon && lon <= b.max.lon, "{tile:?} {b:?}");
            assert!(b.min.lat <= lat && lat <= b.max.lat, "{tile:?} {b:?}");
        }
    }

    #[test]
    fn poles_clamp_to_edge_rows() {
        let north = TileCoord::containing(LonLat::new(0.0, 90.0), 3);
        let south = TileCoord::containing(LonLat::new(0.0, -90.0), 3);
        assert_eq!(north.y, 0);
        assert_eq!(south.y, 7);
    }

    #[test]
    fn templates_expand_all_placeholders() {
        let url = "https://earthengine.test/v1/maps/abc/tiles/{z}/{x}/{y}";
        assert!(is_tile_template(url));
        assert_eq!(
            expand_tile_url(url, TileCoord::new(5, 17, 9)),
            "https://earthengine.test/v1/maps/abc/tiles/5/17/9"
        );
        assert!(!is_tile_template("https://earthengine.test/static.png"));
    }
}
