/// Geographic coordinate in degrees, longitude first (GeoJSON axis order).
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    pub fn is_finite(self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// True when both axes differ by less than `eps` degrees.
    pub fn approx_eq(self, other: Self, eps: f64) -> bool {
        (self.lon - other.lon).abs() < eps && (self.lat - other.lat).abs() < eps
    }
}

impl From<[f64; 2]> for LonLat {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<LonLat> for [f64; 2] {
    fn from(v: LonLat) -> Self {
        v.to_array()
    }
}

impl std::fmt::Display for LonLat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4},{:.4}", self.lon, self.lat)
    }
}
