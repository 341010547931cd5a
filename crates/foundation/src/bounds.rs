use crate::math::LonLat;

/// Axis-aligned box in longitude/latitude space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LonLatBounds {
    pub min: LonLat,
    pub max: LonLat,
}

impl LonLatBounds {
    pub fn new(min: LonLat, max: LonLat) -> Self {
        LonLatBounds { min, max }
    }

    /// Bounds spanned by two arbitrary opposite corners.
    pub fn from_corners(a: LonLat, b: LonLat) -> Self {
        LonLatBounds {
            min: LonLat::new(a.lon.min(b.lon), a.lat.min(b.lat)),
            max: LonLat::new(a.lon.max(b.lon), a.lat.max(b.lat)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.lon - self.min.lon
    }

    pub fn height(&self) -> f64 {
        self.max.lat - self.min.lat
    }

    /// True when both extents are below `eps` degrees.
    pub fn is_degenerate(&self, eps: f64) -> bool {
        self.width() < eps && self.height() < eps
    }

    /// Closed ring: SW, SE, NE, NW, SW.
    pub fn ring(&self) -> Vec<LonLat> {
        vec![
            self.min,
            LonLat::new(self.max.lon, self.min.lat),
            self.max,
            LonLat::new(self.min.lon, self.max.lat),
            self.min,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::LonLatBounds;
    use crate::math::LonLat;

    #[test]
    fn corners_are_normalized() {
        let b = LonLatBounds::from_corners(LonLat::new(2.0, -1.0), LonLat::new(-3.0, 4.0));
        assert_eq!(b.min, LonLat::new(-3.0, -1.0));
        assert_eq!(b.max, LonLat::new(2.0, 4.0));
    }

    #[test]
    fn ring_is_closed_with_five_positions() {
        let b = LonLatBounds::from_corners(LonLat::new(0.0, 0.0), LonLat::new(1.0, 2.0));
        let ring = b.ring();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        assert_eq!(ring[2], LonLat::new(1.0, 2.0));
    }

    #[test]
    fn degenerate_only_when_both_axes_collapse() {
        let tiny = LonLatBounds::from_corners(LonLat::new(0.0, 0.0), LonLat::new(0.00005, 0.00002));
        assert!(tiny.is_degenerate(1e-4));
        let sliver = LonLatBounds::from_corners(LonLat::new(0.0, 0.0), LonLat::new(1.0, 0.0));
        assert!(!sliver.is_degenerate(1e-4));
    }
}
