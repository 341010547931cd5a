use super::{LonLat, canonical_f64};

/// Mean Earth radius (kilometers, IUGG).
pub const EARTH_RADIUS_KM: f64 = 6_371.008_8;

/// Vertex count used for circles when the caller has no preference.
pub const DEFAULT_CIRCLE_STEPS: usize = 64;

/// Scale factors of the coordinate hash. Changing them changes every
/// synthetic pixel sample, so they are fixed.
pub const HASH_LON_SCALE: f64 = 100.0;
pub const HASH_LAT_SCALE: f64 = 100.0;

/// Great-circle surface distance in kilometers (haversine).
///
/// Exactly commutative: both deltas enter through their absolute value, so
/// `distance_km(a, b)` and `distance_km(b, a)` are bit-identical.
pub fn distance_km(a: LonLat, b: LonLat) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).abs().to_radians();
    let dlon = (b.lon - a.lon).abs().to_radians();

    let s_lat = (dlat * 0.5).sin();
    let s_lon = (dlon * 0.5).sin();
    let h = s_lat * s_lat + lat1.cos() * lat2.cos() * s_lon * s_lon;
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Length of the polyline through `points`; `0` for fewer than two points.
pub fn cumulative_distance_km(points: &[LonLat]) -> f64 {
    points.windows(2).map(|w| distance_km(w[0], w[1])).sum()
}

/// Returns `points` with the first vertex repeated at the end.
///
/// Rings with fewer than three vertices cannot enclose an area and are
/// returned unchanged.
pub fn close_polygon(points: &[LonLat]) -> Vec<LonLat> {
    let mut out = points.to_vec();
    if points.len() > 2 {
        out.push(points[0]);
    }
    out
}

/// Point reached by travelling `distance_km` from `origin` along the
/// great circle with initial bearing `bearing_deg` (clockwise from north).
pub fn destination(origin: LonLat, distance_km: f64, bearing_deg: f64) -> LonLat {
    let lon1 = origin.lon.to_radians();
    let lat1 = origin.lat.to_radians();
    let bearing = bearing_deg.to_radians();
    let delta = distance_km / EARTH_RADIUS_KM;

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    LonLat::new(lon2.to_degrees(), lat2.to_degrees())
}

/// Closed ring approximating a circle of `radius_km` around `center`.
///
/// Produces `steps` vertices at constant bearing spacing (counter-clockwise,
/// starting due north) plus the closing vertex, so the ring has
/// `steps + 1` positions. `steps == 0` yields an empty ring.
pub fn geodesic_circle(center: LonLat, radius_km: f64, steps: usize) -> Vec<LonLat> {
    if steps == 0 {
        return Vec::new();
    }

    let mut ring = Vec::with_capacity(steps + 1);
    for i in 0..steps {
        let bearing = i as f64 * -360.0 / steps as f64;
        ring.push(destination(center, radius_km, bearing));
    }
    ring.push(ring[0]);
    ring
}

/// Deterministic pseudo-random value in `[0, 1)` for a coordinate.
///
/// `frac(|sin(lon * 100) * cos(lat * 100)|)`. Non-finite input maps to `0`.
pub fn coordinate_hash(coord: LonLat) -> f64 {
    let lon = canonical_f64(coord.lon);
    let lat = canonical_f64(coord.lat);
    let seed = ((lon * HASH_LON_SCALE).sin() * (lat * HASH_LAT_SCALE).cos()).abs();
    let h = seed - seed.floor();
    if h.is_finite() && h < 1.0 { h } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::{
        DEFAULT_CIRCLE_STEPS, close_polygon, coordinate_hash, cumulative_distance_km, destination,
        distance_km, geodesic_circle,
    };
    use crate::math::LonLat;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn distance_is_commutative_and_zero_on_identity() {
        let pairs = [
            (LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)),
            (LonLat::new(-122.42, 37.77), LonLat::new(139.69, 35.69)),
            (LonLat::new(179.9, -45.0), LonLat::new(-179.9, 45.0)),
            (LonLat::new(10.0, 89.9), LonLat::new(-170.0, 89.9)),
        ];
        for (a, b) in pairs {
            assert_eq!(distance_km(a, b), distance_km(b, a));
            assert_eq!(distance_km(a, a), 0.0);
        }
    }

    #[test]
    fn one_hundredth_degree_of_latitude_is_about_1_11_km() {
        let d = distance_km(LonLat::new(0.0, 0.0), LonLat::new(0.0, 0.01));
        assert_close(d, 1.112, 0.001);
    }

    #[test]
    fn cumulative_distance_sums_segments() {
        assert_eq!(cumulative_distance_km(&[]), 0.0);
        assert_eq!(cumulative_distance_km(&[LonLat::new(3.0, 4.0)]), 0.0);

        let pts = [
            LonLat::new(0.0, 0.0),
            LonLat::new(0.0, 1.0),
            LonLat::new(1.0, 1.0),
        ];
        let expected = distance_km(pts[0], pts[1]) + distance_km(pts[1], pts[2]);
        assert_close(cumulative_distance_km(&pts), expected, 1e-9);
    }

    #[test]
    fn close_polygon_only_closes_real_rings() {
        let two = [LonLat::new(0.0, 0.0), LonLat::new(1.0, 0.0)];
        assert_eq!(close_polygon(&two), two.to_vec());

        let three = [
            LonLat::new(0.0, 0.0),
            LonLat::new(1.0, 0.0),
            LonLat::new(1.0, 1.0),
        ];
        let closed = close_polygon(&three);
        assert_eq!(closed.len(), 4);
        assert_eq!(closed.first(), closed.last());
    }

    #[test]
    fn destination_round_trips_distance() {
        let origin = LonLat::new(10.0, 10.0);
        for bearing in [0.0, 45.0, 90.0, 200.0, -30.0] {
            let p = destination(origin, 2.0, bearing);
            assert_close(distance_km(origin, p), 2.0, 1e-6);
        }
    }

    #[test]
    fn destination_due_north_keeps_longitude() {
        let p = destination(LonLat::new(5.0, 0.0), 111.195, 0.0);
        assert_close(p.lon, 5.0, 1e-9);
        assert_close(p.lat, 1.0, 1e-3);
    }

    #[test]
    fn circle_is_closed_and_equidistant() {
        let center = LonLat::new(10.0, 10.0);
        let ring = geodesic_circle(center, 2.0, DEFAULT_CIRCLE_STEPS);
        assert_eq!(ring.len(), DEFAULT_CIRCLE_STEPS + 1);
        assert_eq!(ring.first(), ring.last());
        for p in &ring {
            assert_close(distance_km(center, *p), 2.0, 1e-6);
        }
    }

    #[test]
    fn circle_with_zero_steps_is_empty() {
        assert!(geodesic_circle(LonLat::new(0.0, 0.0), 1.0, 0).is_empty());
    }

    #[test]
    fn coordinate_hash_is_pure_and_in_unit_range() {
        for i in 0..200 {
            let p = LonLat::new(i as f64 * 0.731 - 70.0, i as f64 * 0.417 - 40.0);
            let h = coordinate_hash(p);
            assert!((0.0..1.0).contains(&h), "hash {h} out of range for {p:?}");
            assert_eq!(h.to_bits(), coordinate_hash(p).to_bits());
        }
    }

    #[test]
    fn coordinate_hash_ignores_zero_sign_and_rejects_nan() {
        assert_eq!(
            coordinate_hash(LonLat::new(-0.0, 1.0)).to_bits(),
            coordinate_hash(LonLat::new(0.0, 1.0)).to_bits()
        );
        assert_eq!(coordinate_hash(LonLat::new(f64::NAN, 1.0)), 0.0);
    }
}
