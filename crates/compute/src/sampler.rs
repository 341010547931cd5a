use foundation::math::{LonLat, coordinate_hash};
use layers::{Layer, ProcessingType};

use crate::sample::{LULC_CLASSES, PixelSample, SampleError};

/// Reads a value of `layer` at `at`.
pub trait PixelSampler {
    fn sample(&self, layer: &Layer, at: LonLat) -> Result<PixelSample, SampleError>;
}

/// Deterministic placeholder sampler.
///
/// Values are derived from [`coordinate_hash`] only, so sampling the same
/// processing type at the same coordinate always gives the same reading.
#[derive(Debug, Copy, Clone, Default)]
pub struct HashSampler;

impl HashSampler {
    pub fn sample_type(pt: &ProcessingType, at: LonLat) -> PixelSample {
        let h = coordinate_hash(at);
        match pt {
            ProcessingType::Ndvi => PixelSample::Continuous {
                label: "NDVI",
                value: h * 0.9 - 0.2,
                unit: "",
                min: -0.2,
                max: 0.8,
                precision: 3,
            },
            ProcessingType::Lst => PixelSample::Continuous {
                label: "Land Surface Temperature",
                value: h * 40.0 + 5.0,
                unit: "°C",
                min: 0.0,
                max: 50.0,
                precision: 1,
            },
            ProcessingType::SurfaceWater => PixelSample::Continuous {
                label: "Surface Water Occurrence",
                value: (h * 100.0).floor(),
                unit: "%",
                min: 0.0,
                max: 100.0,
                precision: 0,
            },
            ProcessingType::OpenBuildings => PixelSample::Continuous {
                label: "Building Height",
                value: h * 50.0,
                unit: "m",
                min: 0.0,
                max: 50.0,
                precision: 1,
            },
            ProcessingType::Lulc => {
                // h < 1, so the index stays within the table.
                let index = ((h * LULC_CLASSES.len() as f64).floor() as usize)
                    .min(LULC_CLASSES.len() - 1);
                PixelSample::Categorical {
                    label: "Land Use / Land Cover",
                    class_id: index as u8 + 1,
                    class_name: LULC_CLASSES[index],
                }
            }
            ProcessingType::Rgb => PixelSample::Rgb {
                r: channel(h),
                g: channel((h + 0.33) % 1.0),
                b: channel((h + 0.66) % 1.0),
            },
            other => PixelSample::Raw {
                label: other.to_string(),
                value: h,
            },
        }
    }
}

fn channel(unit: f64) -> u8 {
    (unit * 255.0).floor().clamp(0.0, 255.0) as u8
}

impl PixelSampler for HashSampler {
    fn sample(&self, layer: &Layer, at: LonLat) -> Result<PixelSample, SampleError> {
        if !at.is_finite() {
            return Err(SampleError::InvalidCoordinate(at));
        }
        Ok(Self::sample_type(&layer.processing_type, at))
    }
}

#[cfg(test)]
mod tests {
    use super::{HashSampler, PixelSampler};
    use crate::sample::{PixelSample, SampleError, lulc_class_name};
    use foundation::math::{LonLat, coordinate_hash};
    use layers::{Layer, ProcessingType};

    fn layer(pt: ProcessingType) -> Layer {
        Layer::new("l", "https://t/{z}/{x}/{y}", "Somewhere", pt)
    }

    fn grid() -> impl Iterator<Item = LonLat> {
        (0..400).map(|i| LonLat::new(i as f64 * 0.37 - 74.0, i as f64 * 0.211 - 42.0))
    }

    #[test]
    fn lulc_class_is_in_range_and_named() {
        let l = layer(ProcessingType::Lulc);
        for at in grid() {
            let PixelSample::Categorical {
                class_id,
                class_name,
                ..
            } = HashSampler.sample(&l, at).unwrap()
            else {
                panic!("expected categorical sample");
            };
            assert!((1..=10).contains(&class_id), "class {class_id} at {at}");
            assert_eq!(lulc_class_name(class_id), Some(class_name));
        }
    }

    #[test]
    fn sampling_is_bit_identical_on_repeat() {
        for pt in [
            ProcessingType::Ndvi,
            ProcessingType::Lst,
            ProcessingType::SurfaceWater,
            ProcessingType::Rgb,
            ProcessingType::OpenBuildings,
            ProcessingType::parse("NIGHT_LIGHTS"),
        ] {
            let l = layer(pt);
            for at in grid().take(50) {
                let a = HashSampler.sample(&l, at).unwrap();
                let b = HashSampler.sample(&l, at).unwrap();
                assert_eq!(format!("{a:?}"), format!("{b:?}"));
            }
        }
    }

    #[test]
    fn continuous_values_follow_the_formulas() {
        let at = LonLat::new(36.82, -1.29);
        let h = coordinate_hash(at);
        match HashSampler::sample_type(&ProcessingType::Ndvi, at) {
            PixelSample::Continuous { value, min, max, .. } => {
                assert_eq!(value, h * 0.9 - 0.2);
                assert!(min <= value && value <= max);
            }
            other => panic!("unexpected {other:?}"),
        }
        match HashSampler::sample_type(&ProcessingType::SurfaceWater, at) {
            PixelSample::Continuous { value, unit, .. } => {
                assert_eq!(value, (h * 100.0).floor());
                assert_eq!(unit, "%");
            }
            other => panic!("unexpected {other:?}"),
        }
        match HashSampler::sample_type(&ProcessingType::parse("mystery"), at) {
            PixelSample::Raw { label, value } => {
                assert_eq!(label, "mystery");
                assert_eq!(value, h);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rgb_channels_are_phase_shifted() {
        let at = LonLat::new(10.0, 10.0);
        let h = coordinate_hash(at);
        let PixelSample::Rgb { r, g, b } = HashSampler::sample_type(&ProcessingType::Rgb, at) else {
            panic!("expected rgb");
        };
        assert_eq!(r, (h * 255.0).floor() as u8);
        assert_eq!(g, (((h + 0.33) % 1.0) * 255.0).floor() as u8);
        assert_eq!(b, (((h + 0.66) % 1.0) * 255.0).floor() as u8);
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let at = LonLat::new(f64::NAN, 0.0);
        assert!(matches!(
            HashSampler.sample(&layer(ProcessingType::Ndvi), at),
            Err(SampleError::InvalidCoordinate(_))
        ));
    }
}
