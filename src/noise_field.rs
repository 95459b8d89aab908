//! Noise composition for continuous [0, 1] fields.
//!
//! A [`FractalNoise`] sums octaves of a `noise` crate generator (cellular or
//! simplex) with configurable frequency, lacunarity and gain, optionally
//! warping the sample domain first. Fields are built by sampling any
//! `FnMut(x, y) -> f32` closure over the grid, so callers can post-process
//! each sample (remap, square, add white noise) inline.

use noise::core::worley::ReturnType;
use noise::{NoiseFn, OpenSimplex, Worley};

use crate::tilemap::Tilemap;

/// Offsets the warp y-source away from the x-source.
const WARP_Y_OFFSET: f64 = 5.2;

/// Base generator used for every octave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoiseKind {
    /// Worley distance noise (cell-like blobs and ridges)
    Cellular,
    /// OpenSimplex gradient noise
    Simplex,
}

/// Fractal noise configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseParams {
    pub kind: NoiseKind,
    /// Frequency of the first octave (cycles per cell)
    pub frequency: f64,
    /// Number of octaves summed
    pub octaves: usize,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
    /// Amplitude multiplier per octave (may be negative)
    pub gain: f64,
    /// Domain warp displacement in cells (0 = no warp)
    pub warp_amplitude: f64,
}

struct DomainWarp {
    x_source: OpenSimplex,
    y_source: OpenSimplex,
    frequency: f64,
    amplitude: f64,
}

impl DomainWarp {
    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let wx = x * self.frequency;
        let wy = y * self.frequency;
        let dx = self.x_source.get([wx, wy]);
        let dy = self.y_source.get([wx + WARP_Y_OFFSET, wy + WARP_Y_OFFSET]);
        (x + dx * self.amplitude, y + dy * self.amplitude)
    }
}

/// Multi-octave noise. [`FractalNoise::get`] returns roughly -1..1.
pub struct FractalNoise {
    params: NoiseParams,
    sources: Vec<Box<dyn NoiseFn<f64, 2>>>,
    warp: Option<DomainWarp>,
    bounding: f64,
}

impl FractalNoise {
    pub fn new(seed: i32, params: NoiseParams) -> Self {
        let base = seed as u32;
        let sources = (0..params.octaves)
            .map(|i| make_source(params.kind, base.wrapping_add(i as u32)))
            .collect();

        let warp = (params.warp_amplitude != 0.0).then(|| DomainWarp {
            x_source: OpenSimplex::new(base.wrapping_add(1013)),
            y_source: OpenSimplex::new(base.wrapping_add(2027)),
            frequency: params.frequency,
            amplitude: params.warp_amplitude,
        });

        // Octave weights are normalised by the absolute amplitude sum so a
        // negative gain cannot blow the range up.
        let mut bounding = 0.0;
        let mut amplitude = 1.0f64;
        for _ in 0..params.octaves {
            bounding += amplitude.abs();
            amplitude *= params.gain;
        }

        Self {
            params,
            sources,
            warp,
            bounding,
        }
    }

    pub fn get(&self, x: f32, y: f32) -> f32 {
        if self.sources.is_empty() || self.bounding == 0.0 {
            return 0.0;
        }
        let (x, y) = match &self.warp {
            Some(warp) => warp.apply(x as f64, y as f64),
            None => (x as f64, y as f64),
        };

        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.params.frequency;
        for source in &self.sources {
            total += amplitude * source.get([x * frequency, y * frequency]);
            amplitude *= self.params.gain;
            frequency *= self.params.lacunarity;
        }

        ((total / self.bounding) as f32).clamp(-1.0, 1.0)
    }

    /// Same as [`FractalNoise::get`] remapped to 0..1.
    pub fn get_unit(&self, x: f32, y: f32) -> f32 {
        (self.get(x, y) + 1.0) * 0.5
    }
}

fn make_source(kind: NoiseKind, seed: u32) -> Box<dyn NoiseFn<f64, 2>> {
    match kind {
        NoiseKind::Cellular => Box::new(
            Worley::new(seed).set_return_type(ReturnType::Distance),
        ),
        NoiseKind::Simplex => Box::new(OpenSimplex::new(seed)),
    }
}

/// Sample `f(x0 + col, y0 + row)` over a `width`×`height` grid.
pub fn generate<F>(mut f: F, width: usize, height: usize, x0: f32, y0: f32) -> Tilemap<f32>
where
    F: FnMut(f32, f32) -> f32,
{
    let mut map = Tilemap::new_with(width, height, 0.0f32);
    for row in 0..height {
        for col in 0..width {
            map.set(col, row, f(x0 + col as f32, y0 + row as f32));
        }
    }
    map
}

/// Like [`generate`], then stretched to the full 0..1 range.
pub fn generate_normalized<F>(f: F, width: usize, height: usize, x0: f32, y0: f32) -> Tilemap<f32>
where
    F: FnMut(f32, f32) -> f32,
{
    let mut map = generate(f, width, height, x0, y0);
    map.normalize();
    map
}

/// Cubic smoothstep on 0..1.
pub fn smooth(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Linear interpolation from `a` to `b`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position of `v` between `min` and `max`, clamped to 0..1.
/// `min` may be greater than `max` for a descending ramp.
pub fn remap(v: f32, min: f32, max: f32) -> f32 {
    ((v - min) / (max - min)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(kind: NoiseKind) -> NoiseParams {
        NoiseParams {
            kind,
            frequency: 0.05,
            octaves: 4,
            lacunarity: 2.0,
            gain: 0.5,
            warp_amplitude: 0.0,
        }
    }

    #[test]
    fn test_fractal_noise_range() {
        for kind in [NoiseKind::Cellular, NoiseKind::Simplex] {
            let noise = FractalNoise::new(77, params(kind));
            for y in 0..32 {
                for x in 0..32 {
                    let n = noise.get_unit(x as f32 + 0.37, y as f32 + 0.71);
                    assert!((0.0..=1.0).contains(&n), "{:?} produced {}", kind, n);
                }
            }
        }
    }

    #[test]
    fn test_fractal_noise_deterministic() {
        let a = FractalNoise::new(5, params(NoiseKind::Simplex));
        let b = FractalNoise::new(5, params(NoiseKind::Simplex));
        for i in 0..50 {
            let (x, y) = (i as f32 * 1.3, i as f32 * 0.7);
            assert_eq!(a.get(x, y), b.get(x, y));
        }
    }

    #[test]
    fn test_negative_gain_stays_bounded() {
        let noise = FractalNoise::new(
            9,
            NoiseParams {
                gain: -0.3,
                ..params(NoiseKind::Cellular)
            },
        );
        for i in 0..200 {
            let n = noise.get(i as f32 * 0.61, i as f32 * 0.29);
            assert!((-1.0..=1.0).contains(&n));
        }
    }

    #[test]
    fn test_domain_warp_changes_samples() {
        let plain = FractalNoise::new(3, params(NoiseKind::Simplex));
        let warped = FractalNoise::new(
            3,
            NoiseParams {
                warp_amplitude: 20.0,
                ..params(NoiseKind::Simplex)
            },
        );
        let differs = (0..50).any(|i| {
            let (x, y) = (i as f32 * 2.1 + 0.5, i as f32 * 1.3 + 0.5);
            (plain.get(x, y) - warped.get(x, y)).abs() > 1e-4
        });
        assert!(differs);
    }

    #[test]
    fn test_generate_samples_offset_grid() {
        let map = generate(|x, y| x + 10.0 * y, 3, 2, 1.0, 2.0);
        assert_eq!(*map.get(0, 0), 21.0);
        assert_eq!(*map.get(2, 1), 33.0);
    }

    #[test]
    fn test_generate_normalized_full_range() {
        let map = generate_normalized(|x, y| (x * 0.3).sin() + y * 0.1, 16, 16, 0.0, 0.0);
        let (min_v, max_v) = map.min_max();
        assert!(min_v.abs() < 1e-6);
        assert!((max_v - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_remap_descending() {
        assert_eq!(remap(0.0, 0.1, 0.0), 1.0);
        assert_eq!(remap(0.1, 0.1, 0.0), 0.0);
        assert!((remap(0.05, 0.1, 0.0) - 0.5).abs() < 1e-6);
        assert_eq!(remap(2.0, 0.0, 1.0), 1.0);
    }
}
