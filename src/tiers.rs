//! Progression tier field.
//!
//! Independent of the physical fields: a domain-warped cellular fractal,
//! squared to push most of the map towards low tiers, then sharpened so tier
//! boundaries read as distinct pockets.

use log::info;

use crate::heightmap::noise_offset;
use crate::noise_field::{generate_normalized, smooth, FractalNoise, NoiseKind, NoiseParams};
use crate::rng::HashRng;
use crate::tilemap::Tilemap;

pub const TIER_NOISE: NoiseParams = NoiseParams {
    kind: NoiseKind::Cellular,
    frequency: 0.15,
    octaves: 6,
    lacunarity: 3.1,
    gain: -0.3,
    warp_amplitude: 30.0,
};

/// Maximum white-noise erosion of each raw sample
const TIER_JITTER: f32 = 0.33;

pub fn generate_tiers(size: usize, rng: &mut HashRng) -> Tilemap<f32> {
    info!("Generating tiers...");
    let noise = FractalNoise::new(rng.next_int(), TIER_NOISE);
    let (x0, y0) = noise_offset(rng);
    let tiers = generate_normalized(
        |x, y| {
            let n = noise.get(x, y) - rng.white_noise() * TIER_JITTER;
            let n = ((n + 1.0) * 0.5).clamp(0.0, 1.0);
            smooth(n * n)
        },
        size,
        size,
        x0,
        y0,
    );
    tiers.smoothed(1).sharpened()
}
