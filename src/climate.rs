//! Temperature and humidity fields.
//! Both depend on elevation and draw their randomness from the world RNG.

use std::f64::consts::PI;

use log::info;

use crate::heightmap::noise_offset;
use crate::noise_field::{generate, lerp, remap, smooth, FractalNoise, NoiseKind, NoiseParams};
use crate::rng::{noise_2d_layered, HashRng};
use crate::tilemap::Tilemap;

// =============================================================================
// TEMPERATURE CONSTANTS
// =============================================================================

/// Base frequency of the value-noise term
const TEMP_NOISE_FREQUENCY: f32 = 0.09;
const TEMP_NOISE_OCTAVES: u32 = 8;
const TEMP_NOISE_LACUNARITY: f32 = 2.0;
/// Weight of the value-noise term against the latitude base
const TEMP_NOISE_WEIGHT: f32 = 0.3;
/// Peak magnitude of the per-cell white-noise jitter
const TEMP_JITTER: f32 = 0.25;
/// Amplitude of the east-west sine wobble
const TEMP_SINE_AMPLITUDE: f64 = 0.08;
/// Sine wavelength as a fraction of twice the map width
const TEMP_SINE_PERIOD: f64 = 0.27;
/// Temperatures above this start to resist elevation cooling
const TEMP_ELEVATION_RESIST: f32 = 0.5;

// =============================================================================
// HUMIDITY CONSTANTS
// =============================================================================

pub const HUMIDITY_BASE: NoiseParams = NoiseParams {
    kind: NoiseKind::Simplex,
    frequency: 0.02,
    octaves: 8,
    lacunarity: 3.1,
    gain: 0.2,
    warp_amplitude: 65.0,
};

pub const HUMIDITY_NOISE: NoiseParams = NoiseParams {
    kind: NoiseKind::Simplex,
    frequency: 0.014,
    octaves: 8,
    lacunarity: 3.8,
    gain: 0.3,
    warp_amplitude: 65.0,
};

/// Lift applied to the base layer before clamping
const HUMIDITY_BASE_LIFT: f32 = 0.1;
/// Elevation below which ground is treated as coastal and wet
const HUMIDITY_COAST_ELEVATION: f32 = 0.1;
/// Maximum amount white noise dries a cell
const HUMIDITY_DRYING: f32 = 0.25;
/// Share of the second noise layer in the final blend
const HUMIDITY_NOISE_WEIGHT: f32 = 0.7;

// =============================================================================
// TEMPERATURE
// =============================================================================

/// Temperature in 0..1: warm at the vertical centre, cool at the edges and on
/// high ground.
///
/// Per cell the latitude term is wobbled by two phase-shifted sines (blended
/// from south to north), jittered with white noise and mixed with layered
/// value noise. Elevation then cools the result, except where the base is
/// already hot.
pub fn generate_temperature(elevation: &Tilemap<f32>, rng: &mut HashRng) -> Tilemap<f32> {
    info!("Generating temperature...");
    let width = elevation.width;
    let height = elevation.height;
    let (x0, y0) = noise_offset(rng);
    let shift_north = rng.white_noise() as f64 * 2.0 * PI;
    let shift_south = rng.white_noise() as f64 * 2.0 * PI;
    let equator = height as f32 / 2.0;

    let mut temperature = Tilemap::new_with(width, height, 0.0f32);
    for y in 0..height {
        let y_normalized = y as f32 / height as f32;
        let latitude = smooth(1.0 - (2.0 * (y as f32 - equator).abs()) / height as f32);
        for x in 0..width {
            let jitter_base = TEMP_JITTER * (rng.white_noise() * 2.0 - 1.0);
            let jitter_elevation = TEMP_JITTER * (rng.white_noise() * 2.0 - 1.0);
            let classic = noise_2d_layered(
                x0 + x as f32,
                y0 + y as f32,
                rng.seed(),
                TEMP_NOISE_FREQUENCY,
                TEMP_NOISE_OCTAVES,
                TEMP_NOISE_LACUNARITY,
            );

            let phase = PI * (x as f64 / (width as f64 * TEMP_SINE_PERIOD));
            let north = (TEMP_SINE_AMPLITUDE * (phase + shift_north).sin()) as f32;
            let south = (TEMP_SINE_AMPLITUDE * (phase + shift_south).sin()) as f32;
            let wobble = lerp(south, north, y_normalized);

            let mut base = (wobble + latitude + jitter_base).clamp(0.0, 1.0);
            base = lerp(base, classic, TEMP_NOISE_WEIGHT);

            let e = *elevation.get(x, y);
            let cooling = 1.0 - (e * 2.0 + jitter_elevation).clamp(0.0, 1.0);
            let cooled = base * cooling;
            temperature.set(x, y, lerp(cooled, base, remap(base, TEMP_ELEVATION_RESIST, 1.0)));
        }
    }
    temperature.smoothed(1)
}

// =============================================================================
// HUMIDITY
// =============================================================================

/// Humidity in 0..1: a coast-boosted base layer blended with a second,
/// independent noise layer.
pub fn generate_humidity(elevation: &Tilemap<f32>, rng: &mut HashRng) -> Tilemap<f32> {
    info!("Generating humidity...");
    let mut humidity = humidity_base(elevation, rng);
    let noise = humidity_noise(elevation.width, elevation.height, rng);
    humidity.mix(&noise, HUMIDITY_NOISE_WEIGHT);
    humidity.clamp01();
    humidity
}

fn humidity_base(elevation: &Tilemap<f32>, rng: &mut HashRng) -> Tilemap<f32> {
    let noise = FractalNoise::new(rng.next_int(), HUMIDITY_BASE);
    let (x0, y0) = noise_offset(rng);
    let mut base = generate(
        |x, y| smooth((noise.get_unit(x, y) + HUMIDITY_BASE_LIFT).clamp(0.0, 1.0)),
        elevation.width,
        elevation.height,
        x0,
        y0,
    );

    for (x, y, h) in base.iter_mut() {
        let e = *elevation.get(x, y);
        if e < HUMIDITY_COAST_ELEVATION {
            *h = h.max(remap(e, HUMIDITY_COAST_ELEVATION, 0.0));
        }
        *h -= rng.white_noise() * HUMIDITY_DRYING;
    }
    base.smoothed(1)
}

fn humidity_noise(width: usize, height: usize, rng: &mut HashRng) -> Tilemap<f32> {
    let noise = FractalNoise::new(rng.next_int(), HUMIDITY_NOISE);
    let (x0, y0) = noise_offset(rng);
    generate(|x, y| smooth(noise.get_unit(x, y)), width, height, x0, y0)
}
