use log::{debug, info};

use crate::config::WorldConfig;
use crate::error::GenError;
use crate::growth::grow;
use crate::landmass::generate_landmass;
use crate::noise_field::{generate_normalized, smooth, FractalNoise, NoiseKind, NoiseParams};
use crate::rivers::carve_rivers;
use crate::rng::HashRng;
use crate::tilemap::Tilemap;

/// Landmass value marking land.
pub const LAND: u8 = 1;

/// Range of the random offset applied to each noise field's sample grid.
pub const NOISE_OFFSET_RANGE: f32 = 9999.9;

// =============================================================================
// DETAIL NOISE PARAMETERS
// =============================================================================

/// High-frequency cellular roughness.
pub const DETAIL_CELLULAR: NoiseParams = NoiseParams {
    kind: NoiseKind::Cellular,
    frequency: 0.45,
    octaves: 6,
    lacunarity: 2.0,
    gain: 0.2,
    warp_amplitude: 0.0,
};

/// Low-frequency simplex undulation.
pub const DETAIL_SIMPLEX: NoiseParams = NoiseParams {
    kind: NoiseKind::Simplex,
    frequency: 0.04,
    octaves: 6,
    lacunarity: 3.0,
    gain: 0.4,
    warp_amplitude: 0.0,
};

/// Share of the simplex layer in the detail mix.
const DETAIL_SIMPLEX_WEIGHT: f32 = 0.33;

/// Draw a random sampling offset for one noise field.
pub fn noise_offset(rng: &mut HashRng) -> (f32, f32) {
    let x0 = rng.white_noise() * NOISE_OFFSET_RANGE;
    let y0 = rng.white_noise() * NOISE_OFFSET_RANGE;
    (x0, y0)
}

// =============================================================================
// CONTINENT SHAPE
// =============================================================================

/// Distance-to-coast falloff of a land/sea grid.
///
/// Each land cell scans rings of increasing radius `d` up to `radius`, looking
/// only at the four diagonal corners. The first corner that is in bounds and
/// not land gives `d / radius`; a cell with no such corner gets 1. Sea cells
/// are 0. The result is then blurred `passes` times.
pub fn coastal_falloff(landmass: &Tilemap<u8>, radius: usize, passes: usize) -> Tilemap<f32> {
    let mut falloff = Tilemap::new_with(landmass.width, landmass.height, 0.0f32);
    let radius = radius.max(1);
    for (x, y, &cell) in landmass.iter() {
        if cell != LAND {
            continue;
        }
        let d = (1..=radius)
            .find(|&d| {
                let d = d as i32;
                [(-d, -d), (d, -d), (-d, d), (d, d)].iter().any(|&(dx, dy)| {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    landmass.in_bounds(nx, ny) && *landmass.get(nx as usize, ny as usize) != LAND
                })
            })
            .unwrap_or(radius);
        falloff.set(x, y, d as f32 / radius as f32);
    }
    falloff.smoothed(passes)
}

/// WFC landmass grown to full size and turned into a continent base.
pub fn generate_continent(config: &WorldConfig, rng: &mut HashRng) -> Result<Tilemap<f32>, GenError> {
    let landmass = generate_landmass(
        config.landmass_size,
        config.wfc_pattern_size,
        rng,
        config.wfc_max_iterations,
    )?;
    let grown = grow(&landmass, config.size, rng)?;

    let land = grown.values().iter().filter(|&&v| v == LAND).count();
    debug!(
        "landmass: {:.1}% land after growth to {}x{}",
        100.0 * land as f32 / grown.values().len() as f32,
        grown.width,
        grown.height
    );

    Ok(coastal_falloff(
        &grown,
        config.coast_falloff_radius,
        config.coast_smoothing_passes,
    ))
}

// =============================================================================
// DETAIL
// =============================================================================

/// Roughness field in 0..1: cellular high frequencies mixed with simplex
/// low frequencies.
pub fn generate_detail(size: usize, rng: &mut HashRng) -> Tilemap<f32> {
    let seed = rng.next_int();

    let cellular = FractalNoise::new(seed, DETAIL_CELLULAR);
    let (x0, y0) = noise_offset(rng);
    let mut detail = generate_normalized(
        |x, y| {
            let n = cellular.get_unit(x, y);
            smooth((n * n * 1.99 + 0.1).clamp(0.0, 1.0))
        },
        size,
        size,
        x0,
        y0,
    );

    let simplex = FractalNoise::new(seed, DETAIL_SIMPLEX);
    let (x0, y0) = noise_offset(rng);
    let low = generate_normalized(|x, y| smooth(simplex.get_unit(x, y)), size, size, x0, y0);

    detail.mix(&low, DETAIL_SIMPLEX_WEIGHT);
    detail.normalize();
    detail
}

// =============================================================================
// ELEVATION
// =============================================================================

/// Full elevation pipeline: continent shape times detail, then rivers.
pub fn generate_elevation(config: &WorldConfig, rng: &mut HashRng) -> Result<Tilemap<f32>, GenError> {
    info!("Generating elevation ({}x{})...", config.size, config.size);
    let mut elevation = generate_continent(config, rng)?;
    let detail = generate_detail(config.size, rng);
    elevation.multiply(&detail, 1.0);

    let rivers = carve_rivers(&mut elevation, rng, config);
    let carved: usize = rivers.iter().map(Vec::len).sum();
    info!("Carved {} rivers ({} cells)", rivers.len(), carved);
    Ok(elevation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falloff_uses_diagonals_only() {
        let mut landmass = Tilemap::new_with(11, 11, LAND);
        landmass.set(5, 5, 0);
        let raw = coastal_falloff(&landmass, 5, 0);

        assert_eq!(*raw.get(5, 5), 0.0);
        assert!((raw.get(4, 4) - 0.2).abs() < 1e-6);
        assert!((raw.get(7, 3) - 0.4).abs() < 1e-6);
        // Orthogonal neighbours never see the sea cell.
        assert_eq!(*raw.get(5, 4), 1.0);
    }

    #[test]
    fn test_falloff_ignores_out_of_bounds_corners() {
        let landmass = Tilemap::new_with(4, 4, LAND);
        let raw = coastal_falloff(&landmass, 5, 0);
        for (_, _, &v) in raw.iter() {
            assert_eq!(v, 1.0);
        }
    }

    #[test]
    fn test_falloff_sea_is_zero_before_smoothing() {
        let landmass = Tilemap::from_rows(&[vec![0u8, 0, 0], vec![0, 1, 0], vec![0, 0, 0]]);
        let raw = coastal_falloff(&landmass, 5, 0);
        assert!((raw.get(1, 1) - 0.2).abs() < 1e-6);
        assert_eq!(*raw.get(0, 0), 0.0);
    }

    #[test]
    fn test_detail_is_normalized() {
        let mut rng = HashRng::new(31);
        let detail = generate_detail(48, &mut rng);
        let (lo, hi) = detail.min_max();
        assert!(lo.abs() < 1e-5 && (hi - 1.0).abs() < 1e-5, "range {}..{}", lo, hi);
    }

    #[test]
    fn test_elevation_in_unit_range_with_sea() {
        let config = WorldConfig {
            size: 64,
            ..Default::default()
        };
        let mut rng = HashRng::new(12999);
        rng.set_position(config.initial_rng_position);
        let elevation = generate_elevation(&config, &mut rng).unwrap();
        assert_eq!((elevation.width, elevation.height), (64, 64));
        for (x, y, &v) in elevation.iter() {
            assert!((0.0..=1.0).contains(&v), "elevation {} at ({}, {})", v, x, y);
        }
        assert!(elevation.values().iter().any(|&v| v == 0.0));
    }
}
