//! World generator
//!
//! Owns the RNG, the four continuous fields and the packed region grid for one
//! seed. Modifier changes only reclassify; reseeding rebuilds everything.

use log::{debug, info};

use crate::climate::{generate_humidity, generate_temperature};
use crate::config::WorldConfig;
use crate::error::GenError;
use crate::heightmap::generate_elevation;
use crate::region::{Elevation, Humidity, Region, RegionField, Temperature, Tier};
use crate::rng::HashRng;
use crate::tiers::generate_tiers;
use crate::tilemap::Tilemap;

/// Modifier value that leaves a field's brighten factor at the centre of
/// its range.
pub const DEFAULT_MODIFIER: f32 = 0.5;

/// The four continuous fields, all in 0..1 and never touched by modifiers.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldFields {
    pub temperature: Tilemap<f32>,
    pub elevation: Tilemap<f32>,
    pub humidity: Tilemap<f32>,
    pub tier: Tilemap<f32>,
}

impl WorldFields {
    /// Run the full pipeline: elevation (landmass, detail, rivers), then
    /// temperature, humidity and tiers, in that draw order.
    pub fn generate(config: &WorldConfig, rng: &mut HashRng) -> Result<Self, GenError> {
        let elevation = generate_elevation(config, rng)?;
        let temperature = generate_temperature(&elevation, rng);
        let humidity = generate_humidity(&elevation, rng);
        let tier = generate_tiers(config.size, rng);
        Ok(Self {
            temperature,
            elevation,
            humidity,
            tier,
        })
    }

    pub fn get(&self, field: RegionField) -> &Tilemap<f32> {
        match field {
            RegionField::Temperature => &self.temperature,
            RegionField::Elevation => &self.elevation,
            RegionField::Humidity => &self.humidity,
            RegionField::Tier => &self.tier,
        }
    }
}

/// Deterministic region map for one seed.
#[derive(Clone, Debug)]
pub struct WorldGenerator {
    config: WorldConfig,
    rng: HashRng,
    fields: WorldFields,
    modifiers: [f32; 4],
    regions: Tilemap<Region>,
}

fn modifier_slot(field: RegionField) -> usize {
    match field {
        RegionField::Temperature => 0,
        RegionField::Elevation => 1,
        RegionField::Humidity => 2,
        RegionField::Tier => 3,
    }
}

impl WorldGenerator {
    pub fn new(seed: i32) -> Result<Self, GenError> {
        Self::with_config(seed, WorldConfig::default())
    }

    pub fn with_config(seed: i32, config: WorldConfig) -> Result<Self, GenError> {
        config.validate()?;
        info!("Building world for seed {} ({}x{})", seed, config.size, config.size);

        let mut rng = HashRng::new(seed);
        rng.set_position(config.initial_rng_position);
        rng.save_position();

        let fields = WorldFields::generate(&config, &mut rng)?;
        let mut world = Self {
            regions: Tilemap::new(config.size, config.size),
            config,
            rng,
            fields,
            modifiers: [DEFAULT_MODIFIER; 4],
        };
        world.classify_all();
        Ok(world)
    }

    /// Regenerate everything for `seed`. Draws restart at the checkpointed
    /// cursor, so the result matches a fresh generator built with `seed`.
    /// Reseeding with the current seed does nothing. On failure the previous
    /// world is kept.
    pub fn reseed(&mut self, seed: i32) -> Result<(), GenError> {
        if seed == self.rng.seed() {
            return Ok(());
        }
        info!("Reseeding world {} -> {}", self.rng.seed(), seed);
        let mut rng = self.rng.clone();
        rng.set_seed(seed);
        rng.load_position();
        let fields = WorldFields::generate(&self.config, &mut rng)?;

        self.rng = rng;
        self.fields = fields;
        self.classify_all();
        Ok(())
    }

    /// Set a global modifier. Values are clamped to [0, 1] and NaN reads as
    /// the default. Returns whether anything changed; only `field`'s band is
    /// recomputed.
    pub fn adjust_modifier(&mut self, field: RegionField, value: f32) -> bool {
        let value = if value.is_nan() {
            DEFAULT_MODIFIER
        } else {
            value.clamp(0.0, 1.0)
        };
        let slot = modifier_slot(field);
        if self.modifiers[slot] == value {
            return false;
        }
        self.modifiers[slot] = value;
        self.classify_field(field);
        debug!("{} modifier set to {:.3}", field, value);
        true
    }

    pub fn modifier(&self, field: RegionField) -> f32 {
        self.modifiers[modifier_slot(field)]
    }

    fn classify_field(&mut self, field: RegionField) {
        let raw = self.fields.get(field);
        let modifier = self.modifiers[modifier_slot(field)];
        for (x, y, region) in self.regions.iter_mut() {
            let band = field.classify(field.modified_value(*raw.get(x, y), modifier));
            *region = region.with_band(field, band);
        }
    }

    fn classify_all(&mut self) {
        for field in RegionField::ALL {
            self.classify_field(field);
        }
        for field in RegionField::ALL {
            debug!("{} bands: {:?}", field, self.band_histogram(field));
        }
    }

    pub fn seed(&self) -> i32 {
        self.rng.seed()
    }

    pub fn size(&self) -> usize {
        self.config.size
    }

    pub fn region(&self, x: usize, y: usize) -> Region {
        *self.regions.get(x, y)
    }

    pub fn regions(&self) -> &Tilemap<Region> {
        &self.regions
    }

    pub fn temperature(&self, x: usize, y: usize) -> Temperature {
        self.region(x, y).temperature()
    }

    pub fn elevation(&self, x: usize, y: usize) -> Elevation {
        self.region(x, y).elevation()
    }

    pub fn humidity(&self, x: usize, y: usize) -> Humidity {
        self.region(x, y).humidity()
    }

    pub fn tier(&self, x: usize, y: usize) -> Tier {
        self.region(x, y).tier()
    }

    /// Field value after the current modifier, before classification.
    pub fn continuous_value(&self, field: RegionField, x: usize, y: usize) -> f32 {
        let raw = *self.fields.get(field).get(x, y);
        field.modified_value(raw, self.modifier(field))
    }

    /// Unmodified field as generated.
    pub fn raw_field(&self, field: RegionField) -> &Tilemap<f32> {
        self.fields.get(field)
    }

    /// Number of cells in each band of `field`.
    pub fn band_histogram(&self, field: RegionField) -> Vec<usize> {
        let mut counts = vec![0; field.band_count() as usize];
        for (_, _, region) in self.regions.iter() {
            let band = region.band(field) as usize;
            if let Some(count) = counts.get_mut(band) {
                *count += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> WorldConfig {
        WorldConfig {
            size: 48,
            river_endpoint_resolution: 48,
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_default_world() {
        let world = WorldGenerator::new(12999).expect("world generation failed");
        assert_eq!(world.size(), 128);
        let regions = world.regions();
        assert_eq!((regions.width, regions.height), (128, 128));

        let mut low = 0;
        for (x, y, region) in regions.iter() {
            assert_eq!(region.bits() >> 8, 0, "reserved bits set at ({}, {})", x, y);
            if region.elevation() == Elevation::Low {
                low += 1;
            }
        }
        assert!(low > 0, "no low cells in a world with sea and rivers");
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let a = WorldGenerator::with_config(7, small_config()).unwrap();
        let b = WorldGenerator::with_config(7, small_config()).unwrap();
        assert_eq!(a.regions(), b.regions());
        for field in RegionField::ALL {
            assert_eq!(a.raw_field(field), b.raw_field(field));
        }
    }

    #[test]
    fn test_modifier_isolation() {
        let mut world = WorldGenerator::with_config(12999, small_config()).unwrap();
        let before = world.regions().clone();
        let fields_before = world.fields.clone();

        assert!(world.adjust_modifier(RegionField::Temperature, 0.95));

        assert_eq!(world.fields, fields_before);
        for (x, y, region) in world.regions().iter() {
            let old = before.get(x, y);
            for field in [RegionField::Elevation, RegionField::Humidity, RegionField::Tier] {
                assert_eq!(region.band(field), old.band(field), "{} changed at ({}, {})", field, x, y);
            }
            assert!(region.band(RegionField::Temperature) >= old.band(RegionField::Temperature));
        }
    }

    #[test]
    fn test_modifier_clamping() {
        let mut world = WorldGenerator::with_config(3, small_config()).unwrap();
        assert!(!world.adjust_modifier(RegionField::Humidity, DEFAULT_MODIFIER));
        assert!(world.adjust_modifier(RegionField::Humidity, 4.0));
        assert_eq!(world.modifier(RegionField::Humidity), 1.0);
        assert!(world.adjust_modifier(RegionField::Humidity, -1.0));
        assert_eq!(world.modifier(RegionField::Humidity), 0.0);
        assert!(world.adjust_modifier(RegionField::Humidity, f32::NAN));
        assert_eq!(world.modifier(RegionField::Humidity), DEFAULT_MODIFIER);
    }

    #[test]
    fn test_modifier_round_trip_restores_regions() {
        let mut world = WorldGenerator::with_config(11, small_config()).unwrap();
        let original = world.regions().clone();
        world.adjust_modifier(RegionField::Tier, 0.0);
        world.adjust_modifier(RegionField::Tier, DEFAULT_MODIFIER);
        assert_eq!(world.regions(), &original);
    }

    #[test]
    fn test_reseed_matches_fresh_world() {
        let fresh = WorldGenerator::with_config(21, small_config()).unwrap();
        let mut world = WorldGenerator::with_config(5, small_config()).unwrap();
        world.reseed(21).unwrap();
        assert_eq!(world.seed(), 21);
        assert_eq!(world.regions(), fresh.regions());
        assert_eq!(world.raw_field(RegionField::Elevation), fresh.raw_field(RegionField::Elevation));
    }

    #[test]
    fn test_reseed_same_seed_is_noop() {
        let mut world = WorldGenerator::with_config(9, small_config()).unwrap();
        world.adjust_modifier(RegionField::Elevation, 0.8);
        let regions = world.regions().clone();
        world.reseed(9).unwrap();
        assert_eq!(world.regions(), &regions);
        assert_eq!(world.modifier(RegionField::Elevation), 0.8);
    }

    #[test]
    fn test_continuous_value_applies_modifier() {
        let mut world = WorldGenerator::with_config(2, small_config()).unwrap();
        let raw = *world.raw_field(RegionField::Elevation).get(10, 10);
        assert!((world.continuous_value(RegionField::Elevation, 10, 10) - raw).abs() < 1e-6);
        world.adjust_modifier(RegionField::Elevation, 1.0);
        assert!((world.continuous_value(RegionField::Elevation, 10, 10) - raw * 1.25).abs() < 1e-5);
    }

    #[test]
    fn test_histogram_covers_grid() {
        let world = WorldGenerator::with_config(4, small_config()).unwrap();
        for field in RegionField::ALL {
            let hist = world.band_histogram(field);
            assert_eq!(hist.len(), field.band_count() as usize);
            assert_eq!(hist.iter().sum::<usize>(), 48 * 48);
        }
    }

    #[test]
    fn test_small_world_with_default_endpoint_resolution() {
        let config = WorldConfig {
            size: 32,
            ..Default::default()
        };
        let world = WorldGenerator::with_config(12999, config).unwrap();
        assert_eq!(world.regions().width, 32);
        let low = world
            .regions()
            .iter()
            .filter(|(_, _, r)| r.elevation() == Elevation::Low)
            .count();
        assert!(low > 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = WorldConfig {
            size: 1,
            ..Default::default()
        };
        assert!(matches!(
            WorldGenerator::with_config(1, config),
            Err(GenError::InvalidConfig(_))
        ));
    }
}
