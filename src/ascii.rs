//! ASCII rendering and export of region maps
//!
//! Renders the packed region grid as text for terminal previews and plain
//! text world files.

use std::fs::File;
use std::io::{self, Write};

use crate::region::{Elevation, Humidity, Region, RegionField, Temperature};
use crate::world::WorldGenerator;

/// ASCII rendering modes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsciiMode {
    /// Terrain characters combining all bands
    Regions,
    /// Band ordinal of a single field
    Field(RegionField),
}

impl AsciiMode {
    pub fn name(&self) -> &'static str {
        match self {
            AsciiMode::Regions => "Regions",
            AsciiMode::Field(field) => field.descriptor(),
        }
    }
}

/// Terrain character for a region
pub fn region_char(region: Region) -> char {
    match (region.elevation(), region.temperature(), region.humidity()) {
        (Elevation::Low, Temperature::Cold, _) => '*',
        (Elevation::Low, _, _) => '~',
        (Elevation::Mid, _, Humidity::Dry) => '.',
        (Elevation::Mid, _, Humidity::Moderate) => '"',
        (Elevation::Mid, _, Humidity::Wet) => '&',
        (Elevation::High, Temperature::Cold, _) => 'A',
        (Elevation::High, _, _) => '^',
    }
}

/// Digit for a band ordinal
pub fn band_char(band: u8) -> char {
    char::from(b'0' + band.min(9))
}

/// Render the world as text, one line per row, sampling every `step` cells.
pub fn render_ascii_map(world: &WorldGenerator, mode: AsciiMode, step: usize) -> String {
    let size = world.size();
    let step = step.max(1);
    let cols = size.div_ceil(step);
    let mut result = String::with_capacity((cols + 1) * cols);

    for y in (0..size).step_by(step) {
        for x in (0..size).step_by(step) {
            let region = world.region(x, y);
            let ch = match mode {
                AsciiMode::Regions => region_char(region),
                AsciiMode::Field(field) => band_char(region.band(field)),
            };
            result.push(ch);
        }
        result.push('\n');
    }

    result
}

/// Legend for region characters
pub fn region_legend() -> String {
    "=== REGION LEGEND ===\n\
     ~ Low (water)      * Low, cold (ice)\n\
     . Mid, dry         \" Mid, moderate    & Mid, wet\n\
     ^ High             A High, cold\n"
        .to_string()
}

/// Export a world summary, map and band statistics to a text file
pub fn export_world_file(world: &WorldGenerator, path: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    let size = world.size();
    let total = size * size;

    writeln!(file, "=== REGION GENERATOR WORLD FILE ===")?;
    writeln!(file, "Seed: {}", world.seed())?;
    writeln!(file, "Size: {}x{}", size, size)?;
    writeln!(file)?;

    writeln!(file, "=== MAP ===")?;
    write!(file, "{}", render_ascii_map(world, AsciiMode::Regions, 1))?;
    writeln!(file)?;
    write!(file, "{}", region_legend())?;
    writeln!(file)?;

    writeln!(file, "=== STATISTICS ===")?;
    for field in RegionField::ALL {
        writeln!(file, "{} (modifier {:.2}):", field, world.modifier(field))?;
        for (band, count) in world.band_histogram(field).iter().enumerate() {
            let pct = 100.0 * *count as f64 / total as f64;
            writeln!(
                file,
                "  {:10} {:>6} ({:>5.1}%)",
                field.band_name(band as u8),
                count,
                pct
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    fn small_world() -> WorldGenerator {
        let config = WorldConfig {
            size: 32,
            river_endpoint_resolution: 32,
            ..Default::default()
        };
        WorldGenerator::with_config(99, config).unwrap()
    }

    #[test]
    fn test_region_chars() {
        assert_eq!(region_char(Region::pack(1, 0, 1, 0)), '~');
        assert_eq!(region_char(Region::pack(0, 0, 1, 0)), '*');
        assert_eq!(region_char(Region::pack(2, 1, 2, 0)), '&');
        assert_eq!(region_char(Region::pack(0, 2, 0, 3)), 'A');
        assert_eq!(band_char(3), '3');
    }

    #[test]
    fn test_render_dimensions() {
        let world = small_world();
        let full = render_ascii_map(&world, AsciiMode::Regions, 1);
        assert_eq!(full.lines().count(), 32);
        assert!(full.lines().all(|l| l.chars().count() == 32));

        let half = render_ascii_map(&world, AsciiMode::Field(RegionField::Tier), 3);
        assert_eq!(half.lines().count(), 11);
        assert!(half.chars().all(|c| c == '\n' || ('0'..='3').contains(&c)));
    }

    #[test]
    fn test_export_world_file() {
        let world = small_world();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.txt");
        export_world_file(&world, path.to_str().unwrap()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Seed: 99"));
        assert!(text.contains("Temperature (modifier 0.50):"));
    }
}
