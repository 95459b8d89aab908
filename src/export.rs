use std::path::{Path, PathBuf};

use image::{GrayImage, ImageBuffer, Luma, Rgba, RgbaImage};

use crate::region::{Elevation, Humidity, Region, RegionField, Temperature};
use crate::world::WorldGenerator;

/// Render any per-cell value in 0..1 as an 8-bit greyscale image.
/// Values outside 0..1 are clamped.
pub fn render_heightmap<F>(width: usize, height: usize, value: F) -> GrayImage
where
    F: Fn(usize, usize) -> f32,
{
    let mut img: GrayImage = ImageBuffer::new(width as u32, height as u32);
    for y in 0..height {
        for x in 0..width {
            let v = value(x, y).clamp(0.0, 1.0);
            img.put_pixel(x as u32, y as u32, Luma([(v * 255.0).round() as u8]));
        }
    }
    img
}

/// Render any per-cell colour as an RGBA image.
pub fn render_bitmap<F>(width: usize, height: usize, color: F) -> RgbaImage
where
    F: Fn(usize, usize) -> [u8; 4],
{
    let mut img: RgbaImage = ImageBuffer::new(width as u32, height as u32);
    for y in 0..height {
        for x in 0..width {
            img.put_pixel(x as u32, y as u32, Rgba(color(x, y)));
        }
    }
    img
}

/// Parse a `rrggbb` hex literal into an opaque colour.
const fn hex(rgb: u32) -> [u8; 4] {
    [(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 255]
}

/// Terrain palette keyed by elevation, then temperature, then humidity.
pub fn region_color(region: Region) -> [u8; 4] {
    match region.elevation() {
        Elevation::Low => match region.temperature() {
            Temperature::Cold => hex(0x9bbbbf),  // ice
            _ => hex(0x26465c),                  // water
        },
        Elevation::Mid => match (region.temperature(), region.humidity()) {
            (Temperature::Cold, Humidity::Dry) => hex(0x596555),
            (Temperature::Cold, _) => hex(0x384235),
            (Temperature::Temperate, Humidity::Dry) => hex(0x858b81),
            (Temperature::Temperate, Humidity::Moderate) => hex(0x88965d),
            (Temperature::Temperate, Humidity::Wet) => hex(0x566e3a),
            (Temperature::Hot, Humidity::Dry) => hex(0xbba67d),
            (Temperature::Hot, Humidity::Moderate) => hex(0xbabc81),
            (Temperature::Hot, Humidity::Wet) => hex(0x244716),
        },
        Elevation::High => match region.temperature() {
            Temperature::Cold => hex(0xa1a3af),
            Temperature::Temperate => hex(0x7d858f),
            Temperature::Hot => hex(0x957557),
        },
    }
}

/// Diagnostic colouring: hue from temperature, saturation from humidity,
/// value from elevation.
pub fn region_color_hsv(region: Region) -> [u8; 4] {
    let hue = match region.temperature() {
        Temperature::Cold => 180.0,
        Temperature::Temperate => 90.0,
        Temperature::Hot => 20.0,
    };
    let saturation = match region.humidity() {
        Humidity::Dry => 0.30,
        Humidity::Moderate => 0.50,
        Humidity::Wet => 0.80,
    };
    let value = match region.elevation() {
        Elevation::Low => 0.35,
        Elevation::Mid => 0.50,
        Elevation::High => 0.75,
    };
    let [r, g, b] = hsv_to_rgb(hue, saturation, value);
    [r, g, b, 255]
}

/// HSV (hue in degrees, saturation and value in 0..1) to 8-bit RGB.
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> [u8; 3] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = value * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = value - c;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(r), to_byte(g), to_byte(b)]
}

// =============================================================================
// WORLD EXPORTS
// =============================================================================

/// Export a field's modified continuous value as greyscale.
pub fn export_field(world: &WorldGenerator, field: RegionField, path: &str) -> Result<(), image::ImageError> {
    let size = world.size();
    render_heightmap(size, size, |x, y| world.continuous_value(field, x, y)).save(path)
}

/// Export a field's band as greyscale steps.
pub fn export_field_bands(
    world: &WorldGenerator,
    field: RegionField,
    path: &str,
) -> Result<(), image::ImageError> {
    let size = world.size();
    render_heightmap(size, size, |x, y| field.band_height(world.region(x, y).band(field))).save(path)
}

/// Export the terrain palette bitmap.
pub fn export_region_colors(world: &WorldGenerator, path: &str) -> Result<(), image::ImageError> {
    let size = world.size();
    render_bitmap(size, size, |x, y| region_color(world.region(x, y))).save(path)
}

/// Export the HSV diagnostic bitmap.
pub fn export_region_hsv(world: &WorldGenerator, path: &str) -> Result<(), image::ImageError> {
    let size = world.size();
    render_bitmap(size, size, |x, y| region_color_hsv(world.region(x, y))).save(path)
}

/// Write every debug image into `dir` and return the written paths.
pub fn export_all(world: &WorldGenerator, dir: &Path) -> Result<Vec<PathBuf>, image::ImageError> {
    std::fs::create_dir_all(dir).map_err(image::ImageError::IoError)?;
    let mut written = Vec::new();
    let mut path_for = |name: String| {
        let path = dir.join(name);
        written.push(path.clone());
        path.to_string_lossy().into_owned()
    };

    for field in RegionField::ALL {
        let name = field.descriptor().to_lowercase();
        export_field(world, field, &path_for(format!("{}.png", name)))?;
        export_field_bands(world, field, &path_for(format!("{}_bands.png", name)))?;
    }
    export_region_colors(world, &path_for("regions.png".to_string()))?;
    export_region_hsv(world, &path_for("regions_hsv.png".to_string()))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), [255, 0, 0]);
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), [0, 255, 0]);
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), [0, 0, 255]);
        assert_eq!(hsv_to_rgb(77.0, 0.0, 0.5), [128, 128, 128]);
    }

    #[test]
    fn test_palette_lookup() {
        assert_eq!(region_color(Region::pack(1, 0, 2, 0)), [0x26, 0x46, 0x5c, 255]);
        assert_eq!(region_color(Region::pack(0, 0, 2, 3)), [0x9b, 0xbb, 0xbf, 255]);
        assert_eq!(region_color(Region::pack(2, 1, 2, 0)), [0x24, 0x47, 0x16, 255]);
        assert_eq!(region_color(Region::pack(1, 2, 0, 1)), [0x7d, 0x85, 0x8f, 255]);
    }

    #[test]
    fn test_hsv_scheme_brightens_with_elevation() {
        let low = region_color_hsv(Region::pack(1, 0, 1, 0));
        let high = region_color_hsv(Region::pack(1, 2, 1, 0));
        assert!(low.iter().take(3).max() < high.iter().take(3).max());
    }

    #[test]
    fn test_render_heightmap_clamps() {
        let img = render_heightmap(3, 1, |x, _| x as f32 - 0.5);
        assert_eq!(img.get_pixel(0, 0).0, [0]);
        assert_eq!(img.get_pixel(1, 0).0, [128]);
        assert_eq!(img.get_pixel(2, 0).0, [255]);
    }

    #[test]
    fn test_export_all_writes_images() {
        let config = WorldConfig {
            size: 32,
            river_endpoint_resolution: 32,
            ..Default::default()
        };
        let world = WorldGenerator::with_config(12999, config).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let written = export_all(&world, dir.path()).unwrap();
        assert_eq!(written.len(), 10);
        for path in &written {
            let img = image::open(path).unwrap();
            assert_eq!((img.width(), img.height()), (32, 32), "{}", path.display());
        }
    }
}
