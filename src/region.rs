//! Region classification and bit packing.
//!
//! Each of the four continuous fields is mapped to a small ordinal band via
//! fixed thresholds. The four bands share one `u32` per cell:
//!
//! | bits | field       | bands                        |
//! |------|-------------|------------------------------|
//! | 0-1  | temperature | Cold, Temperate, Hot         |
//! | 2-3  | elevation   | Low, Mid, High               |
//! | 4-5  | humidity    | Dry, Moderate, Wet           |
//! | 6-7  | tier        | 0, 1, 2, 3                   |
//!
//! Bits 8 and up are always zero.

use std::fmt;
use std::str::FromStr;

use crate::noise_field::{lerp, smooth};

const BAND_MASK: u32 = 0b11;

/// One of the four classified fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionField {
    Temperature,
    Elevation,
    Humidity,
    Tier,
}

impl RegionField {
    pub const ALL: [RegionField; 4] = [
        RegionField::Temperature,
        RegionField::Elevation,
        RegionField::Humidity,
        RegionField::Tier,
    ];

    /// Bit offset of this field's band inside a [`Region`].
    pub fn offset(self) -> u32 {
        match self {
            RegionField::Temperature => 0,
            RegionField::Elevation => 2,
            RegionField::Humidity => 4,
            RegionField::Tier => 6,
        }
    }

    /// Ascending band thresholds. A value below `thresholds[i]` and at or
    /// above every earlier threshold falls into band `i`.
    pub fn thresholds(self) -> &'static [f32] {
        match self {
            RegionField::Temperature => &[0.15, 0.68],
            RegionField::Elevation => &[0.1, 0.35],
            RegionField::Humidity => &[0.44, 0.68],
            RegionField::Tier => &[0.1, 0.33, 0.66],
        }
    }

    pub fn band_count(self) -> u8 {
        self.thresholds().len() as u8 + 1
    }

    /// Brighten factor range `(min, max)` swept by the global modifier.
    pub fn modifier_range(self) -> (f32, f32) {
        match self {
            RegionField::Temperature => (-0.10, 0.25),
            RegionField::Elevation => (-0.25, 0.25),
            RegionField::Humidity => (-0.12, 0.12),
            RegionField::Tier => (-0.6, 0.75),
        }
    }

    pub fn descriptor(self) -> &'static str {
        match self {
            RegionField::Temperature => "Temperature",
            RegionField::Elevation => "Elevation",
            RegionField::Humidity => "Humidity",
            RegionField::Tier => "Tier",
        }
    }

    /// Display name of a band ordinal.
    pub fn band_name(self, band: u8) -> &'static str {
        match self {
            RegionField::Temperature => Temperature::from_band(band).descriptor(),
            RegionField::Elevation => Elevation::from_band(band).descriptor(),
            RegionField::Humidity => Humidity::from_band(band).descriptor(),
            RegionField::Tier => Tier::from_band(band).descriptor(),
        }
    }

    /// Grey level used when a band is exported as a heightmap.
    pub fn band_height(self, band: u8) -> f32 {
        match self {
            RegionField::Tier => [0.0, 0.2, 0.5, 1.0][(band & 0b11) as usize],
            _ => [0.0, 0.33, 1.0][(band as usize) % 3],
        }
    }

    /// Band of an already-modified value.
    pub fn classify(self, value: f32) -> u8 {
        self.thresholds().iter().take_while(|&&t| value >= t).count() as u8
    }

    /// Raw field value as seen through a global modifier in [0, 1].
    pub fn modified_value(self, raw: f32, modifier: f32) -> f32 {
        let (min, max) = self.modifier_range();
        brighten(raw, lerp(min, max, smooth(modifier)))
    }
}

impl fmt::Display for RegionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor())
    }
}

impl FromStr for RegionField {
    type Err = String;

    /// Case-insensitive descriptor, e.g. `humidity`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegionField::ALL
            .into_iter()
            .find(|field| field.descriptor().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown field '{}' (expected temperature, elevation, humidity or tier)", s)
            })
    }
}

/// Scale `value` by `1 + factor`.
pub fn brighten(value: f32, factor: f32) -> f32 {
    value * (1.0 + factor)
}

// =============================================================================
// TYPED BANDS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Temperature {
    Cold,
    Temperate,
    Hot,
}

impl Temperature {
    pub const ALL: [Temperature; 3] = [Temperature::Cold, Temperature::Temperate, Temperature::Hot];

    pub fn from_band(band: u8) -> Self {
        Self::ALL[band as usize % Self::ALL.len()]
    }

    pub fn descriptor(self) -> &'static str {
        match self {
            Temperature::Cold => "Cold",
            Temperature::Temperate => "Temperate",
            Temperature::Hot => "Hot",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Elevation {
    Low,
    Mid,
    High,
}

impl Elevation {
    pub const ALL: [Elevation; 3] = [Elevation::Low, Elevation::Mid, Elevation::High];

    pub fn from_band(band: u8) -> Self {
        Self::ALL[band as usize % Self::ALL.len()]
    }

    pub fn descriptor(self) -> &'static str {
        match self {
            Elevation::Low => "Low",
            Elevation::Mid => "Mid",
            Elevation::High => "High",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Humidity {
    Dry,
    Moderate,
    Wet,
}

impl Humidity {
    pub const ALL: [Humidity; 3] = [Humidity::Dry, Humidity::Moderate, Humidity::Wet];

    pub fn from_band(band: u8) -> Self {
        Self::ALL[band as usize % Self::ALL.len()]
    }

    pub fn descriptor(self) -> &'static str {
        match self {
            Humidity::Dry => "Dry",
            Humidity::Moderate => "Moderate",
            Humidity::Wet => "Wet",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Zero,
    One,
    Two,
    Three,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Zero, Tier::One, Tier::Two, Tier::Three];

    pub fn from_band(band: u8) -> Self {
        Self::ALL[band as usize % Self::ALL.len()]
    }

    pub fn descriptor(self) -> &'static str {
        match self {
            Tier::Zero => "0",
            Tier::One => "1",
            Tier::Two => "2",
            Tier::Three => "3",
        }
    }
}

// =============================================================================
// PACKED REGION
// =============================================================================

/// Four band ordinals packed into the low byte of a `u32`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region(u32);

impl Region {
    pub fn pack(temperature: u8, elevation: u8, humidity: u8, tier: u8) -> Self {
        Region(0)
            .with_band(RegionField::Temperature, temperature)
            .with_band(RegionField::Elevation, elevation)
            .with_band(RegionField::Humidity, humidity)
            .with_band(RegionField::Tier, tier)
    }

    /// `(temperature, elevation, humidity, tier)` ordinals.
    pub fn unpack(self) -> (u8, u8, u8, u8) {
        (
            self.band(RegionField::Temperature),
            self.band(RegionField::Elevation),
            self.band(RegionField::Humidity),
            self.band(RegionField::Tier),
        )
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn band(self, field: RegionField) -> u8 {
        ((self.0 >> field.offset()) & BAND_MASK) as u8
    }

    /// Replace one field's band, leaving the others untouched.
    pub fn with_band(self, field: RegionField, band: u8) -> Self {
        let offset = field.offset();
        let cleared = self.0 & !(BAND_MASK << offset);
        Region(cleared | ((band as u32 & BAND_MASK) << offset))
    }

    pub fn temperature(self) -> Temperature {
        Temperature::from_band(self.band(RegionField::Temperature))
    }

    pub fn elevation(self) -> Elevation {
        Elevation::from_band(self.band(RegionField::Elevation))
    }

    pub fn humidity(self) -> Humidity {
        Humidity::from_band(self.band(RegionField::Humidity))
    }

    pub fn tier(self) -> Tier {
        Tier::from_band(self.band(RegionField::Tier))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / tier {}",
            self.temperature().descriptor(),
            self.elevation().descriptor(),
            self.humidity().descriptor(),
            self.tier().descriptor()
        )
    }
}
