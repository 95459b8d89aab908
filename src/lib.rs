//! Region generation library
//!
//! Deterministic seed-to-region-map pipeline: hash RNG, WFC landmass, grid
//! growth, noise fields, river carving and packed band classification.

pub mod ascii;
pub mod climate;
pub mod config;
pub mod error;
pub mod export;
pub mod growth;
pub mod heightmap;
pub mod landmass;
pub mod noise_field;
pub mod region;
pub mod rivers;
pub mod rng;
pub mod tiers;
pub mod tilemap;
pub mod world;

pub use config::WorldConfig;
pub use error::GenError;
pub use region::{Region, RegionField};
pub use world::WorldGenerator;
