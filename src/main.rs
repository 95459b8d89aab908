use std::path::PathBuf;

use clap::Parser;

use region_generator::ascii::{self, AsciiMode};
use region_generator::export;
use region_generator::{GenError, RegionField, WorldConfig, WorldGenerator};

#[derive(Parser, Debug)]
#[command(name = "region_generator")]
#[command(about = "Generate deterministic classified region maps from a seed")]
struct Args {
    /// Random seed (uses random seed if not specified)
    #[arg(short, long, allow_negative_numbers = true)]
    seed: Option<i32>,

    /// Side length of the square world (overrides the config file)
    #[arg(short = 'S', long)]
    size: Option<usize>,

    /// JSON config file; missing keys keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Global temperature modifier (0.0-1.0)
    #[arg(long)]
    temperature: Option<f32>,

    /// Global elevation modifier (0.0-1.0)
    #[arg(long)]
    elevation: Option<f32>,

    /// Global humidity modifier (0.0-1.0)
    #[arg(long)]
    humidity: Option<f32>,

    /// Global tier modifier (0.0-1.0)
    #[arg(long)]
    tier: Option<f32>,

    /// Write debug PNGs and a text world file into this directory
    #[arg(short, long)]
    export_dir: Option<PathBuf>,

    /// Print a terminal preview of the region map
    #[arg(long)]
    ascii: bool,

    /// Preview one field's band digits instead of terrain (implies --ascii)
    #[arg(long)]
    ascii_field: Option<RegionField>,

    /// Sample every Nth cell in the terminal preview
    #[arg(long, default_value = "2")]
    ascii_step: usize,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

fn load_config(args: &Args) -> Result<WorldConfig, GenError> {
    let mut config = match &args.config {
        Some(path) => WorldConfig::from_json_file(path)?,
        None => WorldConfig::default(),
    };
    if let Some(size) = args.size {
        config.size = size;
    }
    config.validate()?;
    Ok(config)
}

fn print_summary(world: &WorldGenerator) {
    let total = (world.size() * world.size()) as f64;
    for field in RegionField::ALL {
        let bands: Vec<String> = world
            .band_histogram(field)
            .iter()
            .enumerate()
            .map(|(band, &count)| {
                format!("{} {:.1}%", field.band_name(band as u8), 100.0 * count as f64 / total)
            })
            .collect();
        println!("  {:12} {}", field.descriptor(), bands.join(", "));
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args)?;
    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    println!("Generating world with seed: {}", seed);
    println!("Map size: {}x{}", config.size, config.size);

    let mut world = WorldGenerator::with_config(seed, config)?;

    let modifiers = [
        (RegionField::Temperature, args.temperature),
        (RegionField::Elevation, args.elevation),
        (RegionField::Humidity, args.humidity),
        (RegionField::Tier, args.tier),
    ];
    for (field, value) in modifiers {
        if let Some(value) = value {
            world.adjust_modifier(field, value);
        }
    }

    println!("Band distribution:");
    print_summary(&world);

    if args.ascii || args.ascii_field.is_some() {
        let mode = args.ascii_field.map_or(AsciiMode::Regions, AsciiMode::Field);
        println!();
        println!("=== {} (every {} cells) ===", mode.name(), args.ascii_step.max(1));
        print!("{}", ascii::render_ascii_map(&world, mode, args.ascii_step));
        if mode == AsciiMode::Regions {
            print!("{}", ascii::region_legend());
        }
    }

    if let Some(dir) = &args.export_dir {
        let written = export::export_all(&world, dir)?;
        let world_file = dir.join("world.txt");
        ascii::export_world_file(&world, &world_file.to_string_lossy())?;
        println!("Exported {} images and {} to {}", written.len(), world_file.display(), dir.display());
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
