//! ringscan CLI - simulate a spinning lidar around an STL model.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ringscan::{write_json_file, ScanEngine, ScanSettings};
use ringscan_index::SurfaceIndex;
use ringscan_math::Tolerance;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ringscan")]
#[command(about = "Simulated spinning lidar scans of triangle meshes", long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an STL model and write the point cloud as JSON
    Scan(ScanArgs),
    /// Print triangle count, bounds and mass properties of an STL model
    Info {
        /// Input STL file (ASCII or binary)
        input: PathBuf,
    },
}

#[derive(clap::Args)]
struct ScanArgs {
    /// Input STL file (ASCII or binary)
    input: PathBuf,
    /// Output JSON file
    #[arg(short, long, default_value = "sensor_data.json")]
    output: PathBuf,
    /// TOML file with scan settings and an optional [tolerance] table
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of height levels
    #[arg(long = "levels")]
    level_count: Option<usize>,
    /// Rays per revolution
    #[arg(long = "rays")]
    ray_count: Option<usize>,
    /// Lowest level height (default: bottom of the model)
    #[arg(long, allow_negative_numbers = true)]
    z_min: Option<f64>,
    /// Highest level height (default: top of the model)
    #[arg(long, allow_negative_numbers = true)]
    z_max: Option<f64>,
    /// Keep the model where it is instead of moving its center of mass to the origin
    #[arg(long)]
    no_center: bool,
    /// Scan levels on a single thread
    #[arg(long)]
    serial: bool,
}

/// Contents of a `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    #[serde(flatten)]
    scan: ScanSettings,
    tolerance: Tolerance,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

impl ScanArgs {
    /// Settings from the config file with command-line values layered on top.
    fn resolve(&self, mut config: FileConfig) -> FileConfig {
        let scan = &mut config.scan;
        if let Some(n) = self.level_count {
            scan.level_count = n;
        }
        if let Some(n) = self.ray_count {
            scan.ray_count = n;
        }
        if self.z_min.is_some() {
            scan.z_min = self.z_min;
        }
        if self.z_max.is_some() {
            scan.z_max = self.z_max;
        }
        if self.serial {
            scan.parallel = false;
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Scan(args) => run_scan(&args)?,
        Commands::Info { input } => show_info(&input)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_scan(args: &ScanArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = args.resolve(config);
    config.scan.validate()?;

    let surface = ringscan_mesh::load_stl(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    info!(path = %args.input.display(), triangles = surface.len(), "loaded model");

    let surface = if args.no_center {
        surface
    } else {
        let (centered, offset) =
            ringscan_mesh::center_on_mass(surface).context("failed to center model")?;
        info!(x = offset.x, y = offset.y, z = offset.z, "moved center of mass to origin");
        centered
    };

    let start = Instant::now();
    let index = SurfaceIndex::build_with_tolerance(surface, config.tolerance)
        .context("failed to build surface index")?;
    info!(
        nodes = index.node_count(),
        depth = index.depth(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "built surface index"
    );

    let start = Instant::now();
    let model = ScanEngine::new(&index).scan(&config.scan)?;
    let stats = model.stats();
    info!(
        levels = stats.levels,
        rays = stats.rays_cast,
        hits = stats.hits,
        misses = stats.misses,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "scan finished"
    );

    write_json_file(&model, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(path = %args.output.display(), "wrote point cloud");

    Ok(())
}

fn show_info(input: &Path) -> Result<()> {
    let surface = ringscan_mesh::load_stl(input)
        .with_context(|| format!("failed to load {}", input.display()))?;
    let props = ringscan_mesh::mass_properties(&surface)?;

    println!("File: {}", input.display());
    println!("Triangles: {}", surface.len());
    if let Some(bounds) = surface.bounds() {
        println!(
            "Bounds: ({:.4}, {:.4}, {:.4}) .. ({:.4}, {:.4}, {:.4})",
            bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
        );
    }
    println!("Area: {:.6}", props.area);
    println!("Volume: {:.6}", props.volume);
    let c = props.center_of_mass;
    println!("Center of mass: ({:.6}, {:.6}, {:.6})", c.x, c.y, c.z);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cmd: &[&str]) -> ScanArgs {
        let cli = Cli::try_parse_from(cmd).unwrap();
        match cli.command {
            Commands::Scan(args) => args,
            Commands::Info { .. } => panic!("expected scan"),
        }
    }

    #[test]
    fn test_config_file() {
        let config = FileConfig::parse(
            r#"
            level_count = 50
            parallel = false

            [tolerance]
            ray_origin = 1e-6
            "#,
        )
        .unwrap();
        assert_eq!(config.scan.level_count, 50);
        assert_eq!(config.scan.ray_count, 100);
        assert!(!config.scan.parallel);
        assert_eq!(config.tolerance.ray_origin, 1e-6);
        assert_eq!(config.tolerance.edge, Tolerance::DEFAULT.edge);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = FileConfig::parse("").unwrap();
        assert_eq!(config.scan, ScanSettings::default());
        assert_eq!(config.tolerance, Tolerance::DEFAULT);
    }

    #[test]
    fn test_bad_config() {
        assert!(FileConfig::parse("level_count = \"many\"").is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = args(&[
            "ringscan", "scan", "model.stl", "--rays", "360", "--z-min", "-2.5", "--serial",
        ]);
        let config = FileConfig::parse("level_count = 10\nray_count = 20").unwrap();
        let resolved = args.resolve(config);
        assert_eq!(resolved.scan.level_count, 10);
        assert_eq!(resolved.scan.ray_count, 360);
        assert_eq!(resolved.scan.z_min, Some(-2.5));
        assert_eq!(resolved.scan.z_max, None);
        assert!(!resolved.scan.parallel);
        assert_eq!(args.output, PathBuf::from("sensor_data.json"));
    }

    #[test]
    fn test_info_command() {
        let cli = Cli::try_parse_from(["ringscan", "-v", "info", "part.stl"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Info { .. }));
    }
}
