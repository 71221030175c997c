//! roomscan CLI - inspect scan recordings and take measurements offline
//!
//! Replays LRAW recordings through the patch store and drives the
//! measurement controller with scripted taps.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use roomscan::{
    mesh_volume, read_lraw_file, AnchorMeshStore, Classification, DisplayUnit, MeasureConfig,
    MeasureMode, MeasurementController, Point3,
};

#[derive(Parser)]
#[command(name = "roomscan")]
#[command(about = "Offline LiDAR room scanning and measurement", long_about = None)]
struct Cli {
    /// Log everything down to trace level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize the fused mesh of an LRAW recording
    Info {
        /// Path to the .lraw recording
        file: PathBuf,
        /// Measurement config (TOML) providing the up axis
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run scripted taps through the measurement controller
    Measure {
        /// Measurement mode: distance, area, volume or angle
        #[arg(short, long)]
        mode: MeasureMode,
        /// World-space taps as "x,y,z;x,y,z;..." in meters
        #[arg(short, long, allow_hyphen_values = true)]
        points: String,
        /// Display unit: m, cm, ft or in (overrides the config)
        #[arg(short, long)]
        unit: Option<DisplayUnit>,
        /// Recording whose fused mesh backs volume measurements
        #[arg(long)]
        mesh: Option<PathBuf>,
        /// Measurement config (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the session as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Info { file, config } => {
            let config = load_config(config.as_deref())?;
            show_info(&file, &config)?;
        }
        Commands::Measure {
            mode,
            points,
            unit,
            mesh,
            config,
            json,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(unit) = unit {
                config.default_unit = unit;
            }
            let points = parse_points(&points)?;
            run_measure(mode, &points, mesh.as_deref(), config, json)?;
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    // Logs go to stderr so JSON on stdout stays machine-readable
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("trace")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("info,roomscan_anchors=debug,roomscan_measure=debug")
        })
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<MeasureConfig> {
    match path {
        Some(path) => MeasureConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(MeasureConfig::default()),
    }
}

fn load_store(path: &Path) -> Result<AnchorMeshStore> {
    let recording = read_lraw_file(path)
        .with_context(|| format!("failed to read recording {}", path.display()))?;
    debug!(
        version = recording.version,
        texture_frames = recording.texture_count,
        depth_frames = recording.depth_count,
        "replaying recording"
    );
    let mut store = AnchorMeshStore::new();
    store.apply_all(recording.into_events());
    Ok(store)
}

fn show_info(path: &Path, config: &MeasureConfig) -> Result<()> {
    let store = load_store(path)?;
    let stats = store.stats();
    let mesh = store.unify();

    println!("File: {}", path.display());
    println!("Patches: {}", stats.patch_count);
    println!("Vertices: {}", stats.vertex_count);
    println!("Faces: {}", stats.face_count);
    println!("Surface area: {:.2} m\u{00b2}", stats.surface_area);

    let classified: Vec<_> = Classification::ALL
        .iter()
        .filter(|&&class| class != Classification::None)
        .map(|&class| (class, mesh.classified_area(class)))
        .filter(|&(_, area)| area > 0.0)
        .collect();
    if !classified.is_empty() {
        println!("Classified area:");
        for (class, area) in classified {
            println!("  {:<8} {:.2} m\u{00b2}", format!("{class:?}"), area);
        }
    }

    match mesh.bounds() {
        Some(bounds) => {
            let e = bounds.extent();
            println!(
                "Bounds: {:.2} x {:.2} x {:.2} m (min {:.2}, {:.2}, {:.2})",
                e.x, e.y, e.z, bounds.min.x, bounds.min.y, bounds.min.z
            );
            println!("Bounding box volume: {:.2} m\u{00b3}", bounds.volume());
            println!("Closed-mesh volume: {:.2} m\u{00b3}", mesh_volume(&mesh));
            println!(
                "Height ({:?} axis): {:.2} m",
                config.up_axis,
                bounds.span(config.up_axis)
            );
        }
        None => println!("Bounds: (empty)"),
    }

    Ok(())
}

fn run_measure(
    mode: MeasureMode,
    points: &[Point3],
    mesh: Option<&Path>,
    config: MeasureConfig,
    json: bool,
) -> Result<()> {
    let mut controller = MeasurementController::with_config(config);
    if let Some(path) = mesh {
        controller.set_mesh_source(load_store(path)?);
    }
    controller.switch_mode(mode);

    for &point in points {
        controller.add_point(point);
    }
    if controller.point_count() > 0 {
        if controller.can_complete() {
            controller.complete();
        } else {
            warn!(
                mode = %mode,
                leftover = controller.point_count(),
                "{}",
                controller.instruction()
            );
        }
    }

    let session = controller.session();
    if json {
        println!("{}", session.to_json()?);
        return Ok(());
    }

    if session.is_empty() {
        println!("No measurements ({} needs {} points)", mode, mode.min_points());
        return Ok(());
    }
    for (i, m) in session.measurements().iter().enumerate() {
        println!("{:>3}  {:<8} {}", i + 1, m.kind, session.format(m));
    }
    Ok(())
}

fn parse_points(text: &str) -> Result<Vec<Point3>> {
    text.split(';')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            let coords = chunk
                .split(',')
                .map(|c| c.trim().parse::<f32>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .with_context(|| format!("invalid coordinate in point {chunk:?}"))?;
            match coords.as_slice() {
                &[x, y, z] => Ok(Point3::new(x, y, z)),
                _ => bail!("point {chunk:?} needs exactly three coordinates"),
            }
        })
        .collect()
}
