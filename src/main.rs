//! colonnade — lay out a scene file and print the resulting geometry.
//!
//! The explicit application entry point: discovery of containers and
//! construction of instances happen here, under host control, not on
//! library load.

use clap::Parser;
use colonnade::config;
use colonnade::discover::discover_containers;
use colonnade::engine::LayoutInstance;
use colonnade::surface::{MockSurface, Scene};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::info;

/// Responsive column-balancing layout over a serialized scene.
#[derive(Parser, Debug)]
#[command(name = "colonnade")]
#[command(version)]
#[command(about = "Compute a balanced multi-column layout for a scene file")]
pub struct Args {
    /// Path to the JSON scene file.
    pub scene: PathBuf,

    /// Override the scene's viewport width (pixels).
    #[arg(short = 'w', long)]
    pub viewport_width: Option<f64>,

    /// Debounce delay override (milliseconds).
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Path to configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the log file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → config file → env vars → CLI args.
    let app_config = {
        let file = config::load_config_with_precedence(args.config.clone())?;
        let merged = config::merge_config(file);
        let with_env = config::apply_env_overrides(merged);
        config::apply_cli_overrides(with_env, args.log_file.clone(), args.debounce_ms)
    };

    colonnade::logging::init(&app_config.log_file_path)?;
    info!(config = ?app_config, "configuration loaded and resolved");

    let scene_text = std::fs::read_to_string(&args.scene)?;
    let scene: Scene = serde_json::from_str(&scene_text)?;
    let mut surface = MockSurface::from_scene(&scene);
    if let Some(width) = args.viewport_width {
        surface.set_viewport_width(width);
    }

    // One shared surface, one instance per discovered container.
    let surface = Rc::new(RefCell::new(surface));
    let options = app_config.options;
    let containers = discover_containers(
        &surface,
        &options.discovery_attr,
        &options.discovery_value,
    );

    let mut snapshots = Vec::with_capacity(containers.len());
    for container in containers {
        let mut instance = LayoutInstance::new(Rc::clone(&surface), container, options.clone());
        instance.init()?;
        snapshots.push(instance.state());
    }

    let output = if args.pretty {
        serde_json::to_string_pretty(&snapshots)?
    } else {
        serde_json::to_string(&snapshots)?
    };
    println!("{output}");
    Ok(())
}
