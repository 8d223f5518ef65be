use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use shinytrace::{
    RenderSession, RenderSettings, SceneGraph, WorkerCount,
    demo::{demo_camera, demo_lights, demo_scene},
    geometry::ScreenSize,
    scene::{DEFAULT_SOFT_SHADOW_WIDTH, Geometry, MAX_RECURSION_DEPTH, Mesh, ShadowMode},
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Shadows {
    Off,
    Hard,
    Soft,
}

impl From<Shadows> for ShadowMode {
    fn from(shadows: Shadows) -> Self {
        match shadows {
            Shadows::Off => ShadowMode::Off,
            Shadows::Hard => ShadowMode::Hard,
            Shadows::Soft => ShadowMode::Soft(DEFAULT_SOFT_SHADOW_WIDTH),
        }
    }
}

/// Renders the demo scene (or a mesh loaded from an OBJ file) to an image.
#[derive(Parser)]
#[command(name = "shinytrace")]
struct Args {
    /// Image width in pixels
    #[arg(long, default_value = "640")]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "480")]
    height: u32,

    /// Output image, format is taken from the extension
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    /// Number of render threads, one per CPU if not given
    #[arg(short, long)]
    workers: Option<NonZeroUsize>,

    /// Maximum number of reflection bounces
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_RECURSION_DEPTH as i64))]
    depth: Option<u32>,

    /// Trace a single ray per pixel
    #[arg(long)]
    no_fsaa: bool,

    /// Override shadow mode of all lights
    #[arg(long)]
    shadows: Option<Shadows>,

    /// Multiplier of all output pixels
    #[arg(long, default_value = "1.0")]
    brightness: f64,

    /// Render every worker's rows coarse to fine
    #[arg(long)]
    progressive: bool,

    /// Render this mesh under the demo lights instead of the demo scene
    #[arg(long)]
    obj: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: LogLevel,
}

fn mesh_scene(path: &Path) -> anyhow::Result<SceneGraph> {
    let mesh = Mesh::from_obj(path).with_context(|| format!("Loading {}", path.display()))?;

    let mut scene = SceneGraph::new();
    let clump = scene.add_clump();
    let geometry = scene.add_geometry(Geometry::mesh(mesh));
    scene.add_geometry_to_clump(clump, geometry);
    for light in demo_lights() {
        scene.add_light(light);
    }
    Ok(scene)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    let mut scene = match &args.obj {
        Some(path) => mesh_scene(path)?,
        None => demo_scene()?,
    };
    if let Some(shadows) = args.shadows {
        for light in scene.lights_mut() {
            light.set_shadow_mode(shadows.into());
        }
    }

    let resolution = ScreenSize::new(args.width, args.height);
    let mut camera = demo_camera();
    camera.frustum_mut().fit_aspect(resolution);
    if let Some(depth) = args.depth {
        camera.set_recursion_depth(depth);
    }
    if args.no_fsaa {
        camera.set_fsaa(false);
    }

    let settings = RenderSettings {
        worker_count: args.workers.map_or(WorkerCount::Auto, WorkerCount::Manual),
        brightness: args.brightness,
        progressive: args.progressive,
        ..Default::default()
    };

    let bar = ProgressBar::new(args.height as u64);
    bar.set_style(ProgressStyle::with_template(
        "{elapsed_precise} [{wide_bar}] {pos}/{len} rows",
    )?);

    let mut session = RenderSession::new(scene, camera, settings);
    session.start_with_callback(resolution, {
        let bar = bar.clone();
        move |_, progress| bar.set_position(progress.finished as u64)
    })?;
    session.wait();
    bar.finish();

    session
        .buffer()
        .to_image()
        .save(&args.output)
        .with_context(|| format!("Saving {}", args.output.display()))?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}
