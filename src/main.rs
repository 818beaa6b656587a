//! # lumen
//!
//! An offline path tracer for scenes made of spheres. Every pixel is the
//! average of several jittered camera rays, each followed through the scene
//! until it escapes to the sky, is absorbed, or runs out of bounces.
//!
//! ## Pipeline
//!
//! - **Camera**: thin-lens model; look-from/look-at/up orientation, vertical
//!   field of view, and optional defocus blur
//! - **Scene**: a flat, ordered list of spheres sharing a material table
//! - **Materials**: Lambertian, Metal (with fuzz), Dielectric (Schlick-weighted
//!   reflect/refract)
//! - **Integrator**: recursive, bounded by a maximum depth, gamma-2 output
//! - **Output**: binary `P6` or ASCII `P3` PPM, plus an optional true-color
//!   terminal preview
//!
//! The image is fully determined by the scene, the camera, and the RNG seed,
//! which is logged on every run so any render can be reproduced.

mod camera;
mod error;
mod material;
mod math;
mod presets;
mod renderer;
mod scene;

use anyhow::Context;
use camera::Camera;
use clap::Parser;
use presets::ScenePreset;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use renderer::{display_preview, PathTracer, PpmFormat, RenderConfig};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

/// Terminal preview width in character cells.
const PREVIEW_COLUMNS: u32 = 100;

/// lumen: render sphere scenes to PPM images
#[derive(Parser, Debug)]
#[command(
    name = "lumen",
    version,
    about = "An offline sphere path tracer that writes PPM images",
    after_help = "EXAMPLES:\n  \
                  lumen --scene minimal > minimal.ppm\n  \
                  lumen --scene showcase --spp 100 --depth 50 -o showcase.ppm --preview\n  \
                  lumen --scene materials --seed 7 --format p3 -o materials.ppm"
)]
struct Cli {
    /// Scene preset to render
    #[arg(short, long, value_enum, default_value_t = ScenePreset::Materials)]
    scene: ScenePreset,

    /// Image width in pixels
    #[arg(short = 'W', long, default_value_t = 400)]
    width: u32,

    /// Image height in pixels
    #[arg(short = 'H', long, default_value_t = 225)]
    height: u32,

    /// Samples per pixel. More samples means less noise.
    #[arg(long, default_value_t = 32)]
    spp: u32,

    /// Maximum number of ray segments per path (0 renders black).
    #[arg(long, default_value_t = 10)]
    depth: u32,

    /// Seed for the random number generator; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// PPM encoding
    #[arg(short, long, value_enum, default_value_t = CliFormat::P6)]
    format: CliFormat,

    /// Write the image here instead of to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also print a true-color preview to the terminal (requires --output)
    #[arg(long)]
    preview: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliFormat {
    /// Binary PPM
    P6,
    /// ASCII PPM
    P3,
}

impl From<CliFormat> for PpmFormat {
    fn from(f: CliFormat) -> Self {
        match f {
            CliFormat::P6 => PpmFormat::Binary,
            CliFormat::P3 => PpmFormat::Ascii,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = RenderConfig {
        samples_per_pixel: cli.spp,
        max_depth: cli.depth,
        seed: cli.seed,
    };
    config.validate()?;

    let seed = config.seed.unwrap_or_else(rand::random);

    let mut rng = SmallRng::seed_from_u64(seed);
    let (scene, mut camera_config) = cli.scene.build(&mut rng)?;
    camera_config.image_width = cli.width;
    camera_config.image_height = cli.height;
    let camera = Camera::new(&camera_config)?;

    log::info!(
        "rendering {} ({} spheres, {} materials) at {}x{}, {} spp, depth {}, seed {}",
        cli.scene.name(),
        scene.spheres().len(),
        scene.materials().len(),
        cli.width,
        cli.height,
        config.samples_per_pixel,
        config.max_depth,
        seed
    );

    let tracer = PathTracer {
        scene: &scene,
        camera: &camera,
        config: &config,
    };
    let (framebuffer, stats) = tracer.render(&mut rng, !cli.quiet);
    stats.log_summary();

    let format = PpmFormat::from(cli.format);
    match cli.output {
        Some(ref path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            framebuffer
                .write_ppm(BufWriter::new(file), format)
                .with_context(|| format!("cannot write {}", path.display()))?;
            log::info!("saved {}", path.display());

            if cli.preview {
                display_preview(&framebuffer, PREVIEW_COLUMNS)?;
            }
        }
        None => {
            if cli.preview {
                log::warn!("--preview ignored while the image is written to stdout");
            }
            framebuffer
                .write_ppm(BufWriter::new(io::stdout().lock()), format)
                .context("cannot write image to stdout")?;
        }
    }

    Ok(())
}
