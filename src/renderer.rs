use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::math::*;
use crate::scene::{Hittable, Scene};
use crossterm::style::{self, Stylize};
use rand::RngCore;
use std::io::{self, Write};
use std::time::Instant;

/// Lower bound for the first segment leaving the camera.
pub const PRIMARY_T_MIN: f64 = 0.0;

/// Lower bound for every bounced segment; keeps a ray from re-hitting the
/// surface it just left because of floating-point error ("shadow acne").
pub const BOUNCE_T_MIN: f64 = 0.001;

// ─── Render Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub samples_per_pixel: u32,
    /// Maximum number of segments per path, including the primary ray.
    pub max_depth: u32,
    /// Fixed RNG seed; `None` picks a fresh one per run.
    pub seed: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 32,
            max_depth: 10,
            seed: None,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> RenderResult<()> {
        if self.samples_per_pixel == 0 {
            return Err(RenderError::InvalidSampling);
        }
        Ok(())
    }
}

// ─── Radiance ───────────────────────────────────────────────────────────────

/// Vertical white-to-sky-blue gradient seen by rays that escape the scene.
pub fn background(ray: &Ray) -> Color {
    let unit_dir = ray.direction.normalized();
    let t = 0.5 * (unit_dir.y + 1.0);
    Color::ones().lerp(Color::new(0.5, 0.7, 1.0), t)
}

/// Radiance carried back along `ray`.
///
/// Recurses once per bounce, so stack depth never exceeds `depth` frames.
/// An absorbed ray contributes black.
pub fn trace(
    ray: &Ray,
    depth: u32,
    t_min: f64,
    t_max: f64,
    scene: &Scene,
    rng: &mut dyn RngCore,
) -> Color {
    if depth == 0 {
        return Color::zero();
    }

    let Some(hit) = scene.hit(ray, t_min, t_max) else {
        return background(ray);
    };

    match scene.material(hit.material).scatter(ray, &hit, rng) {
        Some(result) => {
            let incoming = trace(&result.scattered, depth - 1, BOUNCE_T_MIN, t_max, scene, rng);
            result.attenuation.hadamard(incoming)
        }
        None => Color::zero(),
    }
}

/// Gamma-2 transfer; non-positive (and NaN) input maps to zero.
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Gamma-corrects a linear color and quantizes it to 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let c = Color::new(
        linear_to_gamma(color.x),
        linear_to_gamma(color.y),
        linear_to_gamma(color.z),
    )
    .clamp01();
    [
        (255.0 * c.x) as u8,
        (255.0 * c.y) as u8,
        (255.0 * c.z) as u8,
    ]
}

// ─── Framebuffer ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpmFormat {
    /// Binary `P6`.
    Binary,
    /// ASCII `P3`, one pixel per line.
    Ascii,
}

/// Row-major 8-bit RGB pixels, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 3]>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 3]; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        self.pixels[y as usize * self.width as usize + x as usize] = rgb;
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// The packed `R G B R G B ...` byte stream.
    pub fn as_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }

    /// Writes the buffer as a PPM image with a `width height 255` header.
    pub fn write_ppm(&self, mut out: impl Write, format: PpmFormat) -> io::Result<()> {
        match format {
            PpmFormat::Binary => {
                write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
                out.write_all(&self.as_bytes())?;
            }
            PpmFormat::Ascii => {
                write!(out, "P3\n{} {}\n255\n", self.width, self.height)?;
                for [r, g, b] in &self.pixels {
                    writeln!(out, "{r} {g} {b}")?;
                }
            }
        }
        out.flush()
    }
}

// ─── Render Statistics ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RenderStats {
    pub primary_rays: u64,
    pub elapsed_secs: f64,
}

impl RenderStats {
    pub fn mrays_per_sec(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.primary_rays as f64 / self.elapsed_secs / 1e6
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        log::info!(
            "rendered {:.2}M primary rays in {:.2}s ({:.2} Mrays/s)",
            self.primary_rays as f64 / 1e6,
            self.elapsed_secs,
            self.mrays_per_sec()
        );
    }
}

// ─── Progress Reporter ──────────────────────────────────────────────────────

/// Scanline progress bar on stderr.
struct ProgressBar {
    total: u32,
    done: u32,
    last_pct: u32,
    start: Instant,
}

impl ProgressBar {
    fn new(total: u32) -> Self {
        Self {
            total,
            done: 0,
            last_pct: 0,
            start: Instant::now(),
        }
    }

    fn tick(&mut self) {
        self.done += 1;
        let pct = self.done * 100 / self.total;
        if pct != self.last_pct {
            let elapsed = self.start.elapsed().as_secs_f64();
            let remaining = elapsed / self.done as f64 * (self.total - self.done) as f64;
            let filled = pct as usize * 24 / 100;
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(24 - filled));
            eprint!("\r  Scanlines: │{bar}│ {pct:3}%  ETA {remaining:.0}s   ");
            self.last_pct = pct;
        }
    }

    fn finish(&self) {
        eprintln!("\r  Scanlines: │{}│ 100%  done        ", "█".repeat(24));
    }
}

// ─── Path Tracer ────────────────────────────────────────────────────────────

pub struct PathTracer<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub config: &'a RenderConfig,
}

impl<'a> PathTracer<'a> {
    /// Averages `samples_per_pixel` jittered paths through pixel `(x, y)`.
    /// The result is linear radiance, before gamma.
    pub fn render_pixel(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Color {
        let mut pixel_color = Color::zero();
        for _ in 0..self.config.samples_per_pixel {
            let ray = self.camera.get_ray(x, y, rng);
            pixel_color += trace(
                &ray,
                self.config.max_depth,
                PRIMARY_T_MIN,
                f64::INFINITY,
                self.scene,
                rng,
            );
        }
        pixel_color / self.config.samples_per_pixel as f64
    }

    /// Renders every pixel in row-major order, top row first, drawing from a
    /// single random stream so a fixed seed reproduces the image exactly.
    pub fn render(&self, rng: &mut dyn RngCore, show_progress: bool) -> (Framebuffer, RenderStats) {
        let (w, h) = (self.camera.image_width, self.camera.image_height);
        let mut fb = Framebuffer::new(w, h);
        let mut progress = show_progress.then(|| ProgressBar::new(h));
        let t0 = Instant::now();

        for y in 0..h {
            for x in 0..w {
                fb.set(x, y, color_to_rgb8(self.render_pixel(x, y, rng)));
            }
            if let Some(p) = progress.as_mut() {
                p.tick();
            }
        }
        if let Some(p) = progress.as_ref() {
            p.finish();
        }

        let stats = RenderStats {
            primary_rays: w as u64 * h as u64 * self.config.samples_per_pixel as u64,
            elapsed_secs: t0.elapsed().as_secs_f64(),
        };
        (fb, stats)
    }
}

// ─── Terminal Preview ───────────────────────────────────────────────────────

/// Prints the framebuffer with half-block characters (`▀`), two image rows
/// per terminal row, downsampled to at most `max_cols` columns.
pub fn display_preview(fb: &Framebuffer, max_cols: u32) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    write_halfblock(&mut out, fb, max_cols)?;
    out.flush()
}

fn write_halfblock(out: &mut impl Write, fb: &Framebuffer, max_cols: u32) -> io::Result<()> {
    let step = fb.width.div_ceil(max_cols.max(1)).max(1);
    let rgb = |[r, g, b]: [u8; 3]| style::Color::Rgb { r, g, b };
    let mut y = 0;
    while y < fb.height {
        let mut x = 0;
        while x < fb.width {
            let top = fb.get(x, y);
            let bottom = if y + step < fb.height {
                fb.get(x, y + step)
            } else {
                [0; 3]
            };
            write!(out, "{}", "▀".with(rgb(top)).on(rgb(bottom)))?;
            x += step;
        }
        writeln!(out)?;
        y += step * 2;
    }
    Ok(())
}
