//! softraster: software rendering of textured meshes
//!
//! Renders a textured unit cube through the camera stack and writes the last
//! frame to an image file:
//! - Look-at camera with cached projection/viewport transform
//! - Edge-function rasterization with a fixed shared-edge rule
//! - Z-buffered, affine texture mapping

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod config;
mod rasterizer;

use std::path::PathBuf;
use std::time::Instant;

use config::{load_config, save_frame, RenderConfig};
use indicatif::{ProgressBar, ProgressStyle};
use log::{LevelFilter, Log, Metadata, Record};
use rasterizer::{Color, Mesh, Texture};

/// Minimal stderr logger
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

struct Args {
    verbose: bool,
    config: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut args = Args { verbose: false, config: None };
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => args.verbose = true,
            _ => args.config = Some(PathBuf::from(arg)),
        }
    }
    args
}

fn run(config: &RenderConfig) -> Result<(), config::ConfigError> {
    let mut cam = config.build_camera()?;
    let mesh = Mesh::cube();
    let texture = Texture::checkerboard(64, 64, Color::WHITE, Color::new(180, 40, 40));

    let progress = if config.frames > 1 {
        let bar = ProgressBar::new(config.frames as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
            bar.set_style(style);
        }
        Some(bar)
    } else {
        None
    };

    let mut last_fps = 0.0;
    for frame in 0..config.frames {
        let start = Instant::now();

        cam.reset();
        if let Err(e) = cam.move_to(config.origin_at(frame), config.direction) {
            log::warn!("Frame {}: {}, keeping previous pose", frame, e);
        }
        let stats = cam.rasterize(&mesh, &texture);

        let secs = start.elapsed().as_secs_f64();
        last_fps = if secs > 0.0 { 1.0 / secs } else { f64::INFINITY };
        log::debug!(
            "Frame {}: {} triangles, {} culled, {} fragments",
            frame,
            stats.triangles,
            stats.culled,
            stats.fragments
        );

        if let Some(bar) = &progress {
            bar.set_message(format!("fps: {:.1}", last_fps));
            bar.inc(1);
        }
    }

    match progress {
        Some(bar) => bar.finish_with_message(format!("fps: {:.1}", last_fps)),
        None => println!("fps: {:.1}", last_fps),
    }

    save_frame(&cam, &config.output)?;
    println!("Wrote {}x{} frame to {}", cam.frame_width(), cam.frame_height(), config.output);
    Ok(())
}

fn main() {
    let args = parse_args();

    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }

    println!("=== softraster v{} ===", VERSION);

    let config = match &args.config {
        Some(path) => match load_config(path) {
            Ok(config) => {
                println!("Loaded config: {}", path.display());
                config
            }
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => RenderConfig::default(),
    };

    if let Err(e) = run(&config) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
