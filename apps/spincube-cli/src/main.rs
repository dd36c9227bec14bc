use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use spincube_render::{
    CountingScheduler, CubeRenderer, DEFAULT_ROTATION_STEP, FACE_COUNT, RecordingContext,
    RenderConfig, ShaderSources, SurfaceSize, VERTEX_COUNT,
};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spincube-cli", about = "Headless tooling for the cube renderer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and geometry info
    Info,
    /// Drive the frame loop against a recording context and report
    Simulate {
        /// Number of frames to render
        #[arg(short, long, default_value = "100")]
        frames: u64,
        /// Radians added to both angles per frame
        #[arg(long, default_value_t = DEFAULT_ROTATION_STEP)]
        step: f32,
        /// Initial surface size, WIDTHxHEIGHT
        #[arg(long, default_value = "800x600")]
        size: Size,
        /// Change the surface size before a frame, FRAME:WIDTHxHEIGHT (repeatable)
        #[arg(long = "resize-at")]
        resize_at: Vec<ResizeAt>,
    },
    /// Compile and link the built-in shaders on a headless GPU adapter
    CheckShaders,
}

#[derive(Debug, Clone, Copy)]
struct Size(SurfaceSize);

impl FromStr for Size {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let (w, h) = s
            .split_once('x')
            .with_context(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
        let width = w.trim().parse().context("invalid width")?;
        let height = h.trim().parse().context("invalid height")?;
        Ok(Size(SurfaceSize::new(width, height)))
    }
}

#[derive(Debug, Clone, Copy)]
struct ResizeAt {
    frame: u64,
    size: SurfaceSize,
}

impl FromStr for ResizeAt {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let (frame, size) = s
            .split_once(':')
            .with_context(|| format!("expected FRAME:WIDTHxHEIGHT, got `{s}`"))?;
        let frame = frame.trim().parse().context("invalid frame index")?;
        let Size(size) = size.parse()?;
        Ok(ResizeAt { frame, size })
    }
}

/// Run `frames` frames, answering each scheduled request synchronously.
fn simulate(
    frames: u64,
    step: f32,
    initial: SurfaceSize,
    resizes: &[ResizeAt],
) -> anyhow::Result<()> {
    let config = RenderConfig {
        rotation_step: step,
        ..RenderConfig::default()
    };
    let mut renderer =
        CubeRenderer::new(RecordingContext::new(), ShaderSources::default(), config)?;
    let mut scheduler = CountingScheduler::new();
    tracing::info!(frames, step, "simulation started");

    let mut size = initial;
    let host_size = |frame: u64, current: SurfaceSize| {
        resizes
            .iter()
            .rev()
            .find(|r| r.frame == frame)
            .map_or(current, |r| r.size)
    };

    if frames > 0 {
        size = host_size(0, size);
        renderer.start(size, &mut scheduler);
    }
    while renderer.frames_rendered() < frames && scheduler.take() {
        size = host_size(renderer.frames_rendered(), size);
        renderer.on_frame(size, &mut scheduler)?;
    }

    let rotation = renderer.rotation();
    tracing::info!(frames = renderer.frames_rendered(), "simulation finished");
    println!(
        "Simulated {} frames (step={})",
        renderer.frames_rendered(),
        rotation.step()
    );
    println!(
        "angle_x={:.6} angle_y={:.6}",
        rotation.angle_x(),
        rotation.angle_y()
    );
    print!("{}", renderer.context().summary());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("spincube-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", spincube_render::crate_info());
            println!("cube: {FACE_COUNT} faces, {VERTEX_COUNT} vertices");
            println!("default step: {DEFAULT_ROTATION_STEP} rad/frame");
        }
        Commands::Simulate {
            frames,
            step,
            size,
            resize_at,
        } => {
            simulate(frames, step, size.0, &resize_at)?;
        }
        Commands::CheckShaders => {
            if let Err(e) = spincube_render_wgpu::validate_shaders(ShaderSources::default()) {
                bail!("shader check failed: {e}");
            }
            tracing::info!("built-in shaders compiled and linked");
            println!("shaders: OK");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_size() {
        let Size(s) = "640x480".parse().unwrap();
        assert_eq!(s, SurfaceSize::new(640, 480));
        assert!("640".parse::<Size>().is_err());
        assert!("ax480".parse::<Size>().is_err());
    }

    #[test]
    fn parse_resize_at() {
        let r: ResizeAt = "10:1024x768".parse().unwrap();
        assert_eq!(r.frame, 10);
        assert_eq!(r.size, SurfaceSize::new(1024, 768));
        assert!("1024x768".parse::<ResizeAt>().is_err());
    }

    #[test]
    fn simulate_runs() {
        let resizes = [ResizeAt {
            frame: 5,
            size: SurfaceSize::new(320, 240),
        }];
        simulate(10, 0.01, SurfaceSize::new(800, 600), &resizes).unwrap();
    }

    #[test]
    fn cli_parses_simulate() {
        let cli = Cli::try_parse_from([
            "spincube-cli",
            "simulate",
            "--frames",
            "3",
            "--resize-at",
            "1:10x10",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate {
                frames, resize_at, ..
            } => {
                assert_eq!(frames, 3);
                assert_eq!(resize_at.len(), 1);
            }
            _ => panic!("expected simulate"),
        }
    }
}
