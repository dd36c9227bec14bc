use anyhow::Result;
use clap::Parser;
use spincube_render::{
    CubeRenderer, DEFAULT_ROTATION_STEP, FrameScheduler, RenderConfig, ShaderSources, SurfaceSize,
};
use spincube_render_wgpu::WgpuContext;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "spincube-desktop", about = "Rotating colored cube")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initial window width in physical pixels
    #[arg(long, default_value = "800")]
    width: u32,

    /// Initial window height in physical pixels
    #[arg(long, default_value = "800")]
    height: u32,

    /// Radians added to both rotation angles per frame
    #[arg(long, default_value_t = DEFAULT_ROTATION_STEP)]
    step: f32,
}

/// Schedules the next frame as a winit redraw request.
struct RedrawScheduler<'a>(&'a Window);

impl FrameScheduler for RedrawScheduler<'_> {
    fn request_frame(&mut self) {
        self.0.request_redraw();
    }
}

fn surface_size(window: &Window) -> SurfaceSize {
    let size = window.inner_size();
    SurfaceSize::new(size.width, size.height)
}

struct CubeApp {
    config: RenderConfig,
    initial_size: PhysicalSize<u32>,
    window: Option<Arc<Window>>,
    renderer: Option<CubeRenderer<WgpuContext>>,
    /// Setup failure to report once the event loop returns.
    error: Option<anyhow::Error>,
}

impl CubeApp {
    fn new(config: RenderConfig, initial_size: PhysicalSize<u32>) -> Self {
        Self {
            config,
            initial_size,
            window: None,
            renderer: None,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("spincube")
            .with_inner_size(self.initial_size);
        let window = Arc::new(event_loop.create_window(attrs)?);

        let ctx = WgpuContext::new(window.clone(), surface_size(&window))?;
        let info = ctx.adapter_info();
        tracing::debug!(driver = %info.driver, device_type = ?info.device_type, "adapter selected");
        let mut renderer = CubeRenderer::new(ctx, ShaderSources::default(), self.config)?;
        renderer.start(surface_size(&window), &mut RedrawScheduler(&window));

        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }
}

impl ApplicationHandler for CubeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.error.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("startup failed: {e}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let (Some(window), Some(renderer)) = (&self.window, &mut self.renderer) else {
                    return;
                };
                let size = surface_size(window);
                if let Err(e) = renderer.on_frame(size, &mut RedrawScheduler(window)) {
                    tracing::error!("frame skipped: {e}");
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("spincube-desktop starting");

    let config = RenderConfig {
        rotation_step: cli.step,
        ..RenderConfig::default()
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = CubeApp::new(config, PhysicalSize::new(cli.width, cli.height));
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.error.take() {
        return Err(e.context("spincube could not start"));
    }
    if let Some(renderer) = &app.renderer {
        tracing::info!(frames = renderer.frames_rendered(), "spincube-desktop exiting");
    }

    Ok(())
}
