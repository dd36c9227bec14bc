use crate::config::RenderConfig;
use crate::context::{CUBE_PROGRAM_LAYOUT, GraphicsContext, SurfaceSize};
use crate::error::RenderError;
use crate::geometry::{CubeGeometry, Face, VERTICES_PER_FACE};
use crate::program::{LinkedProgram, build_program};
use crate::scheduler::FrameScheduler;
use crate::transform::RotationState;

/// Where the frame loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Set up, no frame drawn yet.
    Idle,
    /// Inside a frame.
    Rendering,
    /// Frame finished, next one requested from the host.
    AwaitingFrame,
}

/// Shader sources for the cube program.
#[derive(Debug, Clone, Copy)]
pub struct ShaderSources<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

impl Default for ShaderSources<'static> {
    fn default() -> Self {
        Self {
            vertex: crate::shaders::CUBE_VERTEX_SHADER,
            fragment: crate::shaders::CUBE_FRAGMENT_SHADER,
        }
    }
}

/// Renders the rotating cube, one frame per host callback.
///
/// Owns the graphics context and every resource created on it. Setup
/// happens in [`new`](Self::new); afterwards the only per-frame state that
/// changes is the rotation and the cached surface size.
pub struct CubeRenderer<C: GraphicsContext> {
    ctx: C,
    program: LinkedProgram<C>,
    geometry: CubeGeometry<C>,
    rotation: RotationState,
    surface_size: Option<SurfaceSize>,
    clear_color: [f32; 4],
    state: LoopState,
    frames_rendered: u64,
}

impl<C: GraphicsContext> CubeRenderer<C> {
    /// Compile and link the program, upload the cube and enable depth
    /// testing. Any failure halts setup and drops the context.
    pub fn new(
        mut ctx: C,
        sources: ShaderSources<'_>,
        config: RenderConfig,
    ) -> Result<Self, RenderError> {
        ctx.enable_depth_test();
        let program = build_program(
            &mut ctx,
            sources.vertex,
            sources.fragment,
            &CUBE_PROGRAM_LAYOUT,
        )?;
        let geometry = CubeGeometry::upload(&mut ctx, &program);

        tracing::info!(step = config.rotation_step, "cube renderer ready");

        Ok(Self {
            ctx,
            program,
            geometry,
            rotation: RotationState::new(config.rotation_step),
            surface_size: None,
            clear_color: config.clear_color,
            state: LoopState::Idle,
            frames_rendered: 0,
        })
    }

    pub fn context(&self) -> &C {
        &self.ctx
    }

    pub fn geometry(&self) -> &CubeGeometry<C> {
        &self.geometry
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Leave `Idle`: draw the first frame and request the next one.
    /// Later calls are ignored.
    pub fn start(&mut self, size: SurfaceSize, scheduler: &mut impl FrameScheduler) {
        if self.state != LoopState::Idle {
            tracing::warn!("frame loop already started");
            return;
        }
        tracing::info!("frame loop started");
        self.run_frame(size, scheduler);
    }

    /// Host callback for a previously requested frame.
    pub fn on_frame(
        &mut self,
        size: SurfaceSize,
        scheduler: &mut impl FrameScheduler,
    ) -> Result<(), RenderError> {
        match self.state {
            LoopState::Idle => Err(RenderError::NotStarted),
            _ => {
                self.run_frame(size, scheduler);
                Ok(())
            }
        }
    }

    fn run_frame(&mut self, size: SurfaceSize, scheduler: &mut impl FrameScheduler) {
        self.state = LoopState::Rendering;
        self.render_frame(size);
        self.state = LoopState::AwaitingFrame;
        scheduler.request_frame();
    }

    /// Draw one frame at the current rotation, then advance it.
    fn render_frame(&mut self, size: SurfaceSize) {
        self.resize(size);

        self.ctx.clear(self.clear_color);

        let model = self.rotation.model_matrix();
        self.ctx
            .set_uniform_matrix(self.program.model_matrix_location(), &model);

        for face in Face::ALL {
            self.ctx
                .draw_triangle_fan(face.first_vertex(), VERTICES_PER_FACE as u32);
        }

        tracing::trace!(
            frame = self.frames_rendered,
            angle_x = self.rotation.angle_x(),
            angle_y = self.rotation.angle_y(),
            "frame drawn"
        );

        self.rotation.advance();
        self.frames_rendered += 1;
        self.ctx.present();
    }

    /// Match the viewport to `size`. Returns whether anything changed.
    pub fn resize(&mut self, size: SurfaceSize) -> bool {
        if self.surface_size == Some(size) {
            return false;
        }
        tracing::debug!(width = size.width, height = size.height, "viewport resized");
        self.ctx.set_viewport(size.width, size.height);
        self.surface_size = Some(size);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Command, RecordingContext};
    use crate::scheduler::CountingScheduler;
    use glam::Mat4;

    const SIZE: SurfaceSize = SurfaceSize::new(800, 600);

    fn renderer() -> CubeRenderer<RecordingContext> {
        CubeRenderer::new(
            RecordingContext::new(),
            ShaderSources::default(),
            RenderConfig::default(),
        )
        .unwrap()
    }

    /// Start, then answer every scheduled request until `frames` are drawn.
    fn run(renderer: &mut CubeRenderer<RecordingContext>, frames: u64) -> CountingScheduler {
        let mut scheduler = CountingScheduler::new();
        renderer.start(SIZE, &mut scheduler);
        while renderer.frames_rendered() < frames && scheduler.take() {
            renderer.on_frame(SIZE, &mut scheduler).unwrap();
        }
        scheduler
    }

    #[test]
    fn setup_order() {
        let r = renderer();
        let cmds = r.context().commands();
        assert_eq!(cmds[0], Command::EnableDepthTest);
        assert_eq!(r.state(), LoopState::Idle);
        assert_eq!(r.context().draw_calls(), 0);
        assert_eq!(
            cmds.iter()
                .filter(|c| matches!(c, Command::CreateBuffer { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn hundred_frames() {
        let mut r = renderer();
        let scheduler = run(&mut r, 100);

        assert_eq!(r.frames_rendered(), 100);
        assert!((r.rotation().angle_x() - 1.0).abs() < 1e-4);
        assert!((r.rotation().angle_y() - 1.0).abs() < 1e-4);
        assert_eq!(r.context().draw_calls(), 600);
        assert_eq!(r.context().frames_presented(), 100);
        assert_eq!(r.state(), LoopState::AwaitingFrame);
        // Every frame requests exactly one successor.
        assert_eq!(scheduler.total_requests(), 100);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn first_frame_uploads_identity() {
        let mut r = renderer();
        run(&mut r, 1);
        let m = r.context().last_uniform_matrix().unwrap();
        assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn frame_command_sequence() {
        let mut r = renderer();
        let setup_len = r.context().commands().len();
        run(&mut r, 1);
        let frame = &r.context().commands()[setup_len..];

        assert_eq!(
            frame[0],
            Command::SetViewport {
                width: 800,
                height: 600
            }
        );
        assert_eq!(
            frame[1],
            Command::Clear {
                color: [0.0, 0.0, 0.0, 1.0]
            }
        );
        assert!(matches!(frame[2], Command::SetUniformMatrix { location: 0, .. }));
        let draws: Vec<_> = frame[3..9]
            .iter()
            .map(|c| match c {
                Command::DrawTriangleFan { first, count } => (*first, *count),
                other => panic!("expected draw, got {other:?}"),
            })
            .collect();
        assert_eq!(draws, vec![(0, 4), (4, 4), (8, 4), (12, 4), (16, 4), (20, 4)]);
        assert_eq!(frame[9], Command::Present);
        assert_eq!(frame.len(), 10);
    }

    #[test]
    fn geometry_buffers_hold_the_cube() {
        let r = renderer();
        let ctx = r.context();
        let positions = ctx.buffer_data(r.geometry().positions());
        assert_eq!(positions, bytemuck::cast_slice::<_, f32>(&crate::geometry::CUBE_POSITIONS));
        assert_eq!(ctx.buffer_data(r.geometry().colors()).len(), 24 * 4);
    }

    #[test]
    fn rotation_tracks_frames_rendered() {
        let mut r = renderer();
        run(&mut r, 7);
        assert_eq!(r.rotation().frames(), r.frames_rendered());
    }

    #[test]
    fn resize_is_idempotent() {
        let mut r = renderer();
        assert!(r.resize(SIZE));
        assert!(!r.resize(SIZE));
        assert!(!r.resize(SIZE));
        assert_eq!(r.context().viewport_changes(), 1);

        assert!(r.resize(SurfaceSize::new(1024, 600)));
        assert_eq!(r.context().viewport_changes(), 2);
    }

    #[test]
    fn steady_size_sets_viewport_once() {
        let mut r = renderer();
        run(&mut r, 10);
        assert_eq!(r.context().viewport_changes(), 1);
    }

    #[test]
    fn on_frame_before_start_is_rejected() {
        let mut r = renderer();
        let mut scheduler = CountingScheduler::new();
        let result = r.on_frame(SIZE, &mut scheduler);
        assert!(matches!(result, Err(RenderError::NotStarted)));
        assert_eq!(r.frames_rendered(), 0);
        assert_eq!(scheduler.total_requests(), 0);
    }

    #[test]
    fn start_twice_draws_once() {
        let mut r = renderer();
        let mut scheduler = CountingScheduler::new();
        r.start(SIZE, &mut scheduler);
        r.start(SIZE, &mut scheduler);
        assert_eq!(r.frames_rendered(), 1);
        assert_eq!(scheduler.total_requests(), 1);
    }

    #[test]
    fn compile_failure_never_draws() {
        let mut ctx = RecordingContext::new();
        let broken = crate::shaders::CUBE_VERTEX_SHADER.replacen('{', "", 1);
        let sources = ShaderSources {
            vertex: &broken,
            ..ShaderSources::default()
        };
        let result = CubeRenderer::new(&mut ctx, sources, RenderConfig::default());
        assert!(matches!(result, Err(RenderError::Compile { .. })));
        assert_eq!(ctx.draw_calls(), 0);
        assert!(
            !ctx.commands()
                .iter()
                .any(|c| matches!(c, Command::LinkProgram { .. } | Command::CreateBuffer { .. }))
        );
    }

    #[test]
    fn custom_step_and_clear_color() {
        let config = RenderConfig {
            rotation_step: 0.5,
            clear_color: [0.1, 0.2, 0.3, 1.0],
        };
        let mut r = CubeRenderer::new(RecordingContext::new(), ShaderSources::default(), config)
            .unwrap();
        run(&mut r, 4);
        assert!((r.rotation().angle_x() - 2.0).abs() < 1e-6);
        assert!(
            r.context()
                .commands()
                .contains(&Command::Clear {
                    color: [0.1, 0.2, 0.3, 1.0]
                })
        );
    }
}
