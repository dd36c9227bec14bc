//! Cube renderer core: shader program management, static cube geometry, the
//! per-frame transform and the host-driven frame loop.
//!
//! All GPU work goes through the [`GraphicsContext`] trait. The wgpu backend
//! lives in `spincube-render-wgpu`; [`RecordingContext`] is a headless
//! backend for tests and tooling.
//!
//! # Invariants
//! - Program and buffers are created once during setup and never modified.
//! - Rotation is the only state mutated per frame.
//! - Each frame requests exactly one successor and never recurses.

mod config;
mod context;
mod error;
mod frame;
mod geometry;
mod program;
mod recording;
mod scheduler;
mod shader;
pub mod shaders;
mod transform;

pub use config::{DEFAULT_CLEAR_COLOR, DEFAULT_ROTATION_STEP, RenderConfig};
pub use context::{
    AttributeBinding, COLOR_ATTRIBUTE, CUBE_PROGRAM_LAYOUT, GraphicsContext, MODEL_MATRIX_UNIFORM,
    POSITION_ATTRIBUTE, ProgramLayout, ShaderStage, SurfaceSize, UniformBinding,
};
pub use error::RenderError;
pub use frame::{CubeRenderer, LoopState, ShaderSources};
pub use geometry::{
    COLOR_COMPONENTS, CUBE_POSITIONS, CubeGeometry, FACE_COLORS, FACE_COUNT, Face,
    POSITION_COMPONENTS, VERTEX_COUNT, VERTICES_PER_FACE, cube_colors,
};
pub use program::{LinkedProgram, build_program, link_program};
pub use recording::{Command, RecordingBuffer, RecordingContext, RecordingProgram, RecordingShader};
pub use scheduler::{CountingScheduler, FrameScheduler};
pub use shader::compile_shader;
pub use transform::RotationState;

pub fn crate_info() -> &'static str {
    "spincube-render v0.1.0"
}
