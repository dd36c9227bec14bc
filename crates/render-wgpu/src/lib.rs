//! wgpu backend for the cube renderer.
//!
//! Implements [`spincube_render::GraphicsContext`] on a wgpu surface. WGSL
//! stages compile to shader modules and link into a render pipeline, both
//! under validation error scopes so failures come back as log text instead
//! of panics. wgpu has no fan topology, so fans are drawn from a shared
//! fan-ordered index buffer with a per-draw base vertex.
//!
//! # Invariants
//! - Vertex buffers are created with `VERTEX` usage only and never written.
//! - One render pass per presented frame.

mod gpu;
mod headless;
mod pipeline;

pub use gpu::{WgpuBuffer, WgpuContext, WgpuProgram};
pub use headless::{headless_device, validate_shaders};
pub use pipeline::{
    DEPTH_FORMAT, LinkedPipeline, MAX_FAN_VERTICES, PipelineTargets, WgpuShader, compile_module,
    fan_index_count, fan_indices, link_pipeline,
};
