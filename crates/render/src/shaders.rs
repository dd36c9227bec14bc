/// WGSL vertex stage for the cube.
///
/// Positions go through the model matrix only; there is no view or
/// projection. The depth range is remapped from [-w, w] to [0, w] so the
/// whole unit cube stays inside the clip volume.
pub const CUBE_VERTEX_SHADER: &str = r#"
struct Uniforms {
    model_matrix: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let clip = uniforms.model_matrix * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = vec4<f32>(clip.xy, (clip.z + clip.w) * 0.5, clip.w);
    out.color = vertex.color;
    return out;
}
"#;

/// WGSL fragment stage: flat passthrough of the interpolated color.
pub const CUBE_FRAGMENT_SHADER: &str = r#"
struct FragmentInput {
    @location(0) color: vec4<f32>,
};

@fragment
fn fs_main(in: FragmentInput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

pub const VERTEX_ENTRY_POINT: &str = "vs_main";
pub const FRAGMENT_ENTRY_POINT: &str = "fs_main";
