use glam::Mat4;
use std::fmt;

/// Pipeline stage a shader source is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drawable size of the host surface in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A named per-vertex input of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeBinding {
    pub name: &'static str,
    pub location: u32,
    /// Number of tightly packed `f32` components per vertex.
    pub components: u32,
}

/// A named `mat4x4<f32>` uniform of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformBinding {
    pub name: &'static str,
    pub binding: u32,
}

/// Declared interface of a program: what the shader stages read.
///
/// Backends that bake vertex layout into the pipeline (wgpu) consume this at
/// link time; name lookups after linking resolve against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramLayout {
    pub attributes: &'static [AttributeBinding],
    pub uniforms: &'static [UniformBinding],
}

impl ProgramLayout {
    pub fn attribute(&self, name: &str) -> Option<&AttributeBinding> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformBinding> {
        self.uniforms.iter().find(|u| u.name == name)
    }
}

pub const POSITION_ATTRIBUTE: &str = "position";
pub const COLOR_ATTRIBUTE: &str = "color";
pub const MODEL_MATRIX_UNIFORM: &str = "model_matrix";

/// Interface of the cube program: position and color inputs, one model matrix.
pub const CUBE_PROGRAM_LAYOUT: ProgramLayout = ProgramLayout {
    attributes: &[
        AttributeBinding {
            name: POSITION_ATTRIBUTE,
            location: 0,
            components: 3,
        },
        AttributeBinding {
            name: COLOR_ATTRIBUTE,
            location: 1,
            components: 4,
        },
    ],
    uniforms: &[UniformBinding {
        name: MODEL_MATRIX_UNIFORM,
        binding: 0,
    }],
};

/// The host graphics boundary.
///
/// Everything the renderer does to the GPU goes through this trait. The call
/// vocabulary is immediate-mode: bound state persists until changed, draws
/// issued between [`clear`](Self::clear) and [`present`](Self::present) make
/// up one frame.
pub trait GraphicsContext {
    /// Compiled shader stage.
    type Shader;
    /// Linked program.
    type Program;
    /// Static vertex buffer.
    type Buffer;

    /// Compile one shader stage. `Err` carries the compiler's log.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String>;

    /// Link a vertex and fragment stage. `Err` carries the linker's log.
    fn link_program(
        &mut self,
        vertex: &Self::Shader,
        fragment: &Self::Shader,
        layout: &ProgramLayout,
    ) -> Result<Self::Program, String>;

    fn attribute_location(&self, program: &Self::Program, name: &str) -> Option<u32>;

    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<u32>;

    /// Make `program` the one subsequent draws use.
    fn use_program(&mut self, program: &Self::Program);

    /// Upload `data` once into a buffer that is never written again.
    fn create_static_buffer(&mut self, data: &[f32]) -> Self::Buffer;

    /// Feed attribute `location` from `buffer`, `components` floats per
    /// vertex with no padding, and enable it.
    fn bind_attribute(&mut self, location: u32, buffer: &Self::Buffer, components: u32);

    fn enable_depth_test(&mut self);

    fn set_viewport(&mut self, width: u32, height: u32);

    /// Clear color to `color` and depth to the far plane.
    fn clear(&mut self, color: [f32; 4]);

    fn set_uniform_matrix(&mut self, location: u32, matrix: &Mat4);

    /// Draw `count` vertices starting at `first` as a triangle fan.
    fn draw_triangle_fan(&mut self, first: u32, count: u32);

    /// Finish the frame and hand it to the display.
    fn present(&mut self);
}

impl<C: GraphicsContext + ?Sized> GraphicsContext for &mut C {
    type Shader = C::Shader;
    type Program = C::Program;
    type Buffer = C::Buffer;

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String> {
        (**self).compile_shader(stage, source)
    }

    fn link_program(
        &mut self,
        vertex: &Self::Shader,
        fragment: &Self::Shader,
        layout: &ProgramLayout,
    ) -> Result<Self::Program, String> {
        (**self).link_program(vertex, fragment, layout)
    }

    fn attribute_location(&self, program: &Self::Program, name: &str) -> Option<u32> {
        (**self).attribute_location(program, name)
    }

    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<u32> {
        (**self).uniform_location(program, name)
    }

    fn use_program(&mut self, program: &Self::Program) {
        (**self).use_program(program)
    }

    fn create_static_buffer(&mut self, data: &[f32]) -> Self::Buffer {
        (**self).create_static_buffer(data)
    }

    fn bind_attribute(&mut self, location: u32, buffer: &Self::Buffer, components: u32) {
        (**self).bind_attribute(location, buffer, components)
    }

    fn enable_depth_test(&mut self) {
        (**self).enable_depth_test()
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        (**self).set_viewport(width, height)
    }

    fn clear(&mut self, color: [f32; 4]) {
        (**self).clear(color)
    }

    fn set_uniform_matrix(&mut self, location: u32, matrix: &Mat4) {
        (**self).set_uniform_matrix(location, matrix)
    }

    fn draw_triangle_fan(&mut self, first: u32, count: u32) {
        (**self).draw_triangle_fan(first, count)
    }

    fn present(&mut self) {
        (**self).present()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_layout_lookup() {
        let pos = CUBE_PROGRAM_LAYOUT.attribute(POSITION_ATTRIBUTE).unwrap();
        assert_eq!((pos.location, pos.components), (0, 3));
        let color = CUBE_PROGRAM_LAYOUT.attribute(COLOR_ATTRIBUTE).unwrap();
        assert_eq!((color.location, color.components), (1, 4));
        assert_eq!(
            CUBE_PROGRAM_LAYOUT.uniform(MODEL_MATRIX_UNIFORM).unwrap().binding,
            0
        );
        assert!(CUBE_PROGRAM_LAYOUT.attribute("normal").is_none());
    }

    #[test]
    fn stage_names() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }
}
