use crate::context::{
    COLOR_ATTRIBUTE, GraphicsContext, MODEL_MATRIX_UNIFORM, POSITION_ATTRIBUTE, ProgramLayout,
    ShaderStage,
};
use crate::error::RenderError;
use crate::shader::compile_shader;

/// A linked, current program with its resolved bindings.
pub struct LinkedProgram<C: GraphicsContext> {
    program: C::Program,
    position_location: u32,
    color_location: u32,
    model_matrix_location: u32,
}

impl<C: GraphicsContext> LinkedProgram<C> {
    pub fn program(&self) -> &C::Program {
        &self.program
    }

    pub fn position_location(&self) -> u32 {
        self.position_location
    }

    pub fn color_location(&self) -> u32 {
        self.color_location
    }

    pub fn model_matrix_location(&self) -> u32 {
        self.model_matrix_location
    }
}

/// Link two compiled stages, make the result current and resolve the
/// `position`, `color` and `model_matrix` bindings.
pub fn link_program<C: GraphicsContext>(
    ctx: &mut C,
    vertex: &C::Shader,
    fragment: &C::Shader,
    layout: &ProgramLayout,
) -> Result<LinkedProgram<C>, RenderError> {
    let program = match ctx.link_program(vertex, fragment, layout) {
        Ok(program) => program,
        Err(log) => {
            tracing::error!("program link failed:\n{log}");
            return Err(RenderError::Link { log });
        }
    };

    ctx.use_program(&program);

    let attribute = |name: &str| {
        ctx.attribute_location(&program, name)
            .ok_or_else(|| RenderError::MissingAttribute(name.to_string()))
    };
    let position_location = attribute(POSITION_ATTRIBUTE)?;
    let color_location = attribute(COLOR_ATTRIBUTE)?;
    let model_matrix_location = ctx
        .uniform_location(&program, MODEL_MATRIX_UNIFORM)
        .ok_or_else(|| RenderError::MissingUniform(MODEL_MATRIX_UNIFORM.to_string()))?;

    tracing::debug!(
        position_location,
        color_location,
        model_matrix_location,
        "program linked"
    );

    Ok(LinkedProgram {
        program,
        position_location,
        color_location,
        model_matrix_location,
    })
}

/// Compile the vertex stage, then the fragment stage, then link.
/// Stops at the first failure.
pub fn build_program<C: GraphicsContext>(
    ctx: &mut C,
    vertex_source: &str,
    fragment_source: &str,
    layout: &ProgramLayout,
) -> Result<LinkedProgram<C>, RenderError> {
    let vertex = compile_shader(ctx, ShaderStage::Vertex, vertex_source)?;
    let fragment = compile_shader(ctx, ShaderStage::Fragment, fragment_source)?;
    link_program(ctx, &vertex, &fragment, layout)
}
