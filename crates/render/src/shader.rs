use crate::context::{GraphicsContext, ShaderStage};
use crate::error::RenderError;

/// Compile one shader stage, logging the compiler output on failure.
pub fn compile_shader<C: GraphicsContext>(
    ctx: &mut C,
    stage: ShaderStage,
    source: &str,
) -> Result<C::Shader, RenderError> {
    match ctx.compile_shader(stage, source) {
        Ok(shader) => {
            tracing::debug!("{stage} shader compiled ({} bytes)", source.len());
            Ok(shader)
        }
        Err(log) => {
            tracing::error!("{stage} shader compile failed:\n{log}");
            Err(RenderError::Compile { stage, log })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Command, RecordingContext};
    use crate::shaders::{CUBE_FRAGMENT_SHADER, CUBE_VERTEX_SHADER};

    #[test]
    fn compiles_valid_vertex_source() {
        let mut ctx = RecordingContext::new();
        let shader = compile_shader(&mut ctx, ShaderStage::Vertex, CUBE_VERTEX_SHADER).unwrap();
        assert_eq!(shader.stage(), ShaderStage::Vertex);
        assert!(matches!(
            ctx.commands(),
            [Command::CompileShader {
                stage: ShaderStage::Vertex,
                ok: true
            }]
        ));
    }

    #[test]
    fn syntax_error_is_compile_error() {
        let mut ctx = RecordingContext::new();
        let broken = CUBE_FRAGMENT_SHADER.replacen('}', "", 1);
        let err = compile_shader(&mut ctx, ShaderStage::Fragment, &broken).unwrap_err();
        match err {
            RenderError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(!log.is_empty());
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_stage_entry_point_fails() {
        let mut ctx = RecordingContext::new();
        let result = compile_shader(&mut ctx, ShaderStage::Fragment, CUBE_VERTEX_SHADER);
        assert!(matches!(result, Err(RenderError::Compile { .. })));
    }
}
