use crate::context::ShaderStage;

/// Errors from renderer setup and loop control.
///
/// Every variant is fatal for the renderer that produced it: setup halts and
/// no program, buffer or draw call is produced past the failing step.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("program failed to link:\n{log}")]
    Link { log: String },
    #[error("attribute not found in linked program: {0}")]
    MissingAttribute(String),
    #[error("uniform not found in linked program: {0}")]
    MissingUniform(String),
    #[error("frame loop driven before start")]
    NotStarted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_carries_stage_and_log() {
        let err = RenderError::Compile {
            stage: ShaderStage::Fragment,
            log: "expected `}`".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("fragment"));
        assert!(msg.contains("expected `}`"));
    }

    #[test]
    fn link_error_display() {
        let err = RenderError::Link {
            log: "location 0 not written".into(),
        };
        assert!(err.to_string().starts_with("program failed to link"));
    }
}
