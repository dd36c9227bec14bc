/// Radians added to both rotation angles every frame.
pub const DEFAULT_ROTATION_STEP: f32 = 0.01;

/// Opaque black.
pub const DEFAULT_CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Tunables for a [`CubeRenderer`](crate::CubeRenderer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    /// Per-frame increment applied to both angles.
    pub rotation_step: f32,
    /// Color the frame buffer is cleared to before drawing.
    pub clear_color: [f32; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            rotation_step: DEFAULT_ROTATION_STEP,
            clear_color: DEFAULT_CLEAR_COLOR,
        }
    }
}
