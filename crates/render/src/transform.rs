use glam::Mat4;

/// The cube's two rotation angles, advanced once per frame.
///
/// Both angles are `frames * step`, computed in `f64` from the frame count,
/// so they stay exact multiples of the step however long the loop runs.
/// Angles grow without bound; nothing wraps them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    frames: u64,
    step: f32,
}

impl RotationState {
    pub fn new(step: f32) -> Self {
        Self { frames: 0, step }
    }

    /// Number of times [`advance`](Self::advance) has run.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn angle_x(&self) -> f32 {
        self.angle() as f32
    }

    pub fn angle_y(&self) -> f32 {
        self.angle() as f32
    }

    fn angle(&self) -> f64 {
        self.frames as f64 * f64::from(self.step)
    }

    /// `I * Rx(angle_x) * Ry(angle_y)`: the Y rotation acts in the frame
    /// already rotated about X.
    pub fn model_matrix(&self) -> Mat4 {
        let angle = self.angle() as f32;
        Mat4::IDENTITY * Mat4::from_rotation_x(angle) * Mat4::from_rotation_y(angle)
    }

    pub fn advance(&mut self) {
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    #[test]
    fn frame_zero_is_identity() {
        let state = RotationState::new(0.01);
        assert!(state.model_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn angles_are_multiples_of_step() {
        let mut state = RotationState::new(0.01);
        for n in 1..=500u32 {
            state.advance();
            let expected = n as f32 * 0.01;
            assert!((state.angle_x() - expected).abs() < 1e-5, "frame {n}");
            assert_eq!(state.angle_x(), state.angle_y());
        }
    }

    #[test]
    fn no_drift_after_an_hour_at_60fps() {
        let mut state = RotationState::new(0.01);
        for n in 1..=216_000u64 {
            state.advance();
            if n % 36_000 == 0 {
                let exact = n as f64 * 0.01;
                let err = (f64::from(state.angle_x()) - exact).abs();
                assert!(err < 1e-3, "frame {n}: angle_x={} err={err}", state.angle_x());
            }
        }
        assert_eq!(state.frames(), 216_000);
        assert_eq!(state.step(), 0.01);
    }

    #[test]
    fn rotation_order_is_x_then_y() {
        let mut state = RotationState::new(std::f32::consts::FRAC_PI_2);
        state.advance();
        let m = state.model_matrix();

        // Ry first turns +X into -Z, then Rx turns -Z into +Y.
        let v = m * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!(v.truncate().abs_diff_eq(Vec3::Y, 1e-6), "{v}");

        let swapped =
            Mat4::from_rotation_y(state.angle_y()) * Mat4::from_rotation_x(state.angle_x());
        assert!(!swapped.abs_diff_eq(m, 1e-3));
    }

    #[test]
    fn matrix_stays_orthonormal() {
        let mut state = RotationState::new(0.37);
        for _ in 0..50 {
            state.advance();
        }
        let m = state.model_matrix();
        assert!((m * m.transpose()).abs_diff_eq(Mat4::IDENTITY, 1e-5));
        assert!((m.determinant() - 1.0).abs() < 1e-5);
    }
}
