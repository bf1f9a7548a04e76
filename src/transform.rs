use glam::{Mat3, Mat4, Vec3};

/// Distance moved per translate key press.
pub const TRANSLATE_STEP: f32 = 0.2;
/// Scale change per `+`/`-` press.
pub const SCALE_STEP: f32 = 0.2;
/// Degrees rotated per idle tick while a rotation key is held.
pub const HOLD_ANGLE_STEP: f32 = 0.5;
/// Degrees rotated per press in the single-step variant.
pub const PRESS_ANGLE_STEP: f32 = 5.0;

/// Axis an angle in [`TransformState`] rotates about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Transform parameters mutated by the keyboard and read once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
    /// Rotation angles in degrees.
    pub angle_x: f32,
    pub angle_y: f32,
    pub angle_z: f32,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
            angle_x: 0.0,
            angle_y: 0.0,
            angle_z: 0.0,
        }
    }
}

impl TransformState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.translate_x += dx;
        self.translate_y += dy;
    }

    pub fn grow(&mut self, amount: f32) {
        self.scale += amount;
    }

    pub fn angle(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.angle_x,
            Axis::Y => self.angle_y,
            Axis::Z => self.angle_z,
        }
    }

    fn angle_mut(&mut self, axis: Axis) -> &mut f32 {
        match axis {
            Axis::X => &mut self.angle_x,
            Axis::Y => &mut self.angle_y,
            Axis::Z => &mut self.angle_z,
        }
    }

    /// Decreases the angle about `axis` by `step` degrees.
    pub fn rotate_negative(&mut self, axis: Axis, step: f32) {
        let angle = self.angle_mut(axis);
        *angle = step_down(*angle, step);
    }

    /// Increases the angle about `axis` by `step` degrees.
    pub fn rotate_positive(&mut self, axis: Axis, step: f32) {
        let angle = self.angle_mut(axis);
        *angle = step_up(*angle, step);
    }

    /// Model matrix `T * Rx * Ry * Rz * S`, each rotation built from its own
    /// accumulated angle.
    pub fn model_matrix(&self) -> Mat4 {
        let translation =
            Mat4::from_translation(Vec3::new(self.translate_x, self.translate_y, 0.0));
        let rotation = Mat4::from_rotation_x(self.angle_x.to_radians())
            * Mat4::from_rotation_y(self.angle_y.to_radians())
            * Mat4::from_rotation_z(self.angle_z.to_radians());
        let scale = Mat4::from_scale(Vec3::splat(self.scale));
        translation * rotation * scale
    }

    /// Inverse-transpose of the model's upper 3x3, used to carry normals into
    /// world space. A zero scale has no inverse, so the identity is used.
    pub fn normal_matrix(&self) -> Mat3 {
        let linear = Mat3::from_mat4(self.model_matrix());
        if linear.determinant().abs() <= f32::EPSILON {
            Mat3::IDENTITY
        } else {
            linear.inverse().transpose()
        }
    }
}

/// Decreasing step. Once the result would reach 360 the step flips sign.
pub fn step_down(angle: f32, step: f32) -> f32 {
    if angle - step < 360.0 {
        angle - step
    } else {
        angle + step
    }
}

/// Increasing step. Crossing 360 reflects the angle to `360 - angle + step`
/// rather than wrapping modulo 360.
pub fn step_up(angle: f32, step: f32) -> f32 {
    if angle + step < 360.0 {
        angle + step
    } else {
        360.0 - angle + step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn step_up_below_boundary_adds() {
        assert_eq!(step_up(10.0, 0.5), 10.5);
        assert_eq!(step_up(359.0, 0.5), 359.5);
    }

    #[test]
    fn step_up_at_boundary_reflects() {
        // 359.5 + 0.5 == 360 is not below the boundary.
        assert!(close(step_up(359.5, 0.5), 1.0));
        assert!(close(step_up(359.8, 0.5), 0.7));
    }

    #[test]
    fn step_down_goes_negative_without_wrapping() {
        assert_eq!(step_down(0.0, 0.5), -0.5);
        assert_eq!(step_down(-720.0, 0.5), -720.5);
    }

    #[test]
    fn step_down_above_boundary_flips_direction() {
        assert_eq!(step_down(400.0, 0.5), 400.5);
    }

    #[test]
    fn rotations_touch_only_their_axis() {
        let mut state = TransformState::new();
        state.rotate_positive(Axis::Y, 2.0);
        state.rotate_negative(Axis::Z, 1.0);
        assert_eq!(state.angle(Axis::X), 0.0);
        assert_eq!(state.angle(Axis::Y), 2.0);
        assert_eq!(state.angle(Axis::Z), -1.0);
    }

    #[test]
    fn default_model_is_identity() {
        let state = TransformState::new();
        assert!(state.model_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
        assert!(state.normal_matrix().abs_diff_eq(Mat3::IDENTITY, 1e-6));
    }

    #[test]
    fn model_applies_scale_then_rotation_then_translation() {
        let mut state = TransformState::new();
        state.scale = 2.0;
        state.angle_z = 90.0;
        state.translate(1.0, 0.0);
        let point = state.model_matrix().transform_point3(Vec3::X);
        assert!(point.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn zero_scale_falls_back_to_identity_normals() {
        let mut state = TransformState::new();
        state.scale = 0.0;
        assert_eq!(state.normal_matrix(), Mat3::IDENTITY);
    }
}
