use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

use crate::transform::TransformState;

pub const LIGHT_COLOR: Vec3 = Vec3::ONE;
pub const LIGHT_POSITION: Vec3 = Vec3::new(6.0, 0.0, 2.0);
pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, 5.0);
pub const FOV_Y_DEGREES: f32 = 45.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.3,
    b: 0.3,
    a: 1.0,
};

/// Uniform block shared by the hourglass and grid programs.
///
/// Layout matches `SceneUniforms` in the WGSL sources: the normal matrix is
/// stored as three padded columns.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    pub light_color: [f32; 4],
    pub light_position: [f32; 4],
    pub camera_position: [f32; 4],
}

/// Scene is pushed five units away from the viewer.
pub fn view_matrix() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0))
}

pub fn projection_matrix(aspect: f32) -> Mat4 {
    Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect, Z_NEAR, Z_FAR)
}

pub fn frame_uniforms(transform: &TransformState, aspect: f32) -> SceneUniforms {
    SceneUniforms {
        model: transform.model_matrix().to_cols_array_2d(),
        view: view_matrix().to_cols_array_2d(),
        projection: projection_matrix(aspect).to_cols_array_2d(),
        normal: mat3_to_3x4(transform.normal_matrix()),
        light_color: LIGHT_COLOR.extend(1.0).into(),
        light_position: LIGHT_POSITION.extend(1.0).into(),
        camera_position: CAMERA_POSITION.extend(1.0).into(),
    }
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aspect_of(projection: &[[f32; 4]; 4]) -> f32 {
        projection[1][1] / projection[0][0]
    }

    #[test]
    fn uniform_block_is_sixteen_byte_aligned() {
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 288);
        assert_eq!(std::mem::size_of::<SceneUniforms>() % 16, 0);
    }

    #[test]
    fn projection_tracks_aspect() {
        let transform = TransformState::new();
        let before = frame_uniforms(&transform, 800.0 / 600.0);
        assert!((aspect_of(&before.projection) - 800.0 / 600.0).abs() < 1e-5);
        let after = frame_uniforms(&transform, 1024.0 / 768.0);
        assert!((aspect_of(&after.projection) - 1024.0 / 768.0).abs() < 1e-5);
    }

    #[test]
    fn projection_uses_forty_five_degree_fov() {
        let projection = projection_matrix(1.0);
        let focal = 1.0 / (FOV_Y_DEGREES.to_radians() / 2.0).tan();
        assert!((projection.y_axis.y - focal).abs() < 1e-5);
    }

    #[test]
    fn view_moves_origin_to_minus_five() {
        let origin = view_matrix().transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn light_constants_are_uploaded() {
        let uniforms = frame_uniforms(&TransformState::new(), 1.0);
        assert_eq!(uniforms.light_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(uniforms.light_position, [6.0, 0.0, 2.0, 1.0]);
        assert_eq!(uniforms.camera_position, [0.0, 0.0, 5.0, 1.0]);
        assert_eq!(uniforms.normal[0], [1.0, 0.0, 0.0, 0.0]);
    }
}
