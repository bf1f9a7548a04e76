pub mod common;
mod renderer;
pub mod shaders;

pub use common::{frame_uniforms, projection_matrix, view_matrix, SceneUniforms};
pub use renderer::Renderer;
