//! Rotating, Phong-shaded hourglass rendered with wgpu.
//!
//! Two square pyramids meet at the origin; the keyboard translates, scales
//! and rotates them. The transform, input and geometry modules are plain
//! data and maths so they can be exercised without a window or GPU; the
//! `render`, `shader` and `app` modules hold the wgpu and winit plumbing.

pub mod app;
pub mod config;
pub mod geometry;
pub mod input;
pub mod render;
pub mod shader;
pub mod state;
pub mod transform;

pub use config::{DemoConfig, Variant};
pub use geometry::{GridVertex, SceneGeometry, Vertex};
pub use input::{InputHandler, KeyCode, KeyResponse, NamedKey};
pub use render::{Renderer, SceneUniforms};
pub use shader::{
    create_shader_program, ProgramDescriptor, ShaderError, ShaderProgram, ShaderStage,
};
pub use state::{DemoState, Viewport};
pub use transform::{Axis, TransformState};
