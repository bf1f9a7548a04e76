use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::config::DemoConfig;

/// Interleaved hourglass vertex: position, color, normal.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Grid line endpoint: position and color, no normal.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GridVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl GridVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Half the edge length of each pyramid base.
const HALF: f32 = 0.4;
pub const HOURGLASS_TRIANGLES: usize = 12;
pub const HOURGLASS_VERTEX_COUNT: usize = HOURGLASS_TRIANGLES * 3;
pub const GRID_COLOR: [f32; 3] = [0.6, 0.6, 0.6];

const CYAN: [f32; 3] = [0.0, 1.0, 1.0];

/// One color per triangle, upper pyramid first.
const FACE_PALETTE: [[f32; 3]; HOURGLASS_TRIANGLES] = [
    [0.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 0.5, 0.0],
    [0.5, 0.0, 1.0],
    [0.0, 0.5, 0.5],
    [1.0, 1.0, 1.0],
];

/// Corner triples for the 12 triangles. The upper pyramid has its base at
/// `y = +HALF`, the lower at `y = -HALF`; both share the apex at the origin.
fn hourglass_triangles() -> [[Vec3; 3]; HOURGLASS_TRIANGLES] {
    let a = Vec3::new(HALF, HALF, HALF);
    let b = Vec3::new(HALF, HALF, -HALF);
    let c = Vec3::new(-HALF, HALF, HALF);
    let d = Vec3::new(-HALF, HALF, -HALF);
    let f = Vec3::new(HALF, -HALF, HALF);
    let g = Vec3::new(HALF, -HALF, -HALF);
    let h = Vec3::new(-HALF, -HALF, -HALF);
    let i = Vec3::new(-HALF, -HALF, HALF);
    let o = Vec3::ZERO;
    [
        [a, d, c],
        [a, d, b],
        [a, c, o],
        [c, d, o],
        [b, d, o],
        [b, a, o],
        [h, i, f],
        [h, f, g],
        [h, i, o],
        [i, f, o],
        [g, h, o],
        [g, f, o],
    ]
}

/// Flat normal for a triangle, oriented away from `interior`.
fn face_normal(corners: &[Vec3; 3], interior: Vec3) -> Vec3 {
    let normal = (corners[1] - corners[0])
        .cross(corners[2] - corners[0])
        .normalize_or_zero();
    let centroid = (corners[0] + corners[1] + corners[2]) / 3.0;
    if normal.dot(centroid - interior) < 0.0 {
        -normal
    } else {
        normal
    }
}

/// Builds the 36-vertex hourglass triangle list.
///
/// With `per_face_colors` every triangle takes its own palette entry,
/// otherwise the whole mesh is cyan.
pub fn hourglass_vertices(per_face_colors: bool) -> Vec<Vertex> {
    let upper_interior = Vec3::new(0.0, HALF * 0.5, 0.0);
    let lower_interior = Vec3::new(0.0, -HALF * 0.5, 0.0);
    hourglass_triangles()
        .iter()
        .enumerate()
        .flat_map(|(index, corners)| {
            let interior = if index < HOURGLASS_TRIANGLES / 2 {
                upper_interior
            } else {
                lower_interior
            };
            let normal = face_normal(corners, interior).to_array();
            let color = if per_face_colors {
                FACE_PALETTE[index]
            } else {
                CYAN
            };
            (*corners).map(|corner| Vertex {
                position: corner.to_array(),
                color,
                normal,
            })
        })
        .collect()
}

/// Upper bound on lines per direction; larger grids are rejected when parsed.
pub const MAX_GRID_LINES: usize = 10_001;

/// Number of lines along one direction for a grid of the given extent/step.
///
/// Only whole steps that fit inside `[-extent, extent]` count, so the last
/// line never lands outside the extent. Capped at [`MAX_GRID_LINES`].
pub fn grid_line_count(extent: f32, step: f32) -> usize {
    if !(extent.is_finite() && step.is_finite()) || extent < 0.0 || step <= 0.0 {
        return 0;
    }
    let spans = grid_spans(extent, step);
    if !spans.is_finite() || spans >= (MAX_GRID_LINES - 1) as f64 {
        return MAX_GRID_LINES;
    }
    (spans as usize)
        .checked_add(1)
        .map_or(MAX_GRID_LINES, |count| count.min(MAX_GRID_LINES))
}

/// Whole steps across `2 * extent`, tolerating float error just below an
/// exact multiple.
pub(crate) fn grid_spans(extent: f32, step: f32) -> f64 {
    let ratio = 2.0 * f64::from(extent) / f64::from(step);
    (ratio + ratio * 1e-6).floor()
}

/// Generates the reference grid in the `z = 0` plane as a line list.
///
/// Horizontal lines (constant y, spanning x in `[-extent, extent]`) come
/// first, then the vertical ones.
pub fn grid_vertices(extent: f32, step: f32) -> Vec<GridVertex> {
    let count = grid_line_count(extent, step);
    let Some(capacity) = count.checked_mul(4) else {
        return Vec::new();
    };
    let mut vertices = Vec::with_capacity(capacity);
    let offsets: Vec<f32> = (0..count)
        .map(|i| (-extent + i as f32 * step).min(extent))
        .collect();
    for &y in &offsets {
        vertices.push(grid_vertex(-extent, y));
        vertices.push(grid_vertex(extent, y));
    }
    for &x in &offsets {
        vertices.push(grid_vertex(x, -extent));
        vertices.push(grid_vertex(x, extent));
    }
    vertices
}

fn grid_vertex(x: f32, y: f32) -> GridVertex {
    GridVertex {
        position: [x, y, 0.0],
        color: GRID_COLOR,
    }
}

/// Vertex data uploaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGeometry {
    pub hourglass: Vec<Vertex>,
    pub grid: Option<Vec<GridVertex>>,
}

impl SceneGeometry {
    pub fn from_config(config: &DemoConfig) -> Self {
        let grid = config
            .has_grid()
            .then(|| grid_vertices(config.grid_extent, config.grid_step));
        Self {
            hourglass: hourglass_vertices(config.has_grid()),
            grid,
        }
    }

    pub fn hourglass_triangle_count(&self) -> usize {
        self.hourglass.len() / 3
    }

    pub fn grid_line_count(&self) -> usize {
        self.grid.as_ref().map_or(0, |grid| grid.len() / 2)
    }
}
