use std::sync::Arc;

use anyhow::{Context, Result};
use bytemuck::{bytes_of, Pod};
use log::{info, warn};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use super::common::{SceneUniforms, CLEAR_COLOR};
use super::shaders::{GRID_FRAGMENT, GRID_VERTEX, HOURGLASS_FRAGMENT, HOURGLASS_VERTEX};
use crate::geometry::{GridVertex, SceneGeometry, Vertex};
use crate::shader::{
    create_shader_program, log_uncaptured_errors, ProgramDescriptor, ShaderProgram,
};

/// GPU renderer backed by wgpu that draws the hourglass and optional grid.
pub struct Renderer {
    // Declared before `window` so the surface is dropped first.
    surface: wgpu::Surface,
    window: Arc<Window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    depth: DepthBuffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    grid: Option<DrawLayer>,
    hourglass: DrawLayer,
}

impl Renderer {
    /// Initializes the GPU renderer for the window and uploads the geometry.
    pub async fn new(window: Arc<Window>, geometry: &SceneGeometry) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        // SAFETY: the renderer owns an `Arc` to the window and drops the
        // surface before it.
        let surface = unsafe { instance.create_surface(window.as_ref()) }
            .context("failed to create window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;
        info!("using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("hourglass-device"),
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("failed to create GPU device")?;
        log_uncaptured_errors(&device);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no supported formats")?;
        info!("surface format {surface_format:?}");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|mode| {
                    matches!(
                        mode,
                        wgpu::PresentMode::Mailbox | wgpu::PresentMode::Immediate
                    )
                })
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth = DepthBuffer::create(&device, config.width, config.height);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene-bind-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<SceneUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene-uniform"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene-bind-group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let grid = geometry.grid.as_deref().map(|vertices| {
            let program = create_shader_program(
                &device,
                &ProgramDescriptor {
                    label: "grid",
                    vertex_source: GRID_VERTEX,
                    fragment_source: GRID_FRAGMENT,
                    vertex_layout: GridVertex::layout(),
                    bind_group_layouts: &[&uniform_layout],
                    topology: wgpu::PrimitiveTopology::LineList,
                    color_format: surface_format,
                    depth_format: Some(DepthBuffer::FORMAT),
                    depth_write: true,
                },
            );
            DrawLayer::new(program, GpuMesh::new(&device, vertices, "grid"))
        });

        // Depth writes stay off so the two pyramids blend through each other.
        let hourglass_program = create_shader_program(
            &device,
            &ProgramDescriptor {
                label: "hourglass",
                vertex_source: HOURGLASS_VERTEX,
                fragment_source: HOURGLASS_FRAGMENT,
                vertex_layout: Vertex::layout(),
                bind_group_layouts: &[&uniform_layout],
                topology: wgpu::PrimitiveTopology::TriangleList,
                color_format: surface_format,
                depth_format: Some(DepthBuffer::FORMAT),
                depth_write: false,
            },
        );
        let hourglass = DrawLayer::new(
            hourglass_program,
            GpuMesh::new(&device, &geometry.hourglass, "hourglass"),
        );

        Ok(Self {
            surface,
            window,
            device,
            queue,
            config,
            size,
            depth,
            uniform_buffer,
            uniform_bind_group,
            grid,
            hourglass,
        })
    }

    /// Returns the identifier of the window owned by the renderer.
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Resizes the swap chain and depth buffer. Zero-area sizes are ignored.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::create(&self.device, new_size.width, new_size.height);
    }

    /// Uploads this frame's uniforms, draws the grid then the hourglass and
    /// presents.
    pub fn render(&self, uniforms: &SceneUniforms) -> Result<(), wgpu::SurfaceError> {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytes_of(uniforms));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: true,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: true,
                    }),
                    stencil_ops: None,
                }),
            });

            if let Some(grid) = &self.grid {
                grid.draw(&mut pass, &self.uniform_bind_group);
            }
            self.hourglass.draw(&mut pass, &self.uniform_bind_group);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// A program paired with the vertex buffer it draws.
struct DrawLayer {
    program: ShaderProgram,
    mesh: GpuMesh,
}

impl DrawLayer {
    fn new(program: ShaderProgram, mesh: GpuMesh) -> Self {
        if !program.is_usable() {
            warn!(
                "program {} has {} diagnostic(s); it will not be drawn",
                program.label(),
                program.diagnostics().len()
            );
        }
        Self { program, mesh }
    }

    fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, bind_group: &'a wgpu::BindGroup) {
        if !self.program.is_usable() {
            return;
        }
        pass.set_pipeline(self.program.pipeline());
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, self.mesh.vertex.slice(..));
        pass.draw(0..self.mesh.vertex_count, 0..1);
    }
}

struct GpuMesh {
    vertex: wgpu::Buffer,
    vertex_count: u32,
}

impl GpuMesh {
    fn new<T: Pod>(device: &wgpu::Device, vertices: &[T], label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vertex,
            vertex_count: vertices.len() as u32,
        }
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}
