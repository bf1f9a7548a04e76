// Headless GPU checks for program construction. Skipped when no adapter is
// available.

use hourglass_demo::render::shaders::{
    GRID_FRAGMENT, GRID_VERTEX, HOURGLASS_FRAGMENT, HOURGLASS_VERTEX,
};
use hourglass_demo::shader::log_uncaptured_errors;
use hourglass_demo::{
    create_shader_program, GridVertex, ProgramDescriptor, SceneUniforms, ShaderProgram,
    ShaderStage, Vertex,
};

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

fn create_device() -> Option<wgpu::Device> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::LowPower,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))?;
    let desc = wgpu::DeviceDescriptor {
        label: Some("shader-program-test-device"),
        features: wgpu::Features::empty(),
        limits: wgpu::Limits::downlevel_defaults(),
    };
    let (device, _queue) = pollster::block_on(adapter.request_device(&desc, None)).ok()?;
    log_uncaptured_errors(&device);
    Some(device)
}

fn uniform_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("test-scene-layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(
                    std::mem::size_of::<SceneUniforms>() as u64
                ),
            },
            count: None,
        }],
    })
}

fn hourglass_program(device: &wgpu::Device, vertex: &str, fragment: &str) -> ShaderProgram {
    let layout = uniform_layout(device);
    create_shader_program(
        device,
        &ProgramDescriptor {
            label: "test-hourglass",
            vertex_source: vertex,
            fragment_source: fragment,
            vertex_layout: Vertex::layout(),
            bind_group_layouts: &[&layout],
            topology: wgpu::PrimitiveTopology::TriangleList,
            color_format: COLOR_FORMAT,
            depth_format: Some(wgpu::TextureFormat::Depth24Plus),
            depth_write: false,
        },
    )
}

#[test]
fn builtin_programs_link_cleanly() {
    let Some(device) = create_device() else {
        eprintln!("Skipping builtin_programs_link_cleanly (no GPU)");
        return;
    };

    let hourglass = hourglass_program(&device, HOURGLASS_VERTEX, HOURGLASS_FRAGMENT);
    assert!(hourglass.is_usable(), "{:?}", hourglass.diagnostics());

    let layout = uniform_layout(&device);
    let grid = create_shader_program(
        &device,
        &ProgramDescriptor {
            label: "test-grid",
            vertex_source: GRID_VERTEX,
            fragment_source: GRID_FRAGMENT,
            vertex_layout: GridVertex::layout(),
            bind_group_layouts: &[&layout],
            topology: wgpu::PrimitiveTopology::LineList,
            color_format: COLOR_FORMAT,
            depth_format: Some(wgpu::TextureFormat::Depth24Plus),
            depth_write: true,
        },
    );
    assert!(grid.is_usable(), "{:?}", grid.diagnostics());
    assert_eq!(grid.label(), "test-grid");
}

#[test]
fn broken_vertex_stage_is_reported_not_fatal() {
    let Some(device) = create_device() else {
        eprintln!("Skipping broken_vertex_stage_is_reported_not_fatal (no GPU)");
        return;
    };

    let program = hourglass_program(&device, "@vertex fn vs_main( {", HOURGLASS_FRAGMENT);
    assert!(!program.is_usable());
    let stages: Vec<_> = program
        .diagnostics()
        .iter()
        .filter_map(|diag| diag.stage())
        .collect();
    assert_eq!(stages, vec![ShaderStage::Vertex]);
}

#[test]
fn broken_fragment_stage_is_reported_not_fatal() {
    let Some(device) = create_device() else {
        eprintln!("Skipping broken_fragment_stage_is_reported_not_fatal (no GPU)");
        return;
    };

    let program = hourglass_program(&device, HOURGLASS_VERTEX, "@fragment fn fs_main() -> oops");
    let stages: Vec<_> = program
        .diagnostics()
        .iter()
        .filter_map(|diag| diag.stage())
        .collect();
    assert_eq!(stages, vec![ShaderStage::Fragment]);
    assert!(program
        .diagnostics()
        .iter()
        .all(|diag| diag.to_string().len() <= 600));
}

#[test]
fn mismatched_interface_is_a_link_error() {
    let Some(device) = create_device() else {
        eprintln!("Skipping mismatched_interface_is_a_link_error (no GPU)");
        return;
    };

    // Both stages compile, but location 5 is never written by the vertex stage.
    let fragment = r#"
@fragment
fn fs_main(@location(5) tint: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(tint, 1.0);
}
"#;
    let program = hourglass_program(&device, HOURGLASS_VERTEX, fragment);
    assert!(!program.is_usable());
    assert!(program.diagnostics().iter().all(|diag| diag.is_link()));
}
