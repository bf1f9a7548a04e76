//! Builds linked GPU programs from a vertex and a fragment source.
//!
//! Compilation and link failures are never fatal: each one is logged with
//! its stage, kept on the returned [`ShaderProgram`], and the program is
//! handed back anyway. Callers check [`ShaderProgram::is_usable`] before
//! drawing with it.

use std::fmt;

use log::{error, info};
use thiserror::Error;

/// Longest driver diagnostic kept per failure, in characters.
pub const MAX_LOG_LEN: usize = 511;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Diagnostic recorded while building a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderError {
    #[error("{stage} shader compilation error: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("program link error: {log}")]
    Link { log: String },
}

impl ShaderError {
    /// Stage that failed to compile, or `None` for link errors.
    pub fn stage(&self) -> Option<ShaderStage> {
        match self {
            ShaderError::Compile { stage, .. } => Some(*stage),
            ShaderError::Link { .. } => None,
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, ShaderError::Link { .. })
    }
}

/// Cuts `message` to at most [`MAX_LOG_LEN`] characters.
pub fn truncate_log(message: &str) -> String {
    match message.char_indices().nth(MAX_LOG_LEN) {
        Some((index, _)) => message[..index].to_string(),
        None => message.to_string(),
    }
}

/// Everything needed to link one program.
pub struct ProgramDescriptor<'a> {
    pub label: &'a str,
    pub vertex_source: &'a str,
    pub fragment_source: &'a str,
    pub vertex_layout: wgpu::VertexBufferLayout<'a>,
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub topology: wgpu::PrimitiveTopology,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
    /// When false the program depth-tests but leaves the depth buffer alone.
    pub depth_write: bool,
}

/// Linked render pipeline plus the diagnostics produced while building it.
///
/// Dropping the program releases the pipeline.
#[derive(Debug)]
pub struct ShaderProgram {
    label: String,
    pipeline: wgpu::RenderPipeline,
    diagnostics: Vec<ShaderError>,
}

impl ShaderProgram {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn diagnostics(&self) -> &[ShaderError] {
        &self.diagnostics
    }

    pub fn is_usable(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Compiles both stages and links them into a program.
///
/// The shader modules only live until the link attempt; the pipeline keeps
/// what it needs from them.
pub fn create_shader_program(
    device: &wgpu::Device,
    desc: &ProgramDescriptor<'_>,
) -> ShaderProgram {
    let mut diagnostics = Vec::new();
    let vertex = compile_stage(
        device,
        desc.label,
        ShaderStage::Vertex,
        desc.vertex_source,
        &mut diagnostics,
    );
    let fragment = compile_stage(
        device,
        desc.label,
        ShaderStage::Fragment,
        desc.fragment_source,
        &mut diagnostics,
    );

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{}-layout", desc.label)),
        bind_group_layouts: desc.bind_group_layouts,
        push_constant_ranges: &[],
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &vertex,
            entry_point: "vs_main",
            buffers: &[desc.vertex_layout.clone()],
        },
        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            ..Default::default()
        },
        depth_stencil: desc.depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: desc.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &fragment,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.color_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview: None,
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        let log = truncate_log(&describe(&err));
        error!("ERROR: Program link error ({}): {log}", desc.label);
        diagnostics.push(ShaderError::Link { log });
    }
    drop(vertex);
    drop(fragment);

    if diagnostics.is_empty() {
        info!("linked program {}", desc.label);
    }
    ShaderProgram {
        label: desc.label.to_string(),
        pipeline,
        diagnostics,
    }
}

fn compile_stage(
    device: &wgpu::Device,
    label: &str,
    stage: ShaderStage,
    source: &str,
    diagnostics: &mut Vec<ShaderError>,
) -> wgpu::ShaderModule {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{label}-{stage}")),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        let log = truncate_log(&describe(&err));
        error!("ERROR: Shader compilation error ({label}, {stage}): {log}");
        diagnostics.push(ShaderError::Compile { stage, log });
    }
    module
}

fn describe(err: &wgpu::Error) -> String {
    match err {
        wgpu::Error::Validation { description, .. } => description.clone(),
        other => other.to_string(),
    }
}

/// Routes errors raised outside an error scope to the log instead of the
/// default panic handler.
pub fn log_uncaptured_errors(device: &wgpu::Device) {
    device.on_uncaptured_error(Box::new(|err: wgpu::Error| {
        error!("uncaptured GPU error: {err}");
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_logs_are_untouched() {
        assert_eq!(truncate_log("bad token"), "bad token");
    }

    #[test]
    fn long_logs_keep_511_chars() {
        let long = "x".repeat(2000);
        assert_eq!(truncate_log(&long).len(), MAX_LOG_LEN);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let long = "é".repeat(600);
        let cut = truncate_log(&long);
        assert_eq!(cut.chars().count(), MAX_LOG_LEN);
    }

    #[test]
    fn errors_name_their_stage() {
        let compile = ShaderError::Compile {
            stage: ShaderStage::Fragment,
            log: "oops".into(),
        };
        assert_eq!(compile.stage(), Some(ShaderStage::Fragment));
        assert_eq!(compile.to_string(), "fragment shader compilation error: oops");
        let link = ShaderError::Link { log: "mismatch".into() };
        assert!(link.is_link());
        assert_eq!(link.stage(), None);
        assert_eq!(link.to_string(), "program link error: mismatch");
    }
}
