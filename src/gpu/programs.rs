//! Uniform layouts and render pipelines for the stage programs.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use super::shaders;
use crate::error::{Error, Result};
use crate::stage::{AdvectionUniforms, Program, SplatUniforms, VorticityUniforms};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ClearParams {
    pub value: f32,
    pub _padding: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct BaseParams {
    pub texel_size: [f32; 2],
    pub _padding: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct AdvectionParams {
    pub texel_size: [f32; 2],
    pub dt: f32,
    pub dissipation: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct VorticityParams {
    pub texel_size: [f32; 2],
    pub curl: f32,
    pub dt: f32,
}

/// `vec3` aligns to 16 bytes in WGSL, so the scalar after it fills the gap.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SplatParams {
    pub color: [f32; 3],
    pub aspect_ratio: f32,
    pub point: [f32; 2],
    pub radius: f32,
    pub _padding: f32,
}

/// Largest uniform block; every program's buffer has this size.
pub const UNIFORM_BUFFER_SIZE: u64 = std::mem::size_of::<SplatParams>() as u64;

impl ClearParams {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            _padding: [0.0; 3],
        }
    }
}

impl BaseParams {
    pub fn new(texel_size: glam::Vec2) -> Self {
        Self {
            texel_size: texel_size.to_array(),
            _padding: [0.0; 2],
        }
    }
}

impl From<&AdvectionUniforms> for AdvectionParams {
    fn from(u: &AdvectionUniforms) -> Self {
        Self {
            texel_size: u.texel_size.to_array(),
            dt: u.dt,
            dissipation: u.dissipation,
        }
    }
}

impl From<&VorticityUniforms> for VorticityParams {
    fn from(u: &VorticityUniforms) -> Self {
        Self {
            texel_size: u.texel_size.to_array(),
            curl: u.curl,
            dt: u.dt,
        }
    }
}

impl From<&SplatUniforms> for SplatParams {
    fn from(u: &SplatUniforms) -> Self {
        Self {
            color: u.color.to_array(),
            aspect_ratio: u.aspect_ratio,
            point: u.point.to_array(),
            radius: u.radius,
            _padding: 0.0,
        }
    }
}

/// A linked program: its bind group layout, uniform buffer and one pipeline
/// per render target format.
pub struct ProgramPipelines {
    pub program: Program,
    pub layout: wgpu::BindGroupLayout,
    pub uniforms: wgpu::Buffer,
    pub pipelines: HashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
}

impl ProgramPipelines {
    /// Compiles `program` and builds a pipeline for every format in
    /// `targets`. Validation errors are captured and returned instead of
    /// reaching the device's uncaptured error handler.
    pub async fn build(
        device: &wgpu::Device,
        program: Program,
        targets: &[wgpu::TextureFormat],
        filterable: bool,
    ) -> Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(program.label()),
            source: wgpu::ShaderSource::Wgsl(shaders::source(program).into()),
        });

        let mut entries = vec![wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }];
        for i in 0..shaders::texture_count(program) as u32 {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: 1 + 2 * i,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: 2 + 2 * i,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(if filterable {
                    wgpu::SamplerBindingType::Filtering
                } else {
                    wgpu::SamplerBindingType::NonFiltering
                }),
                count: None,
            });
        }

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(program.label()),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(program.label()),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let mut pipelines = HashMap::new();
        for &format in targets {
            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(program.label()),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader_module,
                    entry_point: "vs_main",
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    buffers: &[],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader_module,
                    entry_point: "fs_main",
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            });
            pipelines.insert(format, pipeline);
        }

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(program.label()),
            size: UNIFORM_BUFFER_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        if let Some(error) = device.pop_error_scope().await {
            return Err(Error::ProgramBuild {
                program: program.label(),
                message: error.to_string(),
            });
        }

        Ok(Self {
            program,
            layout,
            uniforms,
            pipelines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_blocks_match_wgsl_sizes() {
        assert_eq!(std::mem::size_of::<ClearParams>(), 16);
        assert_eq!(std::mem::size_of::<BaseParams>(), 16);
        assert_eq!(std::mem::size_of::<AdvectionParams>(), 16);
        assert_eq!(std::mem::size_of::<VorticityParams>(), 16);
        assert_eq!(std::mem::size_of::<SplatParams>(), 32);
    }
}
