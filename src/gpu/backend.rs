use std::collections::HashMap;

use half::f16;
use image::RgbaImage;
use tokio::sync::oneshot;

use super::programs::{
    AdvectionParams, BaseParams, ClearParams, ProgramPipelines, SplatParams, VorticityParams,
};
use crate::error::{Error, Result};
use crate::render::Renderer;
use crate::stage::{Backend, Pass, Program};
use crate::surface::{Capabilities, Channels, FilterMode, Precision, Surface, SurfaceDesc};

/// Format of the offscreen surface the display program draws into.
pub const SCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

#[derive(Debug, Clone)]
pub struct GpuOptions {
    pub precision: Precision,
    pub power_preference: wgpu::PowerPreference,
}

impl Default for GpuOptions {
    fn default() -> Self {
        Self {
            precision: Precision::Half,
            power_preference: wgpu::PowerPreference::HighPerformance,
        }
    }
}

pub fn storage_format(channels: Channels, precision: Precision) -> wgpu::TextureFormat {
    use wgpu::TextureFormat as F;
    match (channels, precision) {
        (Channels::R, Precision::Half) => F::R16Float,
        (Channels::Rg, Precision::Half) => F::Rg16Float,
        (Channels::Rgba, Precision::Half) => F::Rgba16Float,
        (Channels::R, Precision::Float) => F::R32Float,
        (Channels::Rg, Precision::Float) => F::Rg32Float,
        (Channels::Rgba, Precision::Float) => F::Rgba32Float,
    }
}

/// A texture with its render-target view and the sampler it is read with.
pub struct GpuSurface {
    desc: SurfaceDesc,
    format: wgpu::TextureFormat,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl GpuSurface {
    pub fn desc(&self) -> &SurfaceDesc {
        &self.desc
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

impl std::fmt::Debug for GpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuSurface")
            .field("desc", &self.desc)
            .field("format", &self.format)
            .finish()
    }
}

pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    capabilities: Capabilities,
    advection: Program,
    programs: HashMap<Program, ProgramPipelines>,
    screen: Option<GpuSurface>,
}

impl GpuBackend {
    pub async fn new(options: GpuOptions) -> Result<Self> {
        let instance = wgpu::Instance::default();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: options.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(Error::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("using GPU adapter {} ({:?})", info.name, info.backend);

        let mut required_features = wgpu::Features::empty();
        let linear_filtering = match options.precision {
            Precision::Half => adapter
                .get_texture_format_features(storage_format(Channels::Rgba, Precision::Half))
                .flags
                .contains(wgpu::TextureFormatFeatureFlags::FILTERABLE),
            Precision::Float => {
                let supported = adapter
                    .features()
                    .contains(wgpu::Features::FLOAT32_FILTERABLE);
                if supported {
                    required_features |= wgpu::Features::FLOAT32_FILTERABLE;
                }
                supported
            }
        };
        let capabilities = Capabilities {
            precision: options.precision,
            linear_filtering,
        };

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("smokeflow"),
                    required_features,
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await?;

        let advection = Program::advection_for(&capabilities);
        if advection == Program::AdvectionManualFilter {
            log::warn!(
                "{:?} storage is not filterable, advecting with manual bilinear filtering",
                options.precision
            );
        }

        let storage_targets = [
            storage_format(Channels::R, options.precision),
            storage_format(Channels::Rg, options.precision),
            storage_format(Channels::Rgba, options.precision),
        ];
        let mut programs = HashMap::new();
        for program in Program::ALL {
            let targets: &[wgpu::TextureFormat] = if program == Program::Display {
                &[SCREEN_FORMAT]
            } else {
                &storage_targets
            };
            let built =
                ProgramPipelines::build(&device, program, targets, linear_filtering).await?;
            programs.insert(program, built);
        }

        Ok(Self {
            device,
            queue,
            capabilities,
            advection,
            programs,
            screen: None,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn advection_program(&self) -> Program {
        self.advection
    }

    fn create_texture(&self, desc: SurfaceDesc, format: wgpu::TextureFormat) -> GpuSurface {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let filter = match desc.filter {
            FilterMode::Linear => wgpu::FilterMode::Linear,
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
        };
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(desc.label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        GpuSurface {
            desc,
            format,
            texture,
            view,
            sampler,
        }
    }

    fn run_render_pass(
        &self,
        program: Program,
        uniforms: &[u8],
        inputs: &[&GpuSurface],
        target: &GpuSurface,
    ) {
        // Every program is built in `new` for every format it can target.
        let linked = self.programs.get(&program);
        let pipeline = linked.and_then(|linked| linked.pipelines.get(&target.format));
        let (Some(linked), Some(pipeline)) = (linked, pipeline) else {
            debug_assert!(false, "no {} pipeline for {:?}", program.label(), target.format);
            return;
        };

        if !uniforms.is_empty() {
            self.queue.write_buffer(&linked.uniforms, 0, uniforms);
        }

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: linked.uniforms.as_entire_binding(),
        }];
        for (i, surface) in inputs.iter().enumerate() {
            let i = i as u32;
            entries.push(wgpu::BindGroupEntry {
                binding: 1 + 2 * i,
                resource: wgpu::BindingResource::TextureView(&surface.view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: 2 + 2 * i,
                resource: wgpu::BindingResource::Sampler(&surface.sampler),
            });
        }
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(program.label()),
            layout: &linked.layout,
            entries: &entries,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(program.label()),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(program.label()),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Copies `surface` back to the host. Rows are flipped so the result
    /// uses the bottom-left origin of [`Surface`].
    pub async fn read_surface(&self, surface: &GpuSurface) -> Result<Surface> {
        let desc = surface.desc;
        let width = desc.width;
        let height = desc.height;
        let unpadded_bytes_per_row = width * texel_bytes(surface.format);
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = (unpadded_bytes_per_row + align - 1) / align * align;

        let read_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback"),
            size: padded_bytes_per_row as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &surface.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &read_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = read_buffer.slice(..);
        let (sender, receiver) = oneshot::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        receiver.await??;

        let stride = desc.channels.count();
        let mut texels = vec![0.0f32; width as usize * height as usize * stride];
        {
            let data = buffer_slice.get_mapped_range();
            for row in 0..height as usize {
                let start = row * padded_bytes_per_row as usize;
                let bytes = &data[start..start + unpadded_bytes_per_row as usize];
                let out_row = height as usize - 1 - row;
                let row_len = width as usize * stride;
                let out = &mut texels[out_row * row_len..][..row_len];
                decode_row(surface.format, bytes, out);
            }
        }
        read_buffer.unmap();

        Ok(Surface::from_texels(desc, texels))
    }

    /// The last presented frame, top row first. `None` before the first
    /// `present`.
    pub async fn read_frame(&self) -> Result<Option<RgbaImage>> {
        match &self.screen {
            Some(screen) => {
                let surface = self.read_surface(screen).await?;
                Ok(Some(Renderer::to_rgba_image(&surface)))
            }
            None => Ok(None),
        }
    }
}

impl Backend for GpuBackend {
    type Surface = GpuSurface;

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn create_surface(&mut self, desc: &SurfaceDesc) -> GpuSurface {
        self.create_texture(*desc, storage_format(desc.channels, desc.precision))
    }

    fn draw(&mut self, pass: Pass<'_, GpuSurface>, target: &mut GpuSurface) {
        log::trace!("{} -> {}", pass.program().label(), target.desc.label);
        match pass {
            Pass::Clear { source, value } => self.run_render_pass(
                Program::Clear,
                bytemuck::bytes_of(&ClearParams::new(value)),
                &[source],
                target,
            ),
            Pass::Splat { target: base, uniforms } => self.run_render_pass(
                Program::Splat,
                bytemuck::bytes_of(&SplatParams::from(&uniforms)),
                &[base],
                target,
            ),
            Pass::Advect {
                velocity,
                source,
                uniforms,
            } => self.run_render_pass(
                self.advection,
                bytemuck::bytes_of(&AdvectionParams::from(&uniforms)),
                &[velocity, source],
                target,
            ),
            Pass::Divergence {
                velocity,
                texel_size,
            } => self.run_render_pass(
                Program::Divergence,
                bytemuck::bytes_of(&BaseParams::new(texel_size)),
                &[velocity],
                target,
            ),
            Pass::Curl {
                velocity,
                texel_size,
            } => self.run_render_pass(
                Program::Curl,
                bytemuck::bytes_of(&BaseParams::new(texel_size)),
                &[velocity],
                target,
            ),
            Pass::Vorticity {
                velocity,
                curl,
                uniforms,
            } => self.run_render_pass(
                Program::Vorticity,
                bytemuck::bytes_of(&VorticityParams::from(&uniforms)),
                &[velocity, curl],
                target,
            ),
            Pass::Pressure {
                pressure,
                divergence,
                texel_size,
            } => self.run_render_pass(
                Program::Pressure,
                bytemuck::bytes_of(&BaseParams::new(texel_size)),
                &[pressure, divergence],
                target,
            ),
            Pass::GradientSubtract {
                pressure,
                velocity,
                texel_size,
            } => self.run_render_pass(
                Program::GradientSubtract,
                bytemuck::bytes_of(&BaseParams::new(texel_size)),
                &[pressure, velocity],
                target,
            ),
        }
    }

    fn present(&mut self, source: &GpuSurface, viewport: [u32; 2]) {
        let [width, height] = [viewport[0].max(1), viewport[1].max(1)];
        let screen = match self.screen.take() {
            Some(screen) if screen.desc.width == width && screen.desc.height == height => screen,
            _ => self.create_texture(
                SurfaceDesc {
                    label: "screen",
                    width,
                    height,
                    channels: Channels::Rgba,
                    precision: Precision::Float,
                    filter: FilterMode::Nearest,
                    slot: 0,
                },
                SCREEN_FORMAT,
            ),
        };
        self.run_render_pass(Program::Display, &[], &[source], &screen);
        self.screen = Some(screen);
    }
}

fn texel_bytes(format: wgpu::TextureFormat) -> u32 {
    use wgpu::TextureFormat as F;
    match format {
        F::R16Float => 2,
        F::Rg16Float | F::R32Float | F::Rgba8Unorm => 4,
        F::Rgba16Float | F::Rg32Float => 8,
        _ => 16,
    }
}

fn decode_row(format: wgpu::TextureFormat, bytes: &[u8], out: &mut [f32]) {
    match format {
        wgpu::TextureFormat::Rgba8Unorm => {
            for (value, byte) in out.iter_mut().zip(bytes) {
                *value = *byte as f32 / 255.0;
            }
        }
        wgpu::TextureFormat::R16Float
        | wgpu::TextureFormat::Rg16Float
        | wgpu::TextureFormat::Rgba16Float => {
            for (value, bits) in out.iter_mut().zip(bytes.chunks_exact(2)) {
                *value = f16::from_bits(u16::from_le_bytes([bits[0], bits[1]])).to_f32();
            }
        }
        _ => {
            for (value, word) in out.iter_mut().zip(bytes.chunks_exact(4)) {
                *value = f32::from_le_bytes([word[0], word[1], word[2], word[3]]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_half_float_rows() {
        let values = [1.0f32, -2.0, 0.5, 0.0];
        let bytes: Vec<u8> = values
            .iter()
            .flat_map(|&v| f16::from_f32(v).to_bits().to_le_bytes())
            .collect();
        let mut out = [9.0f32; 4];
        decode_row(wgpu::TextureFormat::Rgba16Float, &bytes, &mut out);
        assert_eq!(out, values);
    }

    #[test]
    fn decodes_unorm_and_float_rows() {
        let mut out = [0.0f32; 4];
        decode_row(wgpu::TextureFormat::Rgba8Unorm, &[0, 255, 51, 255], &mut out);
        assert_eq!(out, [0.0, 1.0, 0.2, 1.0]);

        let bytes: Vec<u8> = [3.25f32, -1.5].iter().flat_map(|v| v.to_le_bytes()).collect();
        let mut out = [0.0f32; 2];
        decode_row(wgpu::TextureFormat::Rg32Float, &bytes, &mut out);
        assert_eq!(out, [3.25, -1.5]);
    }

    #[test]
    fn storage_formats_follow_precision() {
        assert_eq!(
            storage_format(Channels::Rg, Precision::Half),
            wgpu::TextureFormat::Rg16Float
        );
        assert_eq!(
            storage_format(Channels::Rgba, Precision::Float),
            wgpu::TextureFormat::Rgba32Float
        );
    }
}
