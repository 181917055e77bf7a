//! Software backend: rasterizes every pass over host-resident surfaces.

pub mod programs;

use glam::{Vec2, Vec4};
use image::RgbaImage;

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::render::Renderer;
use crate::stage::{Backend, Pass, Program};
use crate::surface::{
    write_texel, Capabilities, Channels, FilterMode, Precision, Surface, SurfaceDesc,
};

pub use programs::Fragment;

pub struct CpuBackend {
    capabilities: Capabilities,
    advection: Program,
    screen: Option<Surface>,
    frame: RgbaImage,
}

impl CpuBackend {
    /// Full-precision storage with linear filtering.
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities {
            precision: Precision::Float,
            linear_filtering: true,
        })
    }

    /// Emulates a runtime with the given capabilities. Without linear
    /// filtering, advection uses the manual bilinear program.
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        let advection = Program::advection_for(&capabilities);
        if advection == Program::AdvectionManualFilter {
            log::warn!("linear filtering unavailable, advecting with manual bilinear filtering");
        }
        Self {
            capabilities,
            advection,
            screen: None,
            frame: RgbaImage::new(1, 1),
        }
    }

    pub fn advection_program(&self) -> Program {
        self.advection
    }

    /// The last presented frame, top row first.
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for CpuBackend {
    type Surface = Surface;

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn create_surface(&mut self, desc: &SurfaceDesc) -> Surface {
        Surface::new(*desc)
    }

    fn draw(&mut self, pass: Pass<'_, Surface>, target: &mut Surface) {
        log::trace!("{} -> {}", pass.program().label(), target.desc().label);
        match pass {
            Pass::Clear { source, value } => {
                rasterize(target, |frag| programs::clear(frag, source, value))
            }
            Pass::Splat { target: base, uniforms } => {
                rasterize(target, |frag| programs::splat(frag, base, &uniforms))
            }
            Pass::Advect {
                velocity,
                source,
                uniforms,
            } => match self.advection {
                Program::AdvectionManualFilter => rasterize(target, |frag| {
                    programs::advect_manual_filter(frag, velocity, source, &uniforms)
                }),
                _ => rasterize(target, |frag| {
                    programs::advect(frag, velocity, source, &uniforms)
                }),
            },
            Pass::Divergence {
                velocity,
                texel_size,
            } => rasterize(target, |frag| {
                programs::divergence(frag, velocity, texel_size)
            }),
            Pass::Curl {
                velocity,
                texel_size,
            } => rasterize(target, |frag| programs::curl(frag, velocity, texel_size)),
            Pass::Vorticity {
                velocity,
                curl,
                uniforms,
            } => rasterize(target, |frag| {
                programs::vorticity(frag, velocity, curl, &uniforms)
            }),
            Pass::Pressure {
                pressure,
                divergence,
                texel_size,
            } => rasterize(target, |frag| {
                programs::pressure(frag, pressure, divergence, texel_size)
            }),
            Pass::GradientSubtract {
                pressure,
                velocity,
                texel_size,
            } => rasterize(target, |frag| {
                programs::gradient_subtract(frag, pressure, velocity, texel_size)
            }),
        }
    }

    fn present(&mut self, source: &Surface, viewport: [u32; 2]) {
        let viewport = [viewport[0].max(1), viewport[1].max(1)];
        let screen = screen_surface(&mut self.screen, viewport);
        rasterize(screen, |frag| programs::display(frag, source));
        self.frame = Renderer::to_rgba_image(screen);
    }
}

fn screen_surface(screen: &mut Option<Surface>, viewport: [u32; 2]) -> &mut Surface {
    let [width, height] = viewport;
    let surface = match screen.take() {
        Some(surface) if surface.desc().width == width && surface.desc().height == height => {
            surface
        }
        _ => Surface::new(SurfaceDesc {
            label: "screen",
            width,
            height,
            channels: Channels::Rgba,
            precision: Precision::Float,
            filter: FilterMode::Nearest,
            slot: 0,
        }),
    };
    screen.insert(surface)
}

/// Shades every texel of `target`. The target is never one of the sampled
/// surfaces, so rows can be shaded independently.
pub fn rasterize<F>(target: &mut Surface, shade: F)
where
    F: Fn(&Fragment) -> Vec4 + Sync,
{
    let width = target.width();
    let height = target.height();
    let stride = target.channels().count();
    let size = Vec2::new(width as f32, height as f32);

    let shade_row = |(y, row): (usize, &mut [f32])| {
        for (x, texel) in row.chunks_exact_mut(stride).enumerate() {
            let frag_coord = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let frag = Fragment {
                uv: frag_coord / size,
                frag_coord,
            };
            write_texel(texel, shade(&frag));
        }
    };

    #[cfg(not(target_arch = "wasm32"))]
    target
        .texels_mut()
        .par_chunks_mut(width * stride)
        .enumerate()
        .for_each(shade_row);

    #[cfg(target_arch = "wasm32")]
    target
        .texels_mut()
        .chunks_mut(width * stride)
        .enumerate()
        .for_each(shade_row);
}
