//! Stage programs and the backend seam.
//!
//! Every solver step is one full-target sweep of a stage program. A `Pass`
//! names the program, carries its typed uniforms and borrows the surfaces it
//! samples; a `Backend` executes passes against a target surface. The frame
//! driver is written once against this trait.

use glam::{Vec2, Vec3};

use crate::surface::{Capabilities, SurfaceDesc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Program {
    Clear,
    Display,
    Splat,
    Advection,
    AdvectionManualFilter,
    Divergence,
    Curl,
    Vorticity,
    Pressure,
    GradientSubtract,
}

impl Program {
    pub const ALL: [Program; 10] = [
        Program::Clear,
        Program::Display,
        Program::Splat,
        Program::Advection,
        Program::AdvectionManualFilter,
        Program::Divergence,
        Program::Curl,
        Program::Vorticity,
        Program::Pressure,
        Program::GradientSubtract,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Program::Clear => "clear",
            Program::Display => "display",
            Program::Splat => "splat",
            Program::Advection => "advection",
            Program::AdvectionManualFilter => "advection_manual_filter",
            Program::Divergence => "divergence",
            Program::Curl => "curl",
            Program::Vorticity => "vorticity",
            Program::Pressure => "pressure",
            Program::GradientSubtract => "gradient_subtract",
        }
    }

    /// Advection variant that is legal for the given capabilities.
    pub fn advection_for(capabilities: &Capabilities) -> Program {
        if capabilities.linear_filtering {
            Program::Advection
        } else {
            Program::AdvectionManualFilter
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplatUniforms {
    /// Canvas width over height.
    pub aspect_ratio: f32,
    /// Centre in texture space.
    pub point: Vec2,
    /// Peak value added at the centre.
    pub color: Vec3,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvectionUniforms {
    pub texel_size: Vec2,
    pub dt: f32,
    pub dissipation: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VorticityUniforms {
    pub texel_size: Vec2,
    pub curl: f32,
    pub dt: f32,
}

/// One draw sweep. Surfaces borrowed here are only sampled; the target is
/// passed separately to [`Backend::draw`].
#[derive(Debug)]
pub enum Pass<'a, S> {
    /// `value * source`.
    Clear { source: &'a S, value: f32 },
    /// Gaussian impulse added on top of `target`'s current contents.
    Splat {
        target: &'a S,
        uniforms: SplatUniforms,
    },
    /// Semi-Lagrangian transport of `source` along `velocity`.
    Advect {
        velocity: &'a S,
        source: &'a S,
        uniforms: AdvectionUniforms,
    },
    Divergence { velocity: &'a S, texel_size: Vec2 },
    Curl { velocity: &'a S, texel_size: Vec2 },
    Vorticity {
        velocity: &'a S,
        curl: &'a S,
        uniforms: VorticityUniforms,
    },
    /// One Jacobi relaxation sweep.
    Pressure {
        pressure: &'a S,
        divergence: &'a S,
        texel_size: Vec2,
    },
    GradientSubtract {
        pressure: &'a S,
        velocity: &'a S,
        texel_size: Vec2,
    },
}

impl<S> Pass<'_, S> {
    /// The program that runs this pass. Advection resolves to the
    /// hardware-filtered variant here; backends swap in the manual variant
    /// themselves when their capabilities require it.
    pub fn program(&self) -> Program {
        match self {
            Pass::Clear { .. } => Program::Clear,
            Pass::Splat { .. } => Program::Splat,
            Pass::Advect { .. } => Program::Advection,
            Pass::Divergence { .. } => Program::Divergence,
            Pass::Curl { .. } => Program::Curl,
            Pass::Vorticity { .. } => Program::Vorticity,
            Pass::Pressure { .. } => Program::Pressure,
            Pass::GradientSubtract { .. } => Program::GradientSubtract,
        }
    }
}

pub trait Backend {
    type Surface;

    fn capabilities(&self) -> Capabilities;

    /// Allocates a surface cleared to zero.
    fn create_surface(&mut self, desc: &SurfaceDesc) -> Self::Surface;

    /// Renders `pass` into every texel of `target`.
    fn draw(&mut self, pass: Pass<'_, Self::Surface>, target: &mut Self::Surface);

    /// Draws `source` through the display program onto the visible surface,
    /// resized to `viewport` (`[width, height]` in pixels).
    fn present(&mut self, source: &Self::Surface, viewport: [u32; 2]);
}
