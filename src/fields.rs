//! The simulation's named fields and the grid they share.

use glam::Vec2;

use crate::ping_pong::PingPong;
use crate::stage::Backend;
use crate::surface::{Capabilities, Channels, FilterMode, SurfaceDesc};

/// Grid size derived from the drawing buffer. Every field has exactly this
/// size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridResolution {
    pub width: u32,
    pub height: u32,
}

impl GridResolution {
    /// `buffer >> downsample` per axis, never below one texel.
    pub fn from_drawing_buffer(width: u32, height: u32, downsample: u32) -> Self {
        let shift = downsample.min(31);
        Self {
            width: (width >> shift).max(1),
            height: (height >> shift).max(1),
        }
    }

    pub fn texel_size(&self) -> Vec2 {
        Vec2::new(1.0 / self.width as f32, 1.0 / self.height as f32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Velocity,
    Density,
    Divergence,
    Curl,
    Pressure,
}

impl FieldKind {
    pub const ALL: [FieldKind; 5] = [
        FieldKind::Density,
        FieldKind::Velocity,
        FieldKind::Divergence,
        FieldKind::Curl,
        FieldKind::Pressure,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Velocity => "velocity",
            FieldKind::Density => "density",
            FieldKind::Divergence => "divergence",
            FieldKind::Curl => "curl",
            FieldKind::Pressure => "pressure",
        }
    }

    pub fn channels(self) -> Channels {
        match self {
            FieldKind::Velocity => Channels::Rg,
            FieldKind::Density => Channels::Rgba,
            FieldKind::Divergence | FieldKind::Curl | FieldKind::Pressure => Channels::R,
        }
    }

    /// Divergence and curl are scratch fields rebuilt every frame; the rest
    /// persist and need a back buffer.
    pub fn is_double_buffered(self) -> bool {
        matches!(
            self,
            FieldKind::Velocity | FieldKind::Density | FieldKind::Pressure
        )
    }

    /// First binding slot; double-buffered fields also own `slot + 1`.
    pub fn slot(self) -> u32 {
        match self {
            FieldKind::Density => 0,
            FieldKind::Velocity => 2,
            FieldKind::Divergence => 4,
            FieldKind::Curl => 5,
            FieldKind::Pressure => 6,
        }
    }

    /// Only the transported fields are worth interpolating.
    pub fn filter(self, capabilities: &Capabilities) -> FilterMode {
        match self {
            FieldKind::Velocity | FieldKind::Density => capabilities.filter(),
            _ => FilterMode::Nearest,
        }
    }

    pub fn surface_desc(
        self,
        resolution: GridResolution,
        capabilities: &Capabilities,
        buffer: u32,
    ) -> SurfaceDesc {
        SurfaceDesc {
            label: self.label(),
            width: resolution.width,
            height: resolution.height,
            channels: self.channels(),
            precision: capabilities.precision,
            filter: self.filter(capabilities),
            slot: self.slot() + buffer,
        }
    }
}

pub struct Fields<S> {
    resolution: GridResolution,
    pub velocity: PingPong<S>,
    pub density: PingPong<S>,
    pub divergence: S,
    pub curl: S,
    pub pressure: PingPong<S>,
}

impl<S> Fields<S> {
    /// Allocates every field, zeroed, at `resolution`.
    pub fn new<B>(backend: &mut B, resolution: GridResolution) -> Self
    where
        B: Backend<Surface = S>,
    {
        let capabilities = backend.capabilities();
        let mut single = |kind: FieldKind| {
            backend.create_surface(&kind.surface_desc(resolution, &capabilities, 0))
        };
        let divergence = single(FieldKind::Divergence);
        let curl = single(FieldKind::Curl);

        let mut double = |kind: FieldKind| {
            PingPong::new(
                backend.create_surface(&kind.surface_desc(resolution, &capabilities, 0)),
                backend.create_surface(&kind.surface_desc(resolution, &capabilities, 1)),
            )
        };
        let density = double(FieldKind::Density);
        let velocity = double(FieldKind::Velocity);
        let pressure = double(FieldKind::Pressure);

        Self {
            resolution,
            velocity,
            density,
            divergence,
            curl,
            pressure,
        }
    }

    pub fn resolution(&self) -> GridResolution {
        self.resolution
    }

    pub fn texel_size(&self) -> Vec2 {
        self.resolution.texel_size()
    }

    /// Front surface of a field (the only surface for single-buffered ones).
    pub fn current(&self, kind: FieldKind) -> &S {
        match kind {
            FieldKind::Velocity => self.velocity.read(),
            FieldKind::Density => self.density.read(),
            FieldKind::Divergence => &self.divergence,
            FieldKind::Curl => &self.curl,
            FieldKind::Pressure => self.pressure.read(),
        }
    }
}
