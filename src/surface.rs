//! Texture surfaces: the grid of float vectors every stage reads and writes.
//!
//! Coordinates follow texture space: `uv` in `[0, 1]`, origin at the bottom
//! left, texel `(i, j)` centred at `((i + 0.5) / w, (j + 0.5) / h)`. Row 0 of
//! the texel storage is the bottom row.

use glam::{Vec2, Vec4};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channels {
    R,
    Rg,
    Rgba,
}

impl Channels {
    pub fn count(self) -> usize {
        match self {
            Channels::R => 1,
            Channels::Rg => 2,
            Channels::Rgba => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    Half,
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Linear,
    Nearest,
}

/// Surfaces always clamp; stages rely on out-of-range samples returning the
/// edge texel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapMode {
    ClampToEdge,
}

/// What the runtime can do with the storage precision in use. Decided once
/// when a backend is built and fixed for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub precision: Precision,
    pub linear_filtering: bool,
}

impl Capabilities {
    /// Filter for surfaces that want interpolation (velocity, density).
    pub fn filter(&self) -> FilterMode {
        if self.linear_filtering {
            FilterMode::Linear
        } else {
            FilterMode::Nearest
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            precision: Precision::Half,
            linear_filtering: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDesc {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
    pub channels: Channels,
    pub precision: Precision,
    pub filter: FilterMode,
    /// Binding slot index, stable per field across re-creation.
    pub slot: u32,
}

impl SurfaceDesc {
    pub fn wrap(&self) -> WrapMode {
        WrapMode::ClampToEdge
    }

    pub fn texel_size(&self) -> Vec2 {
        Vec2::new(1.0 / self.width as f32, 1.0 / self.height as f32)
    }
}

/// Host-resident surface. The CPU backend renders into these directly and
/// the GPU backend reads its textures back into them.
#[derive(Debug, Clone)]
pub struct Surface {
    desc: SurfaceDesc,
    texels: Vec<f32>,
}

impl Surface {
    /// Allocates the surface cleared to zero.
    pub fn new(desc: SurfaceDesc) -> Self {
        let len = desc.width as usize * desc.height as usize * desc.channels.count();
        Self {
            desc,
            texels: vec![0.0; len],
        }
    }

    pub fn from_texels(desc: SurfaceDesc, texels: Vec<f32>) -> Self {
        assert_eq!(
            texels.len(),
            desc.width as usize * desc.height as usize * desc.channels.count(),
            "texel buffer does not match {}x{} {:?}",
            desc.width,
            desc.height,
            desc.channels
        );
        Self { desc, texels }
    }

    pub fn desc(&self) -> &SurfaceDesc {
        &self.desc
    }

    pub fn width(&self) -> usize {
        self.desc.width as usize
    }

    pub fn height(&self) -> usize {
        self.desc.height as usize
    }

    pub fn channels(&self) -> Channels {
        self.desc.channels
    }

    pub fn slot(&self) -> u32 {
        self.desc.slot
    }

    pub fn texels(&self) -> &[f32] {
        &self.texels
    }

    pub(crate) fn texels_mut(&mut self) -> &mut [f32] {
        &mut self.texels
    }

    /// Reads one texel with clamp-to-edge addressing. Channels the surface
    /// does not store read as 0, alpha as 1.
    pub fn fetch(&self, x: i32, y: i32) -> Vec4 {
        let x = x.clamp(0, self.desc.width as i32 - 1) as usize;
        let y = y.clamp(0, self.desc.height as i32 - 1) as usize;
        let stride = self.desc.channels.count();
        let i = (y * self.width() + x) * stride;
        expand(&self.texels[i..i + stride])
    }

    /// Filtered lookup at a texture-space coordinate, like `texture2D`.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let size = Vec2::new(self.desc.width as f32, self.desc.height as f32);
        match self.desc.filter {
            FilterMode::Nearest => {
                let p = (uv * size).floor();
                self.fetch(p.x as i32, p.y as i32)
            }
            FilterMode::Linear => {
                let p = uv * size - 0.5;
                let base = p.floor();
                let f = p - base;
                let (x, y) = (base.x as i32, base.y as i32);
                let a = self.fetch(x, y);
                let b = self.fetch(x + 1, y);
                let c = self.fetch(x, y + 1);
                let d = self.fetch(x + 1, y + 1);
                a.lerp(b, f.x).lerp(c.lerp(d, f.x), f.y)
            }
        }
    }

    pub fn store(&mut self, x: usize, y: usize, value: Vec4) {
        let stride = self.desc.channels.count();
        let i = (y * self.width() + x) * stride;
        write_texel(&mut self.texels[i..i + stride], value);
    }
}

pub(crate) fn expand(texel: &[f32]) -> Vec4 {
    match *texel {
        [r] => Vec4::new(r, 0.0, 0.0, 1.0),
        [r, g] => Vec4::new(r, g, 0.0, 1.0),
        [r, g, b, a] => Vec4::new(r, g, b, a),
        _ => Vec4::W,
    }
}

pub(crate) fn write_texel(texel: &mut [f32], value: Vec4) {
    let value = value.to_array();
    texel.copy_from_slice(&value[..texel.len()]);
}
