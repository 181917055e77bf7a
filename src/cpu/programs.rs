//! Per-texel transfer functions of the stage programs.
//!
//! Each function sees one fragment and the surfaces bound to the program,
//! and returns the texel to write. Neighbour offsets follow the vertex stage
//! convention: `l`/`r` are one texel left/right, `t`/`b` one texel up/down.

use glam::{Vec2, Vec4, Vec4Swizzles};

use crate::stage::{AdvectionUniforms, SplatUniforms, VorticityUniforms};
use crate::surface::Surface;

#[derive(Debug, Clone, Copy)]
pub struct Fragment {
    /// Texture-space position of the texel centre.
    pub uv: Vec2,
    /// Pixel-space position, `(x + 0.5, y + 0.5)`.
    pub frag_coord: Vec2,
}

#[derive(Debug, Clone, Copy)]
struct Neighbours {
    l: Vec2,
    r: Vec2,
    t: Vec2,
    b: Vec2,
}

impl Fragment {
    fn neighbours(&self, texel_size: Vec2) -> Neighbours {
        Neighbours {
            l: self.uv - Vec2::new(texel_size.x, 0.0),
            r: self.uv + Vec2::new(texel_size.x, 0.0),
            t: self.uv + Vec2::new(0.0, texel_size.y),
            b: self.uv - Vec2::new(0.0, texel_size.y),
        }
    }
}

pub fn clear(frag: &Fragment, source: &Surface, value: f32) -> Vec4 {
    value * source.sample(frag.uv)
}

pub fn display(frag: &Fragment, source: &Surface) -> Vec4 {
    source.sample(frag.uv)
}

pub fn splat(frag: &Fragment, target: &Surface, u: &SplatUniforms) -> Vec4 {
    let mut p = frag.uv - u.point;
    p.x *= u.aspect_ratio;
    let splat = (-p.dot(p) / u.radius).exp() * u.color;
    let base = target.sample(frag.uv).xyz();
    (base + splat).extend(1.0)
}

/// Hardware-filtered advection: back-trace in texture space and let the
/// sampler interpolate.
pub fn advect(
    frag: &Fragment,
    velocity: &Surface,
    source: &Surface,
    u: &AdvectionUniforms,
) -> Vec4 {
    let coord = frag.uv - u.dt * velocity.sample(frag.uv).xy() * u.texel_size;
    u.dissipation * source.sample(coord)
}

/// Advection for nearest-filtered storage: back-trace in pixel space and
/// interpolate the four surrounding texel centres by hand.
pub fn advect_manual_filter(
    frag: &Fragment,
    velocity: &Surface,
    source: &Surface,
    u: &AdvectionUniforms,
) -> Vec4 {
    let coord = frag.frag_coord - u.dt * velocity.sample(frag.uv).xy();
    let mut out = u.dissipation * bilerp(source, coord, u.texel_size);
    out.w = 1.0;
    out
}

fn bilerp(source: &Surface, p: Vec2, texel_size: Vec2) -> Vec4 {
    let st = (p - 0.5).floor() + 0.5;
    let st1 = st + 1.0;
    let a = source.sample(st * texel_size);
    let b = source.sample(Vec2::new(st1.x, st.y) * texel_size);
    let c = source.sample(Vec2::new(st.x, st1.y) * texel_size);
    let d = source.sample(st1 * texel_size);
    let f = p - st;
    a.lerp(b, f.x).lerp(c.lerp(d, f.x), f.y)
}

/// Velocity lookup with free-slip walls: outside the unit square the
/// coordinate is clamped and the normal component flips sign.
fn sample_velocity(velocity: &Surface, mut uv: Vec2) -> Vec2 {
    let mut multiplier = Vec2::ONE;
    if uv.x < 0.0 {
        uv.x = 0.0;
        multiplier.x = -1.0;
    }
    if uv.x > 1.0 {
        uv.x = 1.0;
        multiplier.x = -1.0;
    }
    if uv.y < 0.0 {
        uv.y = 0.0;
        multiplier.y = -1.0;
    }
    if uv.y > 1.0 {
        uv.y = 1.0;
        multiplier.y = -1.0;
    }
    multiplier * velocity.sample(uv).xy()
}

pub fn divergence(frag: &Fragment, velocity: &Surface, texel_size: Vec2) -> Vec4 {
    let n = frag.neighbours(texel_size);
    let l = sample_velocity(velocity, n.l).x;
    let r = sample_velocity(velocity, n.r).x;
    let t = sample_velocity(velocity, n.t).y;
    let b = sample_velocity(velocity, n.b).y;
    let div = 0.5 * (r - l + t - b);
    Vec4::new(div, 0.0, 0.0, 1.0)
}

pub fn curl(frag: &Fragment, velocity: &Surface, texel_size: Vec2) -> Vec4 {
    let n = frag.neighbours(texel_size);
    let l = velocity.sample(n.l).y;
    let r = velocity.sample(n.r).y;
    let t = velocity.sample(n.t).x;
    let b = velocity.sample(n.b).x;
    let vorticity = r - l - t + b;
    Vec4::new(vorticity, 0.0, 0.0, 1.0)
}

/// Vorticity confinement: push along the gradient of |curl|, rotated a
/// quarter turn, scaled by the local curl.
pub fn vorticity(
    frag: &Fragment,
    velocity: &Surface,
    curl: &Surface,
    u: &VorticityUniforms,
) -> Vec4 {
    let n = frag.neighbours(u.texel_size);
    let l = curl.sample(n.l).x;
    let r = curl.sample(n.r).x;
    let t = curl.sample(n.t).x;
    let b = curl.sample(n.b).x;
    let c = curl.sample(frag.uv).x;

    let mut force = Vec2::new(t.abs() - b.abs(), l.abs() - r.abs());
    force *= 1.0 / (force + 0.00001).length() * u.curl * c;

    let vel = velocity.sample(frag.uv).xy();
    (vel + force * u.dt).extend(0.0).extend(1.0)
}

fn boundary(uv: Vec2) -> Vec2 {
    uv.clamp(Vec2::ZERO, Vec2::ONE)
}

pub fn pressure(
    frag: &Fragment,
    pressure: &Surface,
    divergence: &Surface,
    texel_size: Vec2,
) -> Vec4 {
    let n = frag.neighbours(texel_size);
    let l = pressure.sample(boundary(n.l)).x;
    let r = pressure.sample(boundary(n.r)).x;
    let t = pressure.sample(boundary(n.t)).x;
    let b = pressure.sample(boundary(n.b)).x;
    let div = divergence.sample(frag.uv).x;
    let p = (l + r + b + t - div) * 0.25;
    Vec4::new(p, 0.0, 0.0, 1.0)
}

pub fn gradient_subtract(
    frag: &Fragment,
    pressure: &Surface,
    velocity: &Surface,
    texel_size: Vec2,
) -> Vec4 {
    let n = frag.neighbours(texel_size);
    let l = pressure.sample(boundary(n.l)).x;
    let r = pressure.sample(boundary(n.r)).x;
    let t = pressure.sample(boundary(n.t)).x;
    let b = pressure.sample(boundary(n.b)).x;
    let vel = velocity.sample(frag.uv).xy() - Vec2::new(r - l, t - b);
    vel.extend(0.0).extend(1.0)
}
