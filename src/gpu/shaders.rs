//! WGSL sources for the stage programs.
//!
//! Every program shares the full-screen triangle vertex stage and the `tex`
//! helper, which flips `uv.y` so shaders can keep a bottom-left texture
//! origin while wgpu stores row 0 at the top. Bindings: 0 is the program's
//! uniform block, then each sampled surface takes a texture at `1 + 2i` and
//! its sampler at `2 + 2i`.

use crate::stage::Program;

const COMMON: &str = r"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    let x = f32((index << 1u) & 2u);
    let y = f32(index & 2u);
    var out: VertexOutput;
    out.position = vec4<f32>(x * 2.0 - 1.0, y * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(x, y);
    return out;
}

fn tex(t: texture_2d<f32>, s: sampler, uv: vec2<f32>) -> vec4<f32> {
    return textureSampleLevel(t, s, vec2<f32>(uv.x, 1.0 - uv.y), 0.0);
}
";

const BASE_UNIFORMS: &str = r"
struct Uniforms {
    texel_size: vec2<f32>,
    _pad: vec2<f32>,
};
@group(0) @binding(0) var<uniform> u: Uniforms;
";

const CLEAR: &str = r"
struct Uniforms {
    value: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};
@group(0) @binding(0) var<uniform> u: Uniforms;
@group(0) @binding(1) var u_texture: texture_2d<f32>;
@group(0) @binding(2) var u_texture_sampler: sampler;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return u.value * tex(u_texture, u_texture_sampler, in.uv);
}
";

const DISPLAY: &str = r"
@group(0) @binding(1) var u_texture: texture_2d<f32>;
@group(0) @binding(2) var u_texture_sampler: sampler;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return tex(u_texture, u_texture_sampler, in.uv);
}
";

const SPLAT: &str = r"
struct Uniforms {
    color: vec3<f32>,
    aspect_ratio: f32,
    point: vec2<f32>,
    radius: f32,
    _pad: f32,
};
@group(0) @binding(0) var<uniform> u: Uniforms;
@group(0) @binding(1) var u_target: texture_2d<f32>;
@group(0) @binding(2) var u_target_sampler: sampler;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var p = in.uv - u.point;
    p.x = p.x * u.aspect_ratio;
    let splat = exp(-dot(p, p) / u.radius) * u.color;
    let base = tex(u_target, u_target_sampler, in.uv).xyz;
    return vec4<f32>(base + splat, 1.0);
}
";

const ADVECTION_UNIFORMS: &str = r"
struct Uniforms {
    texel_size: vec2<f32>,
    dt: f32,
    dissipation: f32,
};
@group(0) @binding(0) var<uniform> u: Uniforms;
@group(0) @binding(1) var u_velocity: texture_2d<f32>;
@group(0) @binding(2) var u_velocity_sampler: sampler;
@group(0) @binding(3) var u_source: texture_2d<f32>;
@group(0) @binding(4) var u_source_sampler: sampler;
";

const ADVECTION: &str = r"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let velocity = tex(u_velocity, u_velocity_sampler, in.uv).xy;
    let coord = in.uv - u.dt * velocity * u.texel_size;
    return u.dissipation * tex(u_source, u_source_sampler, coord);
}
";

const ADVECTION_MANUAL_FILTER: &str = r"
fn bilerp(p: vec2<f32>) -> vec4<f32> {
    let st = floor(p - 0.5) + 0.5;
    let st1 = st + 1.0;
    let a = tex(u_source, u_source_sampler, st * u.texel_size);
    let b = tex(u_source, u_source_sampler, vec2<f32>(st1.x, st.y) * u.texel_size);
    let c = tex(u_source, u_source_sampler, vec2<f32>(st.x, st1.y) * u.texel_size);
    let d = tex(u_source, u_source_sampler, st1 * u.texel_size);
    let f = p - st;
    return mix(mix(a, b, f.x), mix(c, d, f.x), f.y);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let frag = vec2<f32>(in.position.x, 1.0 / u.texel_size.y - in.position.y);
    let coord = frag - u.dt * tex(u_velocity, u_velocity_sampler, in.uv).xy;
    let result = u.dissipation * bilerp(coord);
    return vec4<f32>(result.xyz, 1.0);
}
";

const DIVERGENCE: &str = r"
@group(0) @binding(1) var u_velocity: texture_2d<f32>;
@group(0) @binding(2) var u_velocity_sampler: sampler;

fn sample_velocity(coord: vec2<f32>) -> vec2<f32> {
    var uv = coord;
    var multiplier = vec2<f32>(1.0, 1.0);
    if (uv.x < 0.0) { uv.x = 0.0; multiplier.x = -1.0; }
    if (uv.x > 1.0) { uv.x = 1.0; multiplier.x = -1.0; }
    if (uv.y < 0.0) { uv.y = 0.0; multiplier.y = -1.0; }
    if (uv.y > 1.0) { uv.y = 1.0; multiplier.y = -1.0; }
    return multiplier * tex(u_velocity, u_velocity_sampler, uv).xy;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let l = sample_velocity(in.uv - vec2<f32>(u.texel_size.x, 0.0)).x;
    let r = sample_velocity(in.uv + vec2<f32>(u.texel_size.x, 0.0)).x;
    let t = sample_velocity(in.uv + vec2<f32>(0.0, u.texel_size.y)).y;
    let b = sample_velocity(in.uv - vec2<f32>(0.0, u.texel_size.y)).y;
    let div = 0.5 * (r - l + t - b);
    return vec4<f32>(div, 0.0, 0.0, 1.0);
}
";

const CURL: &str = r"
@group(0) @binding(1) var u_velocity: texture_2d<f32>;
@group(0) @binding(2) var u_velocity_sampler: sampler;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let l = tex(u_velocity, u_velocity_sampler, in.uv - vec2<f32>(u.texel_size.x, 0.0)).y;
    let r = tex(u_velocity, u_velocity_sampler, in.uv + vec2<f32>(u.texel_size.x, 0.0)).y;
    let t = tex(u_velocity, u_velocity_sampler, in.uv + vec2<f32>(0.0, u.texel_size.y)).x;
    let b = tex(u_velocity, u_velocity_sampler, in.uv - vec2<f32>(0.0, u.texel_size.y)).x;
    let vorticity = r - l - t + b;
    return vec4<f32>(vorticity, 0.0, 0.0, 1.0);
}
";

const VORTICITY: &str = r"
struct Uniforms {
    texel_size: vec2<f32>,
    curl: f32,
    dt: f32,
};
@group(0) @binding(0) var<uniform> u: Uniforms;
@group(0) @binding(1) var u_velocity: texture_2d<f32>;
@group(0) @binding(2) var u_velocity_sampler: sampler;
@group(0) @binding(3) var u_curl: texture_2d<f32>;
@group(0) @binding(4) var u_curl_sampler: sampler;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let l = tex(u_curl, u_curl_sampler, in.uv - vec2<f32>(u.texel_size.x, 0.0)).x;
    let r = tex(u_curl, u_curl_sampler, in.uv + vec2<f32>(u.texel_size.x, 0.0)).x;
    let t = tex(u_curl, u_curl_sampler, in.uv + vec2<f32>(0.0, u.texel_size.y)).x;
    let b = tex(u_curl, u_curl_sampler, in.uv - vec2<f32>(0.0, u.texel_size.y)).x;
    let c = tex(u_curl, u_curl_sampler, in.uv).x;

    var force = vec2<f32>(abs(t) - abs(b), abs(l) - abs(r));
    force = force * (1.0 / length(force + 0.00001) * u.curl * c);

    let vel = tex(u_velocity, u_velocity_sampler, in.uv).xy;
    return vec4<f32>(vel + force * u.dt, 0.0, 1.0);
}
";

const PRESSURE: &str = r"
@group(0) @binding(1) var u_pressure: texture_2d<f32>;
@group(0) @binding(2) var u_pressure_sampler: sampler;
@group(0) @binding(3) var u_divergence: texture_2d<f32>;
@group(0) @binding(4) var u_divergence_sampler: sampler;

fn boundary(uv: vec2<f32>) -> vec2<f32> {
    return clamp(uv, vec2<f32>(0.0), vec2<f32>(1.0));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let l = tex(u_pressure, u_pressure_sampler, boundary(in.uv - vec2<f32>(u.texel_size.x, 0.0))).x;
    let r = tex(u_pressure, u_pressure_sampler, boundary(in.uv + vec2<f32>(u.texel_size.x, 0.0))).x;
    let t = tex(u_pressure, u_pressure_sampler, boundary(in.uv + vec2<f32>(0.0, u.texel_size.y))).x;
    let b = tex(u_pressure, u_pressure_sampler, boundary(in.uv - vec2<f32>(0.0, u.texel_size.y))).x;
    let div = tex(u_divergence, u_divergence_sampler, in.uv).x;
    let p = (l + r + b + t - div) * 0.25;
    return vec4<f32>(p, 0.0, 0.0, 1.0);
}
";

const GRADIENT_SUBTRACT: &str = r"
@group(0) @binding(1) var u_pressure: texture_2d<f32>;
@group(0) @binding(2) var u_pressure_sampler: sampler;
@group(0) @binding(3) var u_velocity: texture_2d<f32>;
@group(0) @binding(4) var u_velocity_sampler: sampler;

fn boundary(uv: vec2<f32>) -> vec2<f32> {
    return clamp(uv, vec2<f32>(0.0), vec2<f32>(1.0));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let l = tex(u_pressure, u_pressure_sampler, boundary(in.uv - vec2<f32>(u.texel_size.x, 0.0))).x;
    let r = tex(u_pressure, u_pressure_sampler, boundary(in.uv + vec2<f32>(u.texel_size.x, 0.0))).x;
    let t = tex(u_pressure, u_pressure_sampler, boundary(in.uv + vec2<f32>(0.0, u.texel_size.y))).x;
    let b = tex(u_pressure, u_pressure_sampler, boundary(in.uv - vec2<f32>(0.0, u.texel_size.y))).x;
    var velocity = tex(u_velocity, u_velocity_sampler, in.uv).xy;
    velocity = velocity - vec2<f32>(r - l, t - b);
    return vec4<f32>(velocity, 0.0, 1.0);
}
";

/// Complete module source for `program`.
pub fn source(program: Program) -> String {
    let parts: &[&str] = match program {
        Program::Clear => &[CLEAR],
        Program::Display => &[DISPLAY],
        Program::Splat => &[SPLAT],
        Program::Advection => &[ADVECTION_UNIFORMS, ADVECTION],
        Program::AdvectionManualFilter => &[ADVECTION_UNIFORMS, ADVECTION_MANUAL_FILTER],
        Program::Divergence => &[BASE_UNIFORMS, DIVERGENCE],
        Program::Curl => &[BASE_UNIFORMS, CURL],
        Program::Vorticity => &[VORTICITY],
        Program::Pressure => &[BASE_UNIFORMS, PRESSURE],
        Program::GradientSubtract => &[BASE_UNIFORMS, GRADIENT_SUBTRACT],
    };
    let mut source = String::from(COMMON);
    for part in parts {
        source.push_str(part);
    }
    source
}

/// Number of surfaces `program` samples.
pub fn texture_count(program: Program) -> usize {
    match program {
        Program::Clear
        | Program::Display
        | Program::Splat
        | Program::Divergence
        | Program::Curl => 1,
        Program::Advection
        | Program::AdvectionManualFilter
        | Program::Vorticity
        | Program::Pressure
        | Program::GradientSubtract => 2,
    }
}
