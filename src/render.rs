use image::{ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};

use crate::surface::Surface;

/// Turns host surfaces into images. Surfaces store the bottom row first,
/// images the top row first, so every conversion flips vertically.
pub struct Renderer;

impl Renderer {
    /// Channel values clamped to `[0, 1]` and scaled to bytes. Missing
    /// channels follow the sampling rules: 0 for colour, 1 for alpha.
    pub fn to_rgba_image(surface: &Surface) -> RgbaImage {
        let width = surface.width() as u32;
        let height = surface.height() as u32;
        ImageBuffer::from_fn(width, height, |x, y| {
            let texel = surface.fetch(x as i32, (height - 1 - y) as i32);
            let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u8;
            Rgba([
                to_byte(texel.x),
                to_byte(texel.y),
                to_byte(texel.z),
                to_byte(texel.w),
            ])
        })
    }

    /// Dye colour without alpha, for previews and PNG export.
    pub fn render_density(surface: &Surface) -> RgbImage {
        let width = surface.width() as u32;
        let height = surface.height() as u32;
        ImageBuffer::from_fn(width, height, |x, y| {
            let texel = surface.fetch(x as i32, (height - 1 - y) as i32);
            let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u8;
            Rgb([to_byte(texel.x), to_byte(texel.y), to_byte(texel.z)])
        })
    }

    /// Maps |vx| to red and |vy| to green, normalised by the fastest texel.
    pub fn render_velocity(surface: &Surface) -> RgbImage {
        let width = surface.width() as u32;
        let height = surface.height() as u32;

        let max_speed = surface
            .texels()
            .chunks_exact(surface.channels().count())
            .map(|t| t.iter().take(2).map(|v| v.abs()).fold(0.0f32, f32::max))
            .fold(0.0f32, f32::max)
            .max(1e-6);

        ImageBuffer::from_fn(width, height, |x, y| {
            let texel = surface.fetch(x as i32, (height - 1 - y) as i32);
            let r = ((texel.x.abs() / max_speed) * 255.0).min(255.0) as u8;
            let g = ((texel.y.abs() / max_speed) * 255.0).min(255.0) as u8;
            Rgb([r, g, 128])
        })
    }
}
