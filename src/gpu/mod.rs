//! wgpu backend: every stage program is a full-screen render pass writing
//! one texture, with one encoder and one submit per pass.

mod backend;
pub mod programs;
pub mod shaders;

pub use backend::{storage_format, GpuBackend, GpuOptions, GpuSurface, SCREEN_FORMAT};
