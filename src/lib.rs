//! Core smoke simulation library for smokeflow

pub mod analysis;
pub mod config;
pub mod cpu;
pub mod desktop;
pub mod error;
pub mod export;
pub mod fields;
pub mod input;
pub mod ping_pong;
pub mod render;
pub mod solver;
pub mod stage;
pub mod surface;

#[cfg(feature = "gpu")]
pub mod gpu;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use analysis::{AnalysisRecorder, FieldView, FluidMetrics};
pub use config::Config;
pub use cpu::CpuBackend;
pub use desktop::SmokeApp;
pub use error::{Error, Result};
pub use export::ImageExporter;
pub use fields::{FieldKind, Fields, GridResolution};
pub use input::{hsl_to_rgb, AmbientSplatter, InputInjector, Pointer, PointerId, Pointers};
pub use ping_pong::PingPong;
pub use render::Renderer;
pub use solver::{clamp_dt, Simulation, MAX_DT};
pub use stage::{Backend, Pass, Program};
pub use surface::{Capabilities, Channels, FilterMode, Precision, Surface, SurfaceDesc};

#[cfg(feature = "gpu")]
pub use gpu::{GpuBackend, GpuOptions, GpuSurface};
