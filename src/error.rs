//! Error type shared by the solver, its backends and the front ends.

/// Everything that can go wrong outside the per-frame pipeline.
///
/// Frame passes never fail once a backend has been built; only setup,
/// configuration files, image export and GPU readback report errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),

    #[cfg(feature = "gpu")]
    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[cfg(feature = "gpu")]
    #[error("Failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[cfg(feature = "gpu")]
    #[error("program `{program}` failed to build: {message}")]
    ProgramBuild {
        program: &'static str,
        message: String,
    },

    #[cfg(feature = "gpu")]
    #[error("Buffer mapping failed: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    #[cfg(feature = "gpu")]
    #[error("readback was dropped before completion")]
    ReadbackCancelled(#[from] tokio::sync::oneshot::error::RecvError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
