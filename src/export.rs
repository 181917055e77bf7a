use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::render::Renderer;
use crate::surface::Surface;

/// Writes surfaces as PNG files into one output directory.
pub struct ImageExporter {
    output_dir: PathBuf,
}

impl ImageExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Creates the output directory if needed.
    pub fn prepare(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    pub fn export_density_png(&self, density: &Surface, name: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(name);
        Renderer::render_density(density).save(&path)?;
        Ok(path)
    }

    pub fn export_velocity_png(&self, velocity: &Surface, name: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(name);
        Renderer::render_velocity(velocity).save(&path)?;
        Ok(path)
    }

    /// Saves an already presented frame.
    pub fn export_frame_png(&self, frame: &image::RgbaImage, name: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(name);
        frame.save(&path)?;
        Ok(path)
    }
}
