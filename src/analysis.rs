use crate::fields::Fields;
use crate::surface::Surface;

/// Whole-field statistics for one frame, used by the headless run and tests.
#[derive(Debug, Clone)]
pub struct FluidMetrics {
    /// Sum of the dye's RGB channels over the grid.
    pub total_dye: f32,
    pub max_dye: f32,
    /// `0.5 * |v|^2` summed over the grid.
    pub kinetic_energy: f32,
    pub max_speed: f32,
    pub avg_speed: f32,
    pub mean_abs_divergence: f32,
    pub mean_abs_curl: f32,
    pub max_abs_pressure: f32,
    pub frame: usize,
}

/// The surfaces a metrics pass reads, borrowed from wherever they live.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    pub velocity: &'a Surface,
    pub density: &'a Surface,
    pub divergence: &'a Surface,
    pub curl: &'a Surface,
    pub pressure: &'a Surface,
}

impl<'a> From<&'a Fields<Surface>> for FieldView<'a> {
    fn from(fields: &'a Fields<Surface>) -> Self {
        Self {
            velocity: fields.velocity.read(),
            density: fields.density.read(),
            divergence: &fields.divergence,
            curl: &fields.curl,
            pressure: fields.pressure.read(),
        }
    }
}

impl FluidMetrics {
    pub fn analyze(fields: &Fields<Surface>, frame: usize) -> Self {
        Self::analyze_view(FieldView::from(fields), frame)
    }

    pub fn analyze_view(view: FieldView<'_>, frame: usize) -> Self {
        let mut total_dye: f32 = 0.0;
        let mut max_dye: f32 = 0.0;
        for texel in view.density.texels().chunks_exact(view.density.channels().count()) {
            let dye: f32 = texel.iter().take(3).sum();
            total_dye += dye;
            max_dye = max_dye.max(dye);
        }

        let mut kinetic_energy: f32 = 0.0;
        let mut max_speed: f32 = 0.0;
        let mut speed_sum: f32 = 0.0;
        let stride = view.velocity.channels().count();
        for texel in view.velocity.texels().chunks_exact(stride) {
            let vx = texel[0];
            let vy = texel.get(1).copied().unwrap_or(0.0);
            let speed_sq = vx * vx + vy * vy;
            kinetic_energy += 0.5 * speed_sq;
            let speed = speed_sq.sqrt();
            max_speed = max_speed.max(speed);
            speed_sum += speed;
        }

        let cells = (view.velocity.width() * view.velocity.height()).max(1) as f32;

        Self {
            total_dye,
            max_dye,
            kinetic_energy,
            max_speed,
            avg_speed: speed_sum / cells,
            mean_abs_divergence: mean_abs(view.divergence),
            mean_abs_curl: mean_abs(view.curl),
            max_abs_pressure: first_channel(view.pressure)
                .map(f32::abs)
                .fold(0.0, f32::max),
            frame,
        }
    }

    pub fn print_summary(&self) {
        println!("Frame {} Metrics:", self.frame);
        println!("  Total Dye: {:.6}", self.total_dye);
        println!("  Max Dye: {:.6}", self.max_dye);
        println!("  Kinetic Energy: {:.6}", self.kinetic_energy);
        println!("  Max Speed: {:.6}", self.max_speed);
        println!("  Avg Speed: {:.6}", self.avg_speed);
        println!("  Mean |Divergence|: {:.6}", self.mean_abs_divergence);
        println!("  Mean |Curl|: {:.6}", self.mean_abs_curl);
        println!("  Max |Pressure|: {:.6}", self.max_abs_pressure);
        println!();
    }
}

fn first_channel(surface: &Surface) -> impl Iterator<Item = f32> + '_ {
    surface
        .texels()
        .chunks_exact(surface.channels().count())
        .map(|texel| texel[0])
}

fn mean_abs(surface: &Surface) -> f32 {
    let cells = (surface.width() * surface.height()).max(1) as f32;
    first_channel(surface).map(f32::abs).sum::<f32>() / cells
}

#[derive(Debug, Default)]
pub struct AnalysisRecorder {
    pub metrics_history: Vec<FluidMetrics>,
}

impl AnalysisRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame(&mut self, fields: &Fields<Surface>, frame: usize) -> &FluidMetrics {
        self.record(FluidMetrics::analyze(fields, frame))
    }

    pub fn record(&mut self, metrics: FluidMetrics) -> &FluidMetrics {
        self.metrics_history.push(metrics);
        &self.metrics_history[self.metrics_history.len() - 1]
    }

    pub fn print_trends(&self) {
        if self.metrics_history.len() < 2 {
            return;
        }

        let first = &self.metrics_history[0];
        let last = &self.metrics_history[self.metrics_history.len() - 1];

        println!("=== TREND ANALYSIS ===");
        println!(
            "Dye change: {:.6} -> {:.6} ({:+.3}%)",
            first.total_dye,
            last.total_dye,
            (last.total_dye - first.total_dye) / first.total_dye.max(0.001) * 100.0
        );
        println!(
            "Kinetic Energy change: {:.6} -> {:.6} ({:+.3}%)",
            first.kinetic_energy,
            last.kinetic_energy,
            (last.kinetic_energy - first.kinetic_energy) / first.kinetic_energy.max(0.001) * 100.0
        );
        println!(
            "Mean |Divergence|: {:.6} -> {:.6}",
            first.mean_abs_divergence, last.mean_abs_divergence
        );
    }
}
