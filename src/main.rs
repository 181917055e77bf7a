#[cfg(not(target_arch = "wasm32"))]
use smokeflow::{
    AnalysisRecorder, Backend, Config, CpuBackend, FluidMetrics, ImageExporter, PointerId,
    Simulation,
};
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

#[cfg(not(target_arch = "wasm32"))]
const CANVAS: [u32; 2] = [256, 256];
#[cfg(not(target_arch = "wasm32"))]
const FRAMES: usize = 60;
#[cfg(not(target_arch = "wasm32"))]
const DRAG_FRAMES: usize = 30;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = args.get(2).map(Path::new);

    match args.get(1).map(String::as_str) {
        Some("test") => run_headless_test(config_path)?,
        #[cfg(feature = "gpu")]
        Some("gpu-test") => run_gpu_test(config_path)?,
        _ => run_gui_app()?,
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => {
            println!("Loading config from {}", path.display());
            Config::load(path)?
        }
        None => Config::default(),
    })
}

/// Scripted drag: press at the left, sweep right along a shallow wave,
/// release halfway through the run.
#[cfg(not(target_arch = "wasm32"))]
fn drive_script<B: Backend>(simulation: &mut Simulation<B>, frame: usize) {
    let y_center = CANVAS[1] as f32 / 2.0;
    if frame == 0 {
        simulation.pointer_down(PointerId::Mouse, 64.0, y_center);
    }
    if frame < DRAG_FRAMES {
        let t = frame as f32 / DRAG_FRAMES as f32;
        let x = 64.0 + t * 128.0;
        let y = y_center + 20.0 * (t * std::f32::consts::TAU).sin();
        simulation.pointer_moved(PointerId::Mouse, x, y);
    }
    if frame == DRAG_FRAMES {
        simulation.pointer_up(PointerId::Mouse);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run_headless_test(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Running headless smoke simulation test with quantitative analysis...");

    let config = load_config(config_path)?;
    let mut simulation = Simulation::new(CpuBackend::new(), config, CANVAS).with_ambient_seed(7);
    let exporter = ImageExporter::new("test_output");
    exporter.prepare()?;
    let mut recorder = AnalysisRecorder::new();

    let resolution = simulation.resolution();
    println!(
        "Canvas {}x{}, grid {}x{}",
        CANVAS[0], CANVAS[1], resolution.width, resolution.height
    );

    for frame in 0..FRAMES {
        drive_script(&mut simulation, frame);
        simulation.tick(frame as f64 / 60.0, CANVAS);

        let metrics = recorder.record_frame(simulation.fields(), frame);
        if frame % 10 == 0 || frame == FRAMES - 1 {
            metrics.print_summary();

            let fields = simulation.fields();
            exporter.export_density_png(
                fields.density.read(),
                &format!("density_{:04}.png", frame),
            )?;
            exporter.export_velocity_png(
                fields.velocity.read(),
                &format!("velocity_{:04}.png", frame),
            )?;
            exporter.export_frame_png(
                simulation.backend().frame(),
                &format!("frame_{:04}.png", frame),
            )?;
        }
    }

    recorder.print_trends();

    let last = FluidMetrics::analyze(simulation.fields(), FRAMES);
    println!(
        "Test completed! {} frames, final dye {:.3}, final kinetic energy {:.3}. Images in {}",
        FRAMES,
        last.total_dye,
        last.kinetic_energy,
        exporter.output_dir().display()
    );
    Ok(())
}

#[cfg(all(feature = "gpu", not(target_arch = "wasm32")))]
fn run_gpu_test(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    use smokeflow::{FieldView, GpuBackend, GpuOptions};

    println!("Running headless smoke simulation on the GPU backend...");

    let config = load_config(config_path)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let backend = GpuBackend::new(GpuOptions::default()).await?;
        println!("Advection program: {}", backend.advection_program().label());

        let mut simulation = Simulation::new(backend, config, CANVAS).with_ambient_seed(7);
        let exporter = ImageExporter::new("gpu_test_output");
        exporter.prepare()?;
        let mut recorder = AnalysisRecorder::new();

        for frame in 0..FRAMES {
            drive_script(&mut simulation, frame);
            simulation.tick(frame as f64 / 60.0, CANVAS);

            if frame % 10 == 0 || frame == FRAMES - 1 {
                let backend = simulation.backend();
                let fields = simulation.fields();
                let velocity = backend.read_surface(fields.velocity.read()).await?;
                let density = backend.read_surface(fields.density.read()).await?;
                let divergence = backend.read_surface(&fields.divergence).await?;
                let curl = backend.read_surface(&fields.curl).await?;
                let pressure = backend.read_surface(fields.pressure.read()).await?;

                let view = FieldView {
                    velocity: &velocity,
                    density: &density,
                    divergence: &divergence,
                    curl: &curl,
                    pressure: &pressure,
                };
                recorder.record(FluidMetrics::analyze_view(view, frame)).print_summary();

                exporter.export_density_png(&density, &format!("density_{:04}.png", frame))?;
                if let Some(image) = backend.read_frame().await? {
                    exporter.export_frame_png(&image, &format!("frame_{:04}.png", frame))?;
                }
            }
        }

        recorder.print_trends();
        println!("GPU test completed! Images in {}", exporter.output_dir().display());
        Ok::<(), smokeflow::Error>(())
    })?;

    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn run_gui_app() -> Result<(), Box<dyn std::error::Error>> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 720.0])
            .with_title("smokeflow - Interactive Smoke Simulation"),
        ..Default::default()
    };

    eframe::run_native(
        "smokeflow",
        options,
        Box::new(|cc| Box::new(smokeflow::SmokeApp::new(cc))),
    )?;
    Ok(())
}
