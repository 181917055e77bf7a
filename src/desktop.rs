use eframe::egui;

use crate::config::{
    Config, CURL_RANGE, DENSITY_DISSIPATION_RANGE, PRESSURE_DISSIPATION_RANGE,
    PRESSURE_ITERATIONS_RANGE, SPLAT_RADIUS_RANGE, TEXTURE_DOWNSAMPLE_RANGE,
    VELOCITY_DISSIPATION_RANGE,
};
use crate::cpu::CpuBackend;
use crate::input::PointerId;
use crate::solver::Simulation;

/// Interactive smoke canvas with a settings panel.
pub struct SmokeApp {
    simulation: Simulation<CpuBackend>,
    texture: Option<egui::TextureHandle>,
    paused: bool,
}

impl SmokeApp {
    /// Restores the last saved configuration when persistence is available.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = cc
            .storage
            .and_then(|storage| eframe::get_value::<Config>(storage, eframe::APP_KEY))
            .unwrap_or_default();
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            simulation: Simulation::new(CpuBackend::new(), config, [1, 1]),
            texture: None,
            paused: false,
        }
    }

    fn settings_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Settings");

        let config = self.simulation.config_mut();
        ui.add(
            egui::Slider::new(&mut config.texture_downsample, TEXTURE_DOWNSAMPLE_RANGE)
                .text("Downsample"),
        );
        ui.add(
            egui::Slider::new(&mut config.density_dissipation, DENSITY_DISSIPATION_RANGE)
                .text("Density Decay"),
        );
        ui.add(
            egui::Slider::new(&mut config.velocity_dissipation, VELOCITY_DISSIPATION_RANGE)
                .text("Velocity Decay"),
        );
        ui.add(
            egui::Slider::new(&mut config.pressure_dissipation, PRESSURE_DISSIPATION_RANGE)
                .text("Pressure Decay"),
        );
        ui.add(
            egui::Slider::new(&mut config.pressure_iterations, PRESSURE_ITERATIONS_RANGE)
                .text("Pressure Iterations"),
        );
        ui.add(egui::Slider::new(&mut config.curl, CURL_RANGE).text("Vorticity"));
        ui.add(
            egui::Slider::new(&mut config.splat_radius, SPLAT_RADIUS_RANGE).text("Splat Radius"),
        );
        ui.checkbox(&mut config.splat_on_hover, "Splat on hover");
        ui.checkbox(&mut config.ambient_splats, "Ambient splats");

        ui.separator();

        ui.horizontal(|ui| {
            if ui.button(if self.paused { "Resume" } else { "Pause" }).clicked() {
                self.paused = !self.paused;
            }
            if ui.button("Reset Fields").clicked() {
                self.simulation.reset_fields();
            }
            if ui.button("Defaults").clicked() {
                *self.simulation.config_mut() = Config::default();
            }
        });

        let resolution = self.simulation.resolution();
        ui.label(format!(
            "Grid: {}x{} | Frame: {}",
            resolution.width,
            resolution.height,
            self.simulation.frame()
        ));
    }

    /// Forwards pointer and touch events over the canvas to the simulation,
    /// in canvas pixels relative to its top-left corner.
    fn forward_input(&mut self, ctx: &egui::Context, rect: egui::Rect) {
        let pixels_per_point = ctx.pixels_per_point();
        let (events, touch_active) = ctx.input(|i| (i.events.clone(), i.any_touches()));
        for event in &events {
            match pointer_command(event, rect, pixels_per_point, touch_active) {
                Some(PointerCommand::Down(id, x, y)) => self.simulation.pointer_down(id, x, y),
                Some(PointerCommand::Moved(id, x, y)) => self.simulation.pointer_moved(id, x, y),
                Some(PointerCommand::Up(id)) => self.simulation.pointer_up(id),
                None => {}
            }
        }
    }

    fn upload_frame(&mut self, ctx: &egui::Context) {
        let frame = self.simulation.backend().frame();
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [frame.width() as usize, frame.height() as usize],
            frame.as_raw(),
        );
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture("smoke", image, egui::TextureOptions::LINEAR));
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PointerCommand {
    Down(PointerId, f32, f32),
    Moved(PointerId, f32, f32),
    Up(PointerId),
}

/// Maps one egui event to a pointer command. egui mirrors touches as mouse
/// events; those are dropped while a touch is active so a finger only drives
/// its own slot.
fn pointer_command(
    event: &egui::Event,
    rect: egui::Rect,
    pixels_per_point: f32,
    touch_active: bool,
) -> Option<PointerCommand> {
    let to_canvas = |pos: egui::Pos2| {
        let local = (pos - rect.min) * pixels_per_point;
        (local.x, local.y)
    };

    match *event {
        egui::Event::PointerMoved(pos) if rect.contains(pos) && !touch_active => {
            let (x, y) = to_canvas(pos);
            Some(PointerCommand::Moved(PointerId::Mouse, x, y))
        }
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            ..
        } => {
            if !pressed {
                Some(PointerCommand::Up(PointerId::Mouse))
            } else if rect.contains(pos) && !touch_active {
                let (x, y) = to_canvas(pos);
                Some(PointerCommand::Down(PointerId::Mouse, x, y))
            } else {
                None
            }
        }
        egui::Event::Touch { id, phase, pos, .. } => {
            let pointer = PointerId::Touch(id.0);
            let (x, y) = to_canvas(pos);
            match phase {
                egui::TouchPhase::Start if rect.contains(pos) => {
                    Some(PointerCommand::Down(pointer, x, y))
                }
                egui::TouchPhase::Move if rect.contains(pos) => {
                    Some(PointerCommand::Moved(pointer, x, y))
                }
                egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                    Some(PointerCommand::Up(pointer))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

impl eframe::App for SmokeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("settings").show(ctx, |ui| {
            self.settings_panel(ui);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let (rect, _response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

                let pixels_per_point = ctx.pixels_per_point();
                let canvas = [
                    ((rect.width() * pixels_per_point) as u32).max(1),
                    ((rect.height() * pixels_per_point) as u32).max(1),
                ];

                self.forward_input(ctx, rect);

                if !self.paused {
                    let now = ctx.input(|i| i.time);
                    self.simulation.tick(now, canvas);
                    self.upload_frame(ctx);
                }

                if let Some(texture) = &self.texture {
                    ui.painter().image(
                        texture.id(),
                        rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                }
            });

        ctx.request_repaint();
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self.simulation.config());
    }
}
