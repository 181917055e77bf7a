//! The frame driver: one fixed-order pass sequence per display tick.

use glam::{Vec2, Vec3};

use crate::config::Config;
use crate::fields::{Fields, GridResolution};
use crate::input::{AmbientSplatter, InputInjector, PointerId, Pointers, SplatEvent};
use crate::stage::{AdvectionUniforms, Backend, Pass, SplatUniforms, VorticityUniforms};

/// Upper bound on the time step, in seconds.
pub const MAX_DT: f32 = 0.0166;

/// Time step for an elapsed wall-clock interval. Long gaps (a backgrounded
/// window, a debugger pause) are absorbed here instead of destabilising the
/// solver; a clock that runs backwards yields a zero step.
pub fn clamp_dt(elapsed: f64) -> f32 {
    (elapsed.max(0.0) as f32).min(MAX_DT)
}

/// Simulation context: owns the backend, every field, the configuration and
/// the pointer slots. Front ends hold this and feed it events and ticks.
pub struct Simulation<B: Backend> {
    backend: B,
    config: Config,
    fields: Fields<B::Surface>,
    canvas: [u32; 2],
    pointers: Pointers,
    injector: InputInjector,
    ambient: AmbientSplatter,
    last_tick: Option<f64>,
    frame: u64,
}

impl<B: Backend> Simulation<B> {
    /// `canvas` is the drawing buffer size in pixels, `[width, height]`.
    pub fn new(mut backend: B, config: Config, canvas: [u32; 2]) -> Self {
        let resolution = grid_resolution(canvas, &config);
        let fields = Fields::new(&mut backend, resolution);
        log::info!(
            "fields initialised at {}x{} for a {}x{} canvas",
            resolution.width,
            resolution.height,
            canvas[0],
            canvas[1]
        );

        Self {
            backend,
            config,
            fields,
            canvas,
            pointers: Pointers::new(),
            injector: InputInjector::new(),
            ambient: AmbientSplatter::new(),
            last_tick: None,
            frame: 0,
        }
    }

    /// Replaces the ambient splat generator with a seeded one.
    pub fn with_ambient_seed(mut self, seed: u64) -> Self {
        self.ambient = AmbientSplatter::with_seed(seed);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Live configuration; edits take effect on the next tick.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn fields(&self) -> &Fields<B::Surface> {
        &self.fields
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Backend and fields together, for driving individual passes by hand.
    pub fn parts_mut(&mut self) -> (&mut B, &mut Fields<B::Surface>) {
        (&mut self.backend, &mut self.fields)
    }

    pub fn canvas(&self) -> [u32; 2] {
        self.canvas
    }

    pub fn resolution(&self) -> GridResolution {
        self.fields.resolution()
    }

    pub fn pointers(&self) -> &Pointers {
        &self.pointers
    }

    /// Number of solver steps run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Runs one animation tick at host time `now` (seconds): time step,
    /// resize check, ambient splat, solver step and display. Returns the
    /// time step used. The first tick only starts the clock and steps with
    /// `dt = 0`.
    pub fn tick(&mut self, now: f64, canvas: [u32; 2]) -> f32 {
        let dt = match self.last_tick {
            Some(last) => clamp_dt(now - last),
            None => 0.0,
        };
        self.last_tick = Some(now);

        self.resize(canvas);

        if self.config.ambient_splats {
            if let Some(event) = self.ambient.poll(now, self.canvas) {
                log::debug!("ambient splat at ({:.0}, {:.0})", event.x, event.y);
                self.splat_event(event);
            }
        } else {
            self.ambient.disarm();
        }

        self.step(dt);
        self.render();
        dt
    }

    /// Recreates every field when the canvas size or the derived grid
    /// resolution changed. Old contents are discarded. Returns whether the
    /// fields were recreated.
    pub fn resize(&mut self, canvas: [u32; 2]) -> bool {
        let resolution = grid_resolution(canvas, &self.config);
        if canvas == self.canvas && resolution == self.fields.resolution() {
            return false;
        }
        self.canvas = canvas;
        self.reinitialize(resolution);
        true
    }

    /// Zeroes every field at the current resolution.
    pub fn reset_fields(&mut self) {
        let resolution = grid_resolution(self.canvas, &self.config);
        self.reinitialize(resolution);
    }

    fn reinitialize(&mut self, resolution: GridResolution) {
        self.fields = Fields::new(&mut self.backend, resolution);
        log::info!(
            "fields reinitialised at {}x{} for a {}x{} canvas",
            resolution.width,
            resolution.height,
            self.canvas[0],
            self.canvas[1]
        );
    }

    /// One solver step with time step `dt`, without display.
    pub fn step(&mut self, dt: f32) {
        let Self {
            backend,
            config,
            fields,
            canvas,
            pointers,
            frame,
            ..
        } = self;
        let texel_size = fields.texel_size();

        let (velocity, target) = fields.velocity.split_mut();
        backend.draw(
            Pass::Advect {
                velocity,
                source: velocity,
                uniforms: AdvectionUniforms {
                    texel_size,
                    dt,
                    dissipation: config.velocity_dissipation,
                },
            },
            target,
        );
        fields.velocity.swap();

        let (density, target) = fields.density.split_mut();
        backend.draw(
            Pass::Advect {
                velocity: fields.velocity.read(),
                source: density,
                uniforms: AdvectionUniforms {
                    texel_size,
                    dt,
                    dissipation: config.density_dissipation,
                },
            },
            target,
        );
        fields.density.swap();

        for pointer in pointers.slots_mut().iter_mut().rev() {
            if pointer.moved {
                let event = SplatEvent {
                    x: pointer.x,
                    y: pointer.y,
                    dx: pointer.dx,
                    dy: pointer.dy,
                    color: pointer.color,
                };
                apply_splat(backend, fields, *canvas, config.splat_radius, &event);
                pointer.moved = false;
            }
        }

        backend.draw(
            Pass::Curl {
                velocity: fields.velocity.read(),
                texel_size,
            },
            &mut fields.curl,
        );

        let (velocity, target) = fields.velocity.split_mut();
        backend.draw(
            Pass::Vorticity {
                velocity,
                curl: &fields.curl,
                uniforms: VorticityUniforms {
                    texel_size,
                    curl: config.curl,
                    dt,
                },
            },
            target,
        );
        fields.velocity.swap();

        backend.draw(
            Pass::Divergence {
                velocity: fields.velocity.read(),
                texel_size,
            },
            &mut fields.divergence,
        );

        let (pressure, target) = fields.pressure.split_mut();
        backend.draw(
            Pass::Clear {
                source: pressure,
                value: config.pressure_dissipation,
            },
            target,
        );
        fields.pressure.swap();

        for _ in 0..config.pressure_iterations {
            let (pressure, target) = fields.pressure.split_mut();
            backend.draw(
                Pass::Pressure {
                    pressure,
                    divergence: &fields.divergence,
                    texel_size,
                },
                target,
            );
            fields.pressure.swap();
        }

        let (velocity, target) = fields.velocity.split_mut();
        backend.draw(
            Pass::GradientSubtract {
                pressure: fields.pressure.read(),
                velocity,
                texel_size,
            },
            target,
        );
        fields.velocity.swap();

        *frame += 1;
    }

    /// Draws the density field onto the visible surface at canvas size.
    pub fn render(&mut self) {
        self.backend.present(self.fields.density.read(), self.canvas);
    }

    /// Adds a velocity impulse `(dx, -dy)` and dye `color` at canvas pixel
    /// `(x, y)` (origin top left).
    pub fn splat(&mut self, x: f32, y: f32, dx: f32, dy: f32, color: [f32; 3]) {
        self.splat_event(SplatEvent { x, y, dx, dy, color });
    }

    fn splat_event(&mut self, event: SplatEvent) {
        apply_splat(
            &mut self.backend,
            &mut self.fields,
            self.canvas,
            self.config.splat_radius,
            &event,
        );
    }

    pub fn pointer_moved(&mut self, id: PointerId, x: f32, y: f32) {
        let hover = self.config.splat_on_hover;
        self.injector.pointer_moved(&mut self.pointers, id, x, y, hover);
    }

    pub fn pointer_down(&mut self, id: PointerId, x: f32, y: f32) {
        self.injector.pointer_down(&mut self.pointers, id, x, y);
    }

    pub fn pointer_up(&mut self, id: PointerId) {
        self.injector.pointer_up(&mut self.pointers, id);
    }
}

fn grid_resolution(canvas: [u32; 2], config: &Config) -> GridResolution {
    GridResolution::from_drawing_buffer(canvas[0], canvas[1], config.texture_downsample)
}

fn apply_splat<B: Backend>(
    backend: &mut B,
    fields: &mut Fields<B::Surface>,
    canvas: [u32; 2],
    splat_radius: f32,
    event: &SplatEvent,
) {
    let width = canvas[0].max(1) as f32;
    let height = canvas[1].max(1) as f32;
    let point = Vec2::new(event.x / width, 1.0 - event.y / height);
    let aspect_ratio = width / height;
    let radius = splat_radius / 100.0;

    let (base, target) = fields.velocity.split_mut();
    backend.draw(
        Pass::Splat {
            target: base,
            uniforms: SplatUniforms {
                aspect_ratio,
                point,
                color: Vec3::new(event.dx, -event.dy, 1.0),
                radius,
            },
        },
        target,
    );
    fields.velocity.swap();

    let (base, target) = fields.density.split_mut();
    backend.draw(
        Pass::Splat {
            target: base,
            uniforms: SplatUniforms {
                aspect_ratio,
                point,
                color: Vec3::from(event.color),
                radius,
            },
        },
        target,
    );
    fields.density.swap();
}
