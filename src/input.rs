//! Pointer tracking and the colour cycle that feeds splats.
//!
//! Event handlers only record state here; the frame driver turns pointers
//! with unconsumed movement into splats once per tick.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Pixel deltas are amplified by this factor before they become velocity.
pub const DELTA_SCALE: f32 = 5.0;
/// Hue advance per move event.
pub const HUE_STEP: f32 = 0.01;
/// Pointer dye is darkened for contrast against the black background.
pub const DYE_DARKENING: f32 = 0.5;

pub const AMBIENT_INTERVAL: f64 = 2.0;
pub const AMBIENT_DELTA: f32 = 1000.0;
pub const AMBIENT_DIMMING: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

/// One contact, in canvas pixels with the origin at the top left.
#[derive(Debug, Clone, PartialEq)]
pub struct Pointer {
    pub id: PointerId,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub down: bool,
    /// Movement recorded since the driver last splatted this pointer.
    pub moved: bool,
    pub color: [f32; 3],
}

impl Pointer {
    fn new(id: PointerId, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            dx: 0.0,
            dy: 0.0,
            down: false,
            moved: false,
            color: [0.0; 3],
        }
    }
}

/// Session-long pointer slots. A slot is created on first contact and never
/// removed, so indices stay stable.
#[derive(Debug, Clone, Default)]
pub struct Pointers {
    slots: Vec<Pointer>,
}

impl Pointers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: PointerId) -> Option<&Pointer> {
        self.slots.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pointer> {
        self.slots.iter()
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Pointer] {
        &mut self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn has_pending(&self) -> bool {
        self.slots.iter().any(|p| p.moved)
    }

    fn slot(&mut self, id: PointerId, x: f32, y: f32) -> &mut Pointer {
        let index = match self.slots.iter().position(|p| p.id == id) {
            Some(index) => index,
            None => {
                self.slots.push(Pointer::new(id, x, y));
                self.slots.len() - 1
            }
        };
        &mut self.slots[index]
    }
}

/// Converts raw pointer events into pointer state.
#[derive(Debug, Clone, Default)]
pub struct InputInjector {
    hue: f32,
}

impl InputInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    /// Records a move to `(x, y)`. With `splat_on_hover` every move is
    /// marked for splatting, otherwise only moves made while held down.
    pub fn pointer_moved(
        &mut self,
        pointers: &mut Pointers,
        id: PointerId,
        x: f32,
        y: f32,
        splat_on_hover: bool,
    ) {
        self.hue += HUE_STEP;
        if self.hue > 1.0 {
            self.hue = 0.0;
        }
        let color = dye_color(self.hue);

        let pointer = pointers.slot(id, x, y);
        pointer.moved = splat_on_hover || pointer.down;
        pointer.dx = (x - pointer.x) * DELTA_SCALE;
        pointer.dy = (y - pointer.y) * DELTA_SCALE;
        pointer.x = x;
        pointer.y = y;
        pointer.color = color;
    }

    pub fn pointer_down(&mut self, pointers: &mut Pointers, id: PointerId, x: f32, y: f32) {
        let color = dye_color(self.hue);
        let pointer = pointers.slot(id, x, y);
        pointer.down = true;
        pointer.x = x;
        pointer.y = y;
        pointer.dx = 0.0;
        pointer.dy = 0.0;
        pointer.color = color;
    }

    /// Unknown ids are ignored; lifting a pointer never creates one.
    pub fn pointer_up(&mut self, pointers: &mut Pointers, id: PointerId) {
        if let Some(pointer) = pointers.slots.iter_mut().find(|p| p.id == id) {
            pointer.down = false;
        }
    }
}

/// HSL to RGB with every component in `[0, 1]`.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s == 0.0 {
        return [l, l, l];
    }

    fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    ]
}

/// Fully saturated mid-lightness hue, darkened for display.
pub fn dye_color(hue: f32) -> [f32; 3] {
    hsl_to_rgb(hue, 1.0, 0.5).map(|c| c * DYE_DARKENING)
}

/// A splat request in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplatEvent {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub color: [f32; 3],
}

/// Drops a faint random splat every [`AMBIENT_INTERVAL`] seconds of host
/// time so an idle canvas keeps drifting.
#[derive(Debug, Clone)]
pub struct AmbientSplatter {
    rng: StdRng,
    next_at: Option<f64>,
}

impl AmbientSplatter {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic sequence, for tests and headless runs.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self { rng, next_at: None }
    }

    /// Returns a splat when an interval has elapsed since the last one. The
    /// first call only arms the timer. After a long gap at most one splat
    /// fires and the cadence restarts from `now`.
    pub fn poll(&mut self, now: f64, canvas: [u32; 2]) -> Option<SplatEvent> {
        match self.next_at {
            None => {
                self.next_at = Some(now + AMBIENT_INTERVAL);
                None
            }
            Some(due) if now >= due => {
                self.next_at = Some(if now - due >= AMBIENT_INTERVAL {
                    now + AMBIENT_INTERVAL
                } else {
                    due + AMBIENT_INTERVAL
                });
                Some(self.random_splat(canvas))
            }
            Some(_) => None,
        }
    }

    /// Forgets the schedule, e.g. after the feature was switched off.
    pub fn disarm(&mut self) {
        self.next_at = None;
    }

    fn random_splat(&mut self, canvas: [u32; 2]) -> SplatEvent {
        let color = dye_color(self.rng.gen::<f32>()).map(|c| c * AMBIENT_DIMMING);
        SplatEvent {
            x: canvas[0] as f32 * self.rng.gen::<f32>(),
            y: canvas[1] as f32 * self.rng.gen::<f32>(),
            dx: AMBIENT_DELTA * (self.rng.gen::<f32>() - 0.5),
            dy: AMBIENT_DELTA * (self.rng.gen::<f32>() - 0.5),
            color,
        }
    }
}

impl Default for AmbientSplatter {
    fn default() -> Self {
        Self::new()
    }
}
