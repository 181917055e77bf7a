use glam::Vec2;
use smokeflow::{clamp_dt, Config, CpuBackend, FluidMetrics, PointerId, Simulation, MAX_DT};

fn small_sim(config: Config) -> Simulation<CpuBackend> {
    Simulation::new(CpuBackend::new(), config, [64, 64])
}

fn total_dye(sim: &Simulation<CpuBackend>) -> f32 {
    FluidMetrics::analyze(sim.fields(), 0).total_dye
}

#[test]
fn test_clamp_dt() {
    assert_eq!(clamp_dt(0.0), 0.0);
    assert_eq!(clamp_dt(-0.5), 0.0, "Clock going backwards never rewinds");
    assert!((clamp_dt(0.008) - 0.008).abs() < 1e-7);
    assert_eq!(clamp_dt(0.5), MAX_DT);
    assert_eq!(clamp_dt(1e9), MAX_DT);
}

#[test]
fn test_tick_time_steps() {
    let mut sim = small_sim(Config::default());
    assert_eq!(sim.tick(10.0, [64, 64]), 0.0, "First tick only starts the clock");
    assert_eq!(sim.tick(11.0, [64, 64]), MAX_DT, "Long frames are clamped");
    let dt = sim.tick(11.005, [64, 64]);
    assert!((dt - 0.005).abs() < 1e-5, "Got dt {}", dt);
    assert_eq!(sim.frame(), 3);
}

#[test]
fn test_quiescent_fields_stay_zero() {
    let mut sim = small_sim(Config::default());
    for _ in 0..5 {
        sim.step(MAX_DT);
    }
    let metrics = FluidMetrics::analyze(sim.fields(), 5);
    assert_eq!(metrics.total_dye, 0.0);
    assert_eq!(metrics.kinetic_energy, 0.0);
    assert_eq!(metrics.max_abs_pressure, 0.0);
}

#[test]
fn test_splat_drives_flow_and_dye() {
    let mut sim = small_sim(Config::default());
    sim.splat(32.0, 32.0, 100.0, 0.0, [1.0, 0.0, 0.0]);
    sim.step(MAX_DT);

    let centre = Vec2::splat(0.5);
    let velocity = sim.fields().velocity.read().sample(centre);
    let dye = sim.fields().density.read().sample(centre);
    assert!(velocity.x > 0.0, "Impulse to the right, got {:?}", velocity);
    assert!(dye.x > 0.0, "Red dye at the splat, got {:?}", dye);
    assert!(dye.y.abs() < 1e-6 && dye.z.abs() < 1e-6, "Only red was injected");
}

#[test]
fn test_dye_persists_and_fades() {
    let mut sim = small_sim(Config::default());
    sim.splat(32.0, 32.0, 0.0, 0.0, [1.0, 1.0, 1.0]);
    let injected = total_dye(&sim);
    assert!(injected > 0.0);

    for _ in 0..5 {
        sim.step(MAX_DT);
    }
    let remaining = total_dye(&sim);
    assert!(remaining > 0.5 * injected, "Dye should persist, got {}", remaining);
    assert!(remaining < injected, "Dissipation should fade dye");
}

#[test]
fn test_kinetic_energy_decays_without_vorticity() {
    let mut config = Config::default();
    config.curl = 0.0;
    let mut sim = small_sim(config);
    sim.splat(32.0, 32.0, 100.0, 0.0, [0.5, 0.5, 0.5]);

    let mut previous = f32::INFINITY;
    for frame in 0..15 {
        sim.step(MAX_DT);
        let energy = FluidMetrics::analyze(sim.fields(), frame).kinetic_energy;
        assert!(
            energy < previous,
            "Energy should fall every step, frame {}: {} >= {}",
            frame,
            energy,
            previous
        );
        previous = energy;
    }
}

#[test]
fn test_resize_recreates_fields() {
    let mut sim = Simulation::new(CpuBackend::new(), Config::default(), [800, 600]);
    sim.splat(400.0, 300.0, 0.0, 0.0, [1.0, 0.0, 0.0]);
    assert!(total_dye(&sim) > 0.0);

    assert!(sim.resize([400, 300]));
    assert_eq!(sim.resolution().width, 200);
    assert_eq!(sim.resolution().height, 150);
    assert_eq!(sim.canvas(), [400, 300]);
    assert_eq!(total_dye(&sim), 0.0, "Old contents are discarded");

    assert!(!sim.resize([400, 300]), "Same size keeps the fields");
}

#[test]
fn test_downsample_change_recreates_fields() {
    let mut sim = small_sim(Config::default());
    sim.config_mut().texture_downsample = 2;
    assert!(sim.resize([64, 64]));
    assert_eq!(sim.resolution().width, 16);
    assert_eq!(sim.fields().velocity.read().width(), 16);
}

#[test]
fn test_pointer_moves_splat_once() {
    let mut sim = small_sim(Config::default());
    sim.pointer_moved(PointerId::Mouse, 20.0, 20.0);
    assert!(sim.pointers().has_pending());

    sim.step(MAX_DT);
    assert!(!sim.pointers().has_pending(), "Splatted moves are consumed");
    let after_first = total_dye(&sim);
    assert!(after_first > 0.0);

    sim.step(MAX_DT);
    assert!(
        total_dye(&sim) < after_first,
        "Without new input the dye only fades"
    );
}

#[test]
fn test_hover_disabled_requires_press() {
    let mut config = Config::default();
    config.splat_on_hover = false;
    let mut sim = small_sim(config);

    sim.pointer_moved(PointerId::Mouse, 20.0, 20.0);
    sim.step(MAX_DT);
    assert_eq!(total_dye(&sim), 0.0);

    sim.pointer_down(PointerId::Mouse, 20.0, 20.0);
    sim.pointer_moved(PointerId::Mouse, 30.0, 20.0);
    sim.step(MAX_DT);
    assert!(total_dye(&sim) > 0.0);
}

#[test]
fn test_ambient_splats_add_dye() {
    let mut config = Config::default();
    config.ambient_splats = true;
    let mut sim = small_sim(config).with_ambient_seed(3);

    sim.tick(0.0, [64, 64]);
    sim.tick(1.0, [64, 64]);
    assert_eq!(total_dye(&sim), 0.0, "Nothing before the first interval");

    sim.tick(2.0, [64, 64]);
    assert!(total_dye(&sim) > 0.0);
}

#[test]
fn test_render_presents_canvas_sized_frame() {
    let mut sim = Simulation::new(CpuBackend::new(), Config::default(), [48, 32]);
    sim.splat(24.0, 16.0, 0.0, 0.0, [1.0, 0.0, 0.0]);
    sim.render();

    let frame = sim.backend().frame();
    assert_eq!(frame.dimensions(), (48, 32));
    assert!(frame.get_pixel(24, 16)[0] > 0, "Dye is visible at the splat");
    assert_eq!(frame.get_pixel(0, 0)[0], 0);
}

#[test]
fn test_impulse_fades_with_default_config() {
    let mut sim = small_sim(Config::default());
    sim.splat(32.0, 32.0, 100.0, 0.0, [1.0, 1.0, 1.0]);
    sim.step(MAX_DT);
    let initial = FluidMetrics::analyze(sim.fields(), 1).max_speed;
    assert!(initial > 0.0);

    for _ in 0..60 {
        sim.step(MAX_DT);
    }
    let later = FluidMetrics::analyze(sim.fields(), 61).max_speed;
    assert!(
        later < initial,
        "Flow should decay without input: {} -> {}",
        initial,
        later
    );
}
