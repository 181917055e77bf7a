use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use smokeflow::{Backend, Config, CpuBackend, Pass, Simulation, MAX_DT};

fn seeded(canvas: [u32; 2]) -> Simulation<CpuBackend> {
    let mut sim = Simulation::new(CpuBackend::new(), Config::default(), canvas);
    let [w, h] = canvas.map(|v| v as f32);
    sim.splat(w * 0.5, h * 0.5, 200.0, -80.0, [0.8, 0.2, 0.1]);
    sim.splat(w * 0.25, h * 0.75, -120.0, 40.0, [0.1, 0.3, 0.9]);
    for _ in 0..5 {
        sim.step(MAX_DT);
    }
    sim
}

fn benchmark_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_step");
    group.sample_size(20);

    for size in [128u32, 256, 512].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut sim = seeded([size, size]);
            b.iter(|| {
                sim.step(black_box(MAX_DT));
            });
        });
    }
    group.finish();
}

fn benchmark_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("operations");
    let canvas = [256, 256];

    group.bench_function("splat", |b| {
        let mut sim = seeded(canvas);
        b.iter(|| {
            sim.splat(black_box(128.0), black_box(128.0), 50.0, 0.0, [0.1, 0.1, 0.1]);
        });
    });

    group.bench_function("pressure_iteration", |b| {
        let mut sim = seeded(canvas);
        let texel_size = sim.fields().texel_size();
        b.iter(|| {
            let (backend, fields) = sim.parts_mut();
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
        });
    });

    group.bench_function("render", |b| {
        let mut sim = seeded(canvas);
        b.iter(|| sim.render());
    });

    group.finish();
}

fn benchmark_full_scenario(c: &mut Criterion) {
    c.bench_function("full_256x256_20steps", |b| {
        b.iter(|| {
            let mut sim = Simulation::new(CpuBackend::new(), Config::default(), [256, 256]);
            sim.splat(128.0, 128.0, 100.0, 0.0, [1.0, 0.0, 0.0]);
            for _ in 0..20 {
                sim.step(MAX_DT);
            }
            black_box(sim.fields().density.read().sample(Vec2::splat(0.5)))
        });
    });
}

criterion_group!(
    benches,
    benchmark_step,
    benchmark_operations,
    benchmark_full_scenario
);
criterion_main!(benches);
