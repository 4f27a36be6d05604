//! Benchmarks for field sampling and the particle update pass.
//!
//! Run with: cargo bench --package wind-overlay --bench particle_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use renderer::TrailCanvas;
use test_utils::{create_sheared_payload, geometry, FakeMap};
use wind_grid::{decode_payload, Interpolator};
use wind_overlay::{particle_count, FieldSampler, ParticleSystem, VelocitySampler};

fn germany_field() -> Interpolator {
    Interpolator::new(decode_payload(&create_sheared_payload(&geometry::GERMANY)).unwrap())
}

fn bench_interpolate(c: &mut Criterion) {
    let field = germany_field();
    c.bench_function("interpolate_1000", |b| {
        b.iter(|| {
            for k in 0..1000 {
                let lat = 48.0 + (k % 60) as f64 * 0.1;
                let lon = 5.5 + (k / 60) as f64 * 0.5;
                black_box(field.interpolate(black_box(lat), black_box(lon)));
            }
        });
    });
}

fn bench_field_sampler(c: &mut Criterion) {
    let field = germany_field();
    let map = FakeMap::germany(1024, 768);
    let sampler = FieldSampler::new(&field, &map, 0.3);
    c.bench_function("field_sampler_1000", |b| {
        b.iter(|| {
            for k in 0..1000 {
                let x = (k % 40) as f64 * 25.0;
                let y = (k / 40) as f64 * 30.0;
                black_box(sampler.sample(x, y));
            }
        });
    });
}

fn bench_particle_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle_step");
    let field = germany_field();

    for (width, height) in [(800u32, 600u32), (1920, 1080), (2560, 1440)] {
        let map = FakeMap::germany(width, height);
        let sampler = FieldSampler::new(&field, &map, 0.3);
        let mut system = ParticleSystem::with_seed(0.3, 1.0 / 1500.0, 1);
        system.regenerate(width, height, &sampler);
        let mut canvas = TrailCanvas::new(width, height);

        group.throughput(Throughput::Elements(particle_count(width, height, 1.0 / 1500.0) as u64));
        group.bench_function(BenchmarkId::new("step", format!("{}x{}", width, height)), |b| {
            b.iter(|| black_box(system.step(&sampler, &mut canvas)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_interpolate, bench_field_sampler, bench_particle_step);
criterion_main!(benches);
