//! Criterion benchmarks for beamline assembly and particle transport.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strahl_bench::fodo_lattice;
use strahl_core::BeamParameters;
use strahl_propagator::beam::GaussianGun;
use strahl_propagator::Propagator;

/// Benchmark: propagate a 256-proton Gaussian beam through 25 FODO cells.
fn bench_propagate_beam(c: &mut Criterion) {
    let params = BeamParameters::default();
    let line = fodo_lattice(&params, 25);
    let propagator = Propagator::new(&line, &params);
    let s_max = line.length();

    let beam = GaussianGun::builder(&params)
        .seed(42)
        .smear_x(0.0, 15e-6)
        .smear_y(0.0, 15e-6)
        .smear_angle_x(0.0, 30e-6)
        .smear_angle_y(0.0, 30e-6)
        .build()
        .shoot_n(256);

    c.bench_function("propagate_beam_256x25cells", |b| {
        b.iter(|| {
            let mut batch = beam.clone();
            let outcomes = propagator.propagate_all(&mut batch, s_max);
            black_box(outcomes);
        });
    });
}

/// Benchmark: assemble and sequence the 25-cell lattice from scratch.
fn bench_assemble_lattice(c: &mut Criterion) {
    let params = BeamParameters::default();
    c.bench_function("assemble_25_cells", |b| {
        b.iter(|| {
            let line = fodo_lattice(&params, 25);
            black_box(line.len());
        });
    });
}

/// Benchmark: aggregate transfer matrix of the full lattice.
fn bench_aggregate_matrix(c: &mut Criterion) {
    let params = BeamParameters::default();
    let line = fodo_lattice(&params, 25);
    c.bench_function("aggregate_matrix_25_cells", |b| {
        b.iter(|| {
            let matrix = line
                .matrix(&params, 0.0, params.particle_mass, params.particle_charge)
                .expect("well-formed lattice");
            black_box(matrix);
        });
    });
}

criterion_group!(
    benches,
    bench_propagate_beam,
    bench_assemble_lattice,
    bench_aggregate_matrix
);
criterion_main!(benches);
