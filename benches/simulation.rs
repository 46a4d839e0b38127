use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use reaction_kinetics::prelude::*;

fn setup_network(enzymes: usize) -> ReactionNetwork {
    // A chain of reversible mass-action steps feeding several enzymes that
    // compete for the same substrate
    let mut builder = ReactionNetwork::builder()
        .reversible("A <-> B", ("k_ab", 1.0), ("k_ba", 0.5))
        .reversible("B <-> 2*C", ("k_bc", 0.3), ("k_cb", 0.1))
        .mass_action("C -> S", [("k_cs", 0.8)])
        .initial_concentration("A", 10.0)
        .time((0..=100).map(|i| i as f64).collect());

    for i in 0..enzymes {
        builder = builder
            .michaelis_menten(
                format!("S + E{i} -> E{i} + P{i}"),
                [(format!("Km_{i}"), 0.5 + i as f64), (format!("kcat_{i}"), 2.0)],
            )
            .initial_concentration(format!("E{i}"), 0.1);
    }

    builder.build().expect("Failed to build network")
}

fn benchmark_simulation(c: &mut Criterion) {
    let mut small = setup_network(1);
    let mut large = setup_network(20);
    let state = large.initial_concentrations().clone();

    c.bench_function("network_derivative", |b| {
        b.iter(|| black_box(large.derivative(black_box(state.view()))));
    });

    c.bench_function("network_integration", |b| {
        b.iter(|| {
            let _ = black_box(small.integrate(Some(1e-6), Some(1e-9)).map(|t| t.sum()));
        });
    });

    c.bench_function("large_network_integration", |b| {
        b.iter(|| {
            let _ = black_box(large.integrate(Some(1e-6), Some(1e-9)).map(|t| t.sum()));
        });
    });

    c.bench_function("network_integration_rk4", |b| {
        let setup = IntegrationSetup::with_tolerances(Some(1e-6), Some(1e-9));
        b.iter(|| {
            let _ = black_box(small.integrate_with(&setup, RK4::default()).map(|t| t.sum()));
        });
    });
}

criterion_group!(benches, benchmark_simulation);
criterion_main!(benches);
