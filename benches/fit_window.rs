use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tlefit::constants::MINUTES_PER_DAY;
use tlefit::least_squares::{refine_least_squares, LeastSquaresConfig};
use tlefit::simplex::simplex_search;
use tlefit::window::FitWindow;
use tlefit::{propagate, EphemerisKind, EquinoctialParams, StateVector, TleElements};

fn iss_truth() -> TleElements {
    let mut tle = TleElements::template(25544, "98067A", EphemerisKind::Default);
    tle.epoch = 2_460_000.5;
    tle.inclination = 51.6_f64.to_radians();
    tle.raan = 1.2;
    tle.eccentricity = 0.0007;
    tle.arg_perigee = 2.3;
    tle.mean_anomaly = 4.1;
    tle.mean_motion = 0.0675;
    tle
}

fn synthesize_window(truth: &TleElements, n: usize, step_days: f64) -> Vec<StateVector> {
    (0..n)
        .map(|j| {
            let minutes = (j as i64 - (n / 2) as i64) as f64 * step_days * MINUTES_PER_DAY;
            propagate(truth, minutes).expect("synthesis propagation")
        })
        .collect()
}

fn bench_simplex(c: &mut Criterion) {
    let truth = iss_truth();
    let states = synthesize_window(&truth, 10, 0.01);
    let window = FitWindow {
        template: &truth,
        states: &states,
        step_minutes: 0.01 * MINUTES_PER_DAY,
    };
    let mut start = EquinoctialParams::from(&truth).to_array();
    start[0] += 0.02;
    start[4] -= 0.01;

    c.bench_function("simplex_search_iss_window", |b| {
        b.iter(|| simplex_search(black_box(&window), black_box(&start)))
    });
}

fn bench_least_squares(c: &mut Criterion) {
    let truth = iss_truth();
    let states = synthesize_window(&truth, 10, 0.01);
    let window = FitWindow {
        template: &truth,
        states: &states,
        step_minutes: 0.01 * MINUTES_PER_DAY,
    };
    let mut start = truth.clone();
    start.mean_anomaly += 2e-4;
    let config = LeastSquaresConfig::default();

    c.bench_function("least_squares_iss_window", |b| {
        b.iter(|| refine_least_squares(black_box(&window), black_box(&start), black_box(&config)))
    });
}

criterion_group!(benches, bench_simplex, bench_least_squares);
criterion_main!(benches);
