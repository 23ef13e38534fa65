use std::f64::consts::PI;

use tlefit::constants::{AU, DPI, MINUTES_PER_DAY};
use tlefit::least_squares::{refine_least_squares, LeastSquaresConfig};
use tlefit::simplex::simplex_search;
use tlefit::window::FitWindow;
use tlefit::{
    bootstrap_tle, propagate, select_ephemeris, EphemerisKind, EquinoctialParams, ModelKind,
    StateVector, TleElements, TleFitError,
};

#[inline]
fn angle_abs_diff(a: f64, b: f64) -> f64 {
    let mut d = (a - b) % DPI;
    if d > PI {
        d -= DPI;
    }
    if d < -PI {
        d += DPI;
    }
    d.abs()
}

fn assert_elements_approx_eq(got: &TleElements, exp: &TleElements, eps: f64) {
    assert!(
        (got.eccentricity - exp.eccentricity).abs() <= eps,
        "eccentricity: {} vs {}",
        got.eccentricity,
        exp.eccentricity
    );
    assert!(
        (got.inclination - exp.inclination).abs() <= eps,
        "inclination: {} vs {}",
        got.inclination,
        exp.inclination
    );
    assert!(
        (got.mean_motion - exp.mean_motion).abs() <= eps,
        "mean motion: {} vs {}",
        got.mean_motion,
        exp.mean_motion
    );
    for (name, g, e) in [
        ("raan", got.raan, exp.raan),
        ("arg_perigee", got.arg_perigee, exp.arg_perigee),
        ("mean_anomaly", got.mean_anomaly, exp.mean_anomaly),
    ] {
        let diff = angle_abs_diff(g, e);
        assert!(diff <= eps, "{name}: |Δ| = {diff:.3e} (got={g}, exp={e})");
    }
}

fn element_set(
    incl_deg: f64,
    ecc: f64,
    mean_motion_rad_min: f64,
) -> TleElements {
    let mut tle = TleElements::template(25544, "98067A", EphemerisKind::Default);
    tle.epoch = 2_460_000.5;
    tle.inclination = incl_deg.to_radians();
    tle.raan = 1.2;
    tle.eccentricity = ecc;
    tle.arg_perigee = 2.3;
    tle.mean_anomaly = 4.1;
    tle.mean_motion = mean_motion_rad_min;
    tle
}

/// ISS-like orbit: 51.6 degrees, ~400 km circular.
fn iss_truth() -> TleElements {
    element_set(51.6, 0.0007, 0.0675)
}

/// GTO: perigee near 200 km, apogee near geostationary altitude.
fn gto_truth() -> TleElements {
    // a ~ 24371 km, e ~ 0.73, period ~ 631 min.
    element_set(27.0, 0.7301, DPI / 631.0)
}

/// Geostationary-altitude orbit: one revolution per sidereal day.
fn geo_truth() -> TleElements {
    element_set(3.0, 0.0002, DPI / 1436.0)
}

fn synthesize_window(truth: &TleElements, n: usize, step_days: f64) -> Vec<StateVector> {
    (0..n)
        .map(|j| {
            let minutes = (j as i64 - (n / 2) as i64) as f64 * step_days * MINUTES_PER_DAY;
            propagate(truth, minutes).expect("synthesis propagation")
        })
        .collect()
}

/// Runs bootstrap + simplex + least squares on a synthesized window and
/// returns (fitted TLE, worst residual km, bootstrap score, simplex score).
fn run_pipeline(
    truth: &TleElements,
    n: usize,
    step_days: f64,
    n_iterations: usize,
) -> (TleElements, f64, f64, f64) {
    let states = synthesize_window(truth, n, step_days);
    let center = n / 2;
    let boot = bootstrap_tle(&states[center], truth.epoch, truth, false).expect("bootstrap");

    let window = FitWindow {
        template: &boot.tle,
        states: &states,
        step_minutes: step_days * MINUTES_PER_DAY,
    };
    let start = EquinoctialParams::from(&boot.tle).to_array();
    let boot_score = window.sum_squared_residuals(&start);
    let refined = simplex_search(&window, &start);
    let simplex_score = window.sum_squared_residuals(&refined);
    let tle1 = EquinoctialParams::from_array(&refined).to_elements(&boot.tle);

    let config = LeastSquaresConfig {
        n_iterations,
        ..Default::default()
    };
    let fit = refine_least_squares(&window, &tle1, &config);
    assert!(!fit.failed);
    (fit.tle, fit.worst_residual_km, boot_score, simplex_score)
}

#[test]
fn iss_window_fits_below_one_km() {
    let (tle, worst_km, boot_score, simplex_score) = run_pipeline(&iss_truth(), 10, 0.01, 15);
    assert!(worst_km < 1., "worst residual {worst_km} km");
    assert!(simplex_score <= boot_score);
    assert_eq!(select_ephemeris(&tle), ModelKind::NearEarth);
}

#[test]
fn gto_window_fits_below_five_km() {
    let (_tle, worst_km, boot_score, simplex_score) = run_pipeline(&gto_truth(), 10, 0.001, 15);
    assert!(worst_km < 5., "worst residual {worst_km} km");
    assert!(simplex_score <= boot_score);
}

#[test]
fn geo_window_takes_deep_space_path_and_fits() {
    let truth = geo_truth();
    assert_eq!(select_ephemeris(&truth), ModelKind::DeepSpace);
    assert_eq!(select_ephemeris(&truth).index(), 1);

    let (tle, worst_km, _, _) = run_pipeline(&truth, 10, 0.01, 15);
    assert!(worst_km < 10., "worst residual {worst_km} km");
    assert_eq!(select_ephemeris(&tle), ModelKind::DeepSpace);
}

#[test]
fn least_squares_never_regresses_on_bootstrap() {
    // Worst position residual of a raw bootstrap TLE across the window,
    // then after refinement: the refiner may not do worse.
    let truth = iss_truth();
    let states = synthesize_window(&truth, 10, 0.01);
    let boot = bootstrap_tle(&states[10 / 2], truth.epoch, &truth, false).unwrap();

    let window = FitWindow {
        template: &boot.tle,
        states: &states,
        step_minutes: 0.01 * MINUTES_PER_DAY,
    };
    let boot_params = EquinoctialParams::from(&boot.tle).to_array();
    let boot_worst_km = (0..10)
        .map(|j| {
            let p = window.propagate_params(&boot_params, j).unwrap();
            (p.position - states[j].position).norm_squared()
        })
        .fold(0., f64::max)
        .sqrt()
        * AU;

    let fit = refine_least_squares(&window, &boot.tle, &LeastSquaresConfig::default());
    assert!(
        fit.worst_residual_km <= boot_worst_km,
        "{} km vs bootstrap {} km",
        fit.worst_residual_km,
        boot_worst_km
    );
}

#[test]
fn bootstrap_diverges_cleanly_on_heliocentric_state() {
    // 1 AU out at the Gaussian-constant speed: not a closed geocentric
    // orbit, so the bootstrap must terminate through the divergence path.
    let state = StateVector::from_components([1., 0., 0., 0., 0.017_202_09, 0.]);
    let template = TleElements::template(99999, "00000", EphemerisKind::Default);
    let result = bootstrap_tle(&state, 2_451_545.0, &template, false);
    assert!(matches!(result, Err(TleFitError::BootstrapDiverged { .. })));
}

#[test]
fn converged_fit_is_locally_unique() {
    // Perturb a converged parameter vector by 1e-6 in each coordinate
    // independently; re-running the refiner must come back to the same
    // element set.
    let truth = iss_truth();
    let states = synthesize_window(&truth, 10, 0.01);
    let window = FitWindow {
        template: &truth,
        states: &states,
        step_minutes: 0.01 * MINUTES_PER_DAY,
    };

    let converged = refine_least_squares(&window, &truth, &LeastSquaresConfig::default()).tle;
    let reference_params = EquinoctialParams::from(&converged).to_array();

    for coordinate in 0..6 {
        let mut perturbed = reference_params;
        perturbed[coordinate] += 1e-6;
        let start = EquinoctialParams::from_array(&perturbed).to_elements(&converged);
        let refit = refine_least_squares(&window, &start, &LeastSquaresConfig::default());
        assert!(!refit.failed);
        assert_elements_approx_eq(&refit.tle, &converged, 1e-8);
    }
}
