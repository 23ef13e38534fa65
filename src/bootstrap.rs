//! Single-vector bootstrap: an approximate TLE from one state vector.
//!
//! Plain two-body elements computed from a state vector are usually close to
//! the mean elements of the TLE that reproduces that state, but they are not
//! equal: the SGP4/SDP4 model absorbs secular and periodic perturbations into
//! its elements. Feeding the propagation error back into the trial state and
//! recomputing elements is, in most regimes, a contraction toward an element
//! set whose propagated state at epoch matches the input.
//!
//! Convergence is not guaranteed, so the iteration keeps the best candidate
//! seen (lowest squared residual) and stops after five consecutive
//! non-improving steps. Trial states that stop describing closed orbits
//! reset to the input and shrink the correction gain.
//!
//! The result is only a good fit at its own epoch; it is the starting point
//! for the window-wide refiners, never the final answer.

use tracing::{debug, trace};

use crate::constants::{JulianDate, MINUTES_PER_DAY};
use crate::elements::TleElements;
use crate::kepler::osculating_elements;
use crate::propagator::{propagate, select_ephemeris, ModelKind};
use crate::state_vector::StateVector;
use crate::tlefit_errors::TleFitError;

const MAX_ITERATIONS: usize = 70;
const MAX_STALLED: usize = 5;
/// Cap on the squared correction accepted per step (AU-based units).
const MAX_ACCEPTED_DELTA: f64 = 0.2;

/// Outcome of the bootstrap iteration.
#[derive(Debug, Clone)]
pub struct BootstrapResult {
    /// Best element set found.
    pub tle: TleElements,
    /// Model variant in effect when the best candidate was scored.
    pub model: ModelKind,
    /// Squared propagated-minus-input residual of `tle` at epoch.
    pub delta_squared: f64,
    /// Iterations actually run.
    pub iterations: usize,
}

/// Iterate the Keplerian-to-TLE mapping against the propagator until the
/// propagated state at `epoch` reproduces `state`.
///
/// Arguments
/// ---------
/// * `state`: target geocentric state (AU, AU/day) at `epoch`.
/// * `epoch`: Julian Date (UTC) of the state; also the TLE epoch.
/// * `template`: identifiers and run tags for every candidate element set.
/// * `adjust_to_apogee`: when set, every candidate is slid along its orbit
///   so the element set sits at apogee (mean anomaly π) before scoring.
///
/// Return
/// ------
/// * The best candidate with its residual, or
///   [`TleFitError::BootstrapDiverged`] when no trial state ever produced a
///   closed orbit the propagator accepted.
pub fn bootstrap_tle(
    state: &StateVector,
    epoch: JulianDate,
    template: &TleElements,
    adjust_to_apogee: bool,
) -> Result<BootstrapResult, TleFitError> {
    let mut trial = *state;
    let mut damping = 1.;
    let mut best: Option<(TleElements, f64, ModelKind)> = None;
    let mut stalled = 0;
    let mut iterations = 0;

    while iterations < MAX_ITERATIONS && stalled < MAX_STALLED {
        iterations += 1;

        let mut candidate = match osculating_elements(&trial, epoch, template) {
            Ok(candidate) => candidate,
            Err(error) => {
                // Slow the trial state down and start over.
                trace!(iteration = iterations, %error, "candidate rejected");
                trial = *state;
                damping *= 0.9;
                continue;
            }
        };

        if adjust_to_apogee {
            let before = candidate.epoch;
            candidate.shift_to_apogee();
            debug!(
                epoch_before = before,
                epoch_after = candidate.epoch,
                "shifted candidate to apogee"
            );
        }

        // The deep-space switch only engages once the elements have settled.
        let model = if iterations < 4 {
            ModelKind::NearEarth
        } else {
            select_ephemeris(&candidate)
        };

        let t_minutes = (epoch - candidate.epoch) * MINUTES_PER_DAY;
        let propagated = match propagate(&candidate, t_minutes) {
            Ok(propagated) => propagated,
            Err(error) => {
                trace!(iteration = iterations, %error, "propagation rejected");
                trial = *state;
                damping *= 0.9;
                continue;
            }
        };

        let delta = propagated.minus(state);
        let delta_squared = delta.norm_squared();
        let scale = if delta_squared > MAX_ACCEPTED_DELTA {
            (MAX_ACCEPTED_DELTA / delta_squared).sqrt()
        } else {
            1.
        };
        trial = trial.minus(&delta.scaled(scale * damping));

        if iterations >= 4 && best.as_ref().map_or(true, |(_, d, _)| *d > delta_squared) {
            best = Some((candidate, delta_squared, model));
            stalled = 0;
        } else {
            stalled += 1;
        }

        debug!(
            iteration = iterations,
            delta_squared,
            model = model.index(),
            "bootstrap step"
        );
    }

    match best {
        Some((tle, delta_squared, model)) => Ok(BootstrapResult {
            tle,
            model,
            delta_squared,
            iterations,
        }),
        None => Err(TleFitError::BootstrapDiverged { iterations }),
    }
}

#[cfg(test)]
mod bootstrap_test {
    use super::*;
    use crate::constants::{AU, GM_EARTH};
    use crate::elements::EphemerisKind;
    use std::f64::consts::PI;

    fn template() -> TleElements {
        TleElements::template(25544, "98067A", EphemerisKind::Default)
    }

    /// Circular LEO at 500 km altitude, 51.6 degrees, two-body geometry.
    fn leo_state() -> StateVector {
        let r = (6378.137 + 500.) / AU;
        let v = (GM_EARTH / r).sqrt();
        let incl: f64 = 51.6_f64.to_radians();
        StateVector::from_components([
            r,
            0.,
            0.,
            0.,
            v * incl.cos(),
            v * incl.sin(),
        ])
    }

    #[test]
    fn test_leo_bootstrap_within_ten_km() {
        let epoch = 2_460_000.5;
        let state = leo_state();
        let result = bootstrap_tle(&state, epoch, &template(), false).unwrap();

        assert!(result.iterations <= MAX_ITERATIONS);
        assert_eq!(result.model, ModelKind::NearEarth);

        let t_minutes = (epoch - result.tle.epoch) * MINUTES_PER_DAY;
        let propagated = propagate(&result.tle, t_minutes).unwrap();
        let position_error_km = (propagated.position - state.position).norm() * AU;
        assert!(
            position_error_km < 10.,
            "bootstrap residual {position_error_km} km"
        );
    }

    #[test]
    fn test_open_orbit_diverges_cleanly() {
        // 1 AU out, moving at the Gaussian constant: not a closed geocentric
        // orbit, so every trial is rejected and the divergence path reports.
        let state = StateVector::from_components([1., 0., 0., 0., 0.017_202_09, 0.]);
        let result = bootstrap_tle(&state, 2_451_545.0, &template(), false);
        assert!(matches!(
            result,
            Err(TleFitError::BootstrapDiverged { iterations: MAX_ITERATIONS })
        ));
    }

    #[test]
    fn test_apogee_adjustment_pins_mean_anomaly() {
        let a = 6.2e-5; // slightly eccentric orbit, started off perigee
        let e = 0.1;
        let rp = a * (1. - e);
        let vp = (GM_EARTH * (1. + e) / rp).sqrt();
        let state = StateVector::from_components([rp, 0., 0., 0., vp, 0.]);

        let result = bootstrap_tle(&state, 2_460_000.5, &template(), true).unwrap();
        assert!((result.tle.mean_anomaly - PI).abs() < 1e-12);
    }
}
