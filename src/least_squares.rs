//! Damped linear least-squares refinement of an element set.
//!
//! Each outer iteration builds numerical partials of the propagated
//! positions with respect to the fit parameters (central differences),
//! accumulates one observation row per position component per sample into a
//! normal-equations workspace, solves the damped system, and applies the
//! correction. The workspace lives for exactly one iteration.
//!
//! Descent is not monotone, so the refiner pairs every element set with the
//! worst per-sample position residual measured *on that set* and only
//! replaces the outgoing answer on strict improvement. A failed solve keeps
//! the best answer so far and stops the remaining iterations.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use crate::constants::AU;
use crate::elements::{EphemerisKind, TleElements};
use crate::equinoctial::{elements_with_params, params_from_elements, partial_step, MAX_FIT_PARAMS};
use crate::tlefit_errors::TleFitError;
use crate::window::FitWindow;

/// Normal-equations accumulator for a weighted linear least-squares solve.
///
/// The damping scalar enters at solve time as an explicit argument: the
/// diagonal of AᵀA is inflated by `1 + lambda` (Levenberg–Marquardt).
pub struct NormalEquations {
    ata: DMatrix<f64>,
    atb: DVector<f64>,
}

impl NormalEquations {
    pub fn new(n_params: usize) -> Self {
        NormalEquations {
            ata: DMatrix::zeros(n_params, n_params),
            atb: DVector::zeros(n_params),
        }
    }

    /// Add one observation with the given residual, weight, and one partial
    /// derivative per parameter.
    pub fn add_observation(&mut self, residual: f64, weight: f64, partials: &[f64]) {
        let n = self.atb.len();
        debug_assert_eq!(partials.len(), n);
        for i in 0..n {
            for j in 0..n {
                self.ata[(i, j)] += weight * partials[i] * partials[j];
            }
            self.atb[i] += weight * residual * partials[i];
        }
    }

    /// Solve `(AᵀA + λ·diag(AᵀA)) Δ = Aᵀb`.
    pub fn solve(&self, lambda: f64) -> Result<DVector<f64>, TleFitError> {
        let n = self.atb.len();
        let mut damped = self.ata.clone();
        for i in 0..n {
            let diagonal = damped[(i, i)];
            if diagonal == 0. {
                return Err(TleFitError::SolveFailed);
            }
            damped[(i, i)] = diagonal * (1. + lambda);
        }
        damped
            .lu()
            .solve(&self.atb)
            .ok_or(TleFitError::SolveFailed)
    }
}

/// Knobs of the damped refinement.
#[derive(Debug, Clone, Copy)]
pub struct LeastSquaresConfig {
    /// Parameter count: 6, 7 (adds bstar) or 8 (reserved, behaves as 7).
    pub n_params: usize,
    /// Outer iterations to run.
    pub n_iterations: usize,
    /// Initial Levenberg–Marquardt damping.
    pub lambda0: f64,
    /// Iteration index from which the damping drops to zero.
    pub n_damped: usize,
}

impl Default for LeastSquaresConfig {
    fn default() -> Self {
        LeastSquaresConfig {
            n_params: 6,
            n_iterations: 15,
            lambda0: 0.,
            n_damped: 0,
        }
    }
}

/// Outcome of the refinement: the best element set over all iterations.
#[derive(Debug, Clone)]
pub struct LeastSquaresFit {
    pub tle: TleElements,
    /// Worst per-sample position residual of `tle` over the window (km).
    pub worst_residual_km: f64,
    /// Iterations actually run.
    pub iterations: usize,
    /// A solve or propagation failure cut the iterations short.
    pub failed: bool,
}

/// Refine `start` against `window`, returning the best element set of the
/// configured iterations (never the last one as such).
pub fn refine_least_squares(
    window: &FitWindow,
    start: &TleElements,
    config: &LeastSquaresConfig,
) -> LeastSquaresFit {
    let kind = start.ephemeris_kind;
    // The reserved 8th slot has nothing to perturb; high-precision sets fit
    // their six state components.
    let n_params = if kind == EphemerisKind::HighPrecision {
        config.n_params.min(6)
    } else {
        config.n_params.min(7)
    };

    let mut current = start.clone();
    let mut best: Option<(TleElements, f64)> = None;
    let mut lambda = 0.;
    let mut failed = false;
    let mut iterations = 0;

    for iter in 0..config.n_iterations {
        iterations = iter + 1;
        if iter == 0 {
            lambda = config.lambda0;
        } else if iter == config.n_damped {
            lambda = 0.;
        }

        // Workspace scoped to this iteration, released on every exit path.
        let mut normal = NormalEquations::new(n_params);
        let mut params = params_from_elements(&current, n_params);
        let mut worst_resid_sq = 0.;
        let mut resid_sq_accum = 0.;
        let mut propagation_ok = true;

        'samples: for j in 0..window.len() {
            let mut slopes = [[0.; MAX_FIT_PARAMS]; 6];
            for i in 0..n_params {
                let delta = partial_step(kind, i);
                params[i] -= delta;
                let low = window.propagate_params(&params, j);
                params[i] += delta + delta;
                let high = window.propagate_params(&params, j);
                params[i] -= delta;

                match (low, high) {
                    (Ok(low), Ok(high)) => {
                        for (k, row) in slopes.iter_mut().enumerate() {
                            row[i] = (high.component(k) - low.component(k)) / (2. * delta);
                        }
                    }
                    _ => {
                        propagation_ok = false;
                        break 'samples;
                    }
                }
            }

            let propagated = match window.propagate_params(&params, j) {
                Ok(propagated) => propagated,
                Err(_) => {
                    propagation_ok = false;
                    break 'samples;
                }
            };

            let mut resid_sq = 0.;
            for (i, row) in slopes.iter().enumerate().take(3) {
                let residual = window.states[j].component(i) - propagated.component(i);
                resid_sq += residual * residual;
                normal.add_observation(residual, 1., &row[..n_params]);
            }
            resid_sq_accum += resid_sq;
            if resid_sq > worst_resid_sq {
                worst_resid_sq = resid_sq;
            }
        }

        if !propagation_ok {
            warn!(iteration = iter, "propagation failed mid-iteration, keeping best so far");
            failed = true;
            break;
        }

        let this_worst_km = worst_resid_sq.sqrt() * AU;
        if iter == 0 || best.as_ref().map_or(true, |(_, w)| this_worst_km < *w) {
            best = Some((current.clone(), this_worst_km));
        }

        match normal.solve(lambda) {
            Ok(corrections) => {
                for (slot, correction) in params.iter_mut().zip(corrections.iter()) {
                    *slot += correction;
                }
                current = elements_with_params(&current, &params);
                debug!(
                    iteration = iter,
                    lambda,
                    worst_km = this_worst_km,
                    rms_km = (resid_sq_accum / window.len() as f64).sqrt() * AU,
                    correction_norm = corrections.norm(),
                    "least-squares step"
                );
            }
            Err(error) => {
                warn!(iteration = iter, %error, "keeping best so far");
                failed = true;
                break;
            }
        }
    }

    let (tle, worst_residual_km) =
        best.unwrap_or_else(|| (start.clone(), f64::INFINITY));
    LeastSquaresFit {
        tle,
        worst_residual_km,
        iterations,
        failed,
    }
}
