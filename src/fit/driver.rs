//! The fit driver: window slicing, frame and time-scale ingress, and the
//! bootstrap → simplex → least-squares orchestration.
//!
//! Windows are processed strictly in order and share nothing but the
//! driver-owned running statistics; a failure inside one window (bootstrap
//! divergence, singular solve) is confined to that window's report.

use tracing::{debug, warn};

use crate::bootstrap::bootstrap_tle;
use crate::constants::{Kilometer, MINUTES_PER_DAY, MJD};
use crate::elements::TleElements;
use crate::ephemeris::EphemerisFile;
use crate::equinoctial::{elements_with_params, EquinoctialParams};
use crate::least_squares::{refine_least_squares, LeastSquaresConfig};
use crate::propagator::{select_ephemeris, ModelKind};
use crate::ref_frames::{precess_state, precession_from_j2000};
use crate::simplex::simplex_search;
use crate::state_vector::StateVector;
use crate::time::{jd_to_mjd, utc_from_tdt};
use crate::window::FitWindow;

use super::FitParams;

/// Histogram thresholds for the worst per-window residual (km).
pub const HISTOGRAM_EDGES_KM: [f64; 10] =
    [1., 3., 10., 30., 100., 300., 1000., 3000., 10_000., 30_000.];

/// Log-spaced histogram of worst residuals; the last bin catches everything
/// beyond the largest threshold.
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    pub counts: [u32; HISTOGRAM_EDGES_KM.len() + 1],
}

impl Histogram {
    pub fn record(&mut self, worst_residual_km: Kilometer) {
        let mut bin = 0;
        while bin < HISTOGRAM_EDGES_KM.len() && worst_residual_km > HISTOGRAM_EDGES_KM[bin] {
            bin += 1;
        }
        self.counts[bin] += 1;
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

/// Outcome of one window's fit.
#[derive(Debug, Clone)]
pub struct WindowReport {
    pub index: usize,
    /// MJD (TDT) of the window's first vector.
    pub mjd_tdt: MJD,
    /// Fitted element set; absent when the bootstrap diverged.
    pub tle: Option<TleElements>,
    /// Worst per-sample position residual of the emitted set (km).
    pub worst_residual_km: Kilometer,
    pub model: Option<ModelKind>,
    /// The least-squares refinement was cut short by a singular solve.
    pub solve_failed: bool,
}

/// Run-wide results and statistics.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub windows: Vec<WindowReport>,
    pub worst_residual_km: Kilometer,
    pub worst_mjd: MJD,
    pub histogram: Histogram,
}

impl RunSummary {
    pub fn tles_written(&self) -> usize {
        self.windows.iter().filter(|w| w.tle.is_some()).count()
    }
}

/// Orchestrates the whole fit over an input ephemeris.
pub struct FitDriver {
    params: FitParams,
}

impl FitDriver {
    pub fn new(params: FitParams) -> Self {
        FitDriver { params }
    }

    pub fn params(&self) -> &FitParams {
        &self.params
    }

    /// Fit one TLE per window of `output_freq` vectors.
    ///
    /// Input vectors are precessed from J2000 to the mean frame of their own
    /// date, and window epochs are converted from TDT to UTC, before any
    /// fitting happens. A trailing partial window is dropped.
    pub fn run(&self, ephemeris: &EphemerisFile) -> RunSummary {
        let template = self
            .params
            .template(ephemeris.norad_number, ephemeris.intl_desig.as_deref());

        let prepared: Vec<StateVector> = ephemeris
            .rows
            .iter()
            .map(|row| {
                let matrix = precession_from_j2000(row.jd_tdt);
                precess_state(&matrix, &row.state)
            })
            .collect();

        let mut summary = RunSummary::default();
        let n = self.params.output_freq.max(1);
        for (index, states) in prepared.chunks_exact(n).enumerate() {
            let jd_first_tdt = ephemeris.rows[index * n].jd_tdt;
            let report =
                self.fit_window(index, states, jd_first_tdt, ephemeris.step_days, &template);

            if report.tle.is_some() {
                summary.histogram.record(report.worst_residual_km);
                if report.worst_residual_km > summary.worst_residual_km {
                    summary.worst_residual_km = report.worst_residual_km;
                    summary.worst_mjd = report.mjd_tdt;
                }
            }
            summary.windows.push(report);
        }
        summary
    }

    fn fit_window(
        &self,
        index: usize,
        states: &[StateVector],
        jd_first_tdt: f64,
        step_days: f64,
        template: &TleElements,
    ) -> WindowReport {
        let mjd_tdt = jd_to_mjd(jd_first_tdt);
        let step_minutes = step_days * MINUTES_PER_DAY;
        let config = LeastSquaresConfig {
            n_params: self.params.n_fit_params,
            n_iterations: self.params.n_iterations,
            lambda0: self.params.lambda0,
            n_damped: self.params.n_damped,
        };

        if self.params.high_precision {
            let epoch = utc_from_tdt(jd_first_tdt);
            let tle0 = TleElements::high_precision_from_state(&states[0], epoch, template);
            let window = FitWindow {
                template: &tle0,
                states,
                step_minutes,
            };
            let fit = refine_least_squares(&window, &tle0, &config);
            return WindowReport {
                index,
                mjd_tdt,
                tle: Some(fit.tle),
                worst_residual_km: fit.worst_residual_km,
                model: Some(ModelKind::DeepSpace),
                solve_failed: fit.failed,
            };
        }

        // The central vector anchors the epoch; it noticeably helps the
        // simplex stage.
        let center = states.len() / 2;
        let epoch = utc_from_tdt(jd_first_tdt + center as f64 * step_days);

        let boot = match bootstrap_tle(
            &states[center],
            epoch,
            template,
            self.params.adjust_to_apogee,
        ) {
            Ok(boot) => boot,
            Err(error) => {
                warn!(window = index, %error, "window skipped");
                return WindowReport {
                    index,
                    mjd_tdt,
                    tle: None,
                    worst_residual_km: f64::INFINITY,
                    model: None,
                    solve_failed: false,
                };
            }
        };

        let mut model = select_ephemeris(&boot.tle);
        if self.params.sgp4_only {
            model = ModelKind::NearEarth;
        }
        debug!(
            window = index,
            model = model.index(),
            bootstrap_iterations = boot.iterations,
            "bootstrap done"
        );

        let window = FitWindow {
            template: &boot.tle,
            states,
            step_minutes,
        };
        let start = EquinoctialParams::from(&boot.tle).to_array();
        let refined = simplex_search(&window, &start);
        let tle1 = elements_with_params(&boot.tle, &refined);

        let fit = refine_least_squares(&window, &tle1, &config);
        if fit.failed {
            warn!(window = index, mjd = mjd_tdt, "least-squares solution failed");
        }

        WindowReport {
            index,
            mjd_tdt,
            tle: Some(fit.tle),
            worst_residual_km: fit.worst_residual_km,
            model: Some(model),
            solve_failed: fit.failed,
        }
    }
}
