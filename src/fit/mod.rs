//! # Fit configuration
//!
//! [`FitParams`] centralizes the run-level switches of a fitting run and is
//! handed to [`FitDriver`](crate::fit::driver::FitDriver). It controls:
//!
//! - the window size (`output_freq`, one TLE per window of that many input
//!   vectors),
//! - the least-squares schedule (`n_iterations`, Levenberg–Marquardt
//!   `lambda0` and the damped-iteration count `n_damped`),
//! - the parameter count (6, 7 to fit bstar as well, 8 reserved),
//! - model selection overrides (`sgp4_only`, `use_sgp8`),
//! - the high-precision passthrough and apogee-adjustment modes,
//! - identifier overrides (NORAD number, international designator).
//!
//! ## Example
//!
//! ```rust,no_run
//! use tlefit::fit::FitParams;
//!
//! let params = FitParams::builder()
//!     .output_freq(10)
//!     .n_iterations(15)
//!     .lambda0(1.0e-4)
//!     .n_damped(5)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;

use crate::elements::{EphemerisKind, TleElements};
use crate::tlefit_errors::TleFitError;

pub mod driver;
pub mod report;

pub use driver::{FitDriver, Histogram, RunSummary, WindowReport};

/// Run-level configuration of a fitting run.
///
/// Fields
/// -----------------
/// * `output_freq` – window size N: one TLE is fitted per N input vectors,
///   with the TLE epoch on the central vector.
/// * `n_iterations` – least-squares outer iterations per window.
/// * `lambda0` – initial Levenberg–Marquardt damping (0 disables damping).
/// * `n_damped` – iteration index from which the damping drops to zero.
/// * `n_fit_params` – 6 fits the orbit only, 7 also fits bstar, 8 is
///   reserved and behaves as 7.
/// * `sgp4_only` – always report the near-Earth model, even for deep-space
///   orbits; flagged in the output stream.
/// * `use_sgp8` – request the eighth-order model variant from the
///   propagator library where available.
/// * `adjust_to_apogee` – slide every bootstrap candidate to apogee (mean
///   anomaly π) before scoring.
/// * `high_precision` – "type h" passthrough: store state vectors in the
///   element sets instead of fitting mean elements.
/// * `norad_number`, `intl_desig` – identifier overrides; when absent the
///   driver falls back to identifiers scraped from the ephemeris header,
///   then to `99999` / `"00000"`.
#[derive(Debug, Clone)]
pub struct FitParams {
    pub output_freq: usize,
    pub n_iterations: usize,
    pub lambda0: f64,
    pub n_damped: usize,
    pub n_fit_params: usize,
    pub sgp4_only: bool,
    pub use_sgp8: bool,
    pub adjust_to_apogee: bool,
    pub high_precision: bool,
    pub norad_number: Option<u32>,
    pub intl_desig: Option<String>,
}

impl FitParams {
    /// Defaults matching [`FitParams::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Fluent builder with validation.
    pub fn builder() -> FitParamsBuilder {
        FitParamsBuilder::new()
    }

    /// Ephemeris-type tag the emitted element sets carry.
    pub fn ephemeris_kind(&self) -> EphemerisKind {
        if self.high_precision {
            EphemerisKind::HighPrecision
        } else if self.sgp4_only {
            EphemerisKind::Sgp4
        } else {
            EphemerisKind::Default
        }
    }

    /// Template element set carrying the run's identifiers and tag.
    pub(crate) fn template(&self, norad_fallback: Option<u32>, intl_fallback: Option<&str>) -> TleElements {
        let norad = self.norad_number.or(norad_fallback).unwrap_or(99_999);
        let intl = self
            .intl_desig
            .as_deref()
            .or(intl_fallback)
            .unwrap_or("00000");
        TleElements::template(norad, intl, self.ephemeris_kind())
    }
}

impl Default for FitParams {
    fn default() -> Self {
        FitParams {
            output_freq: 10,
            n_iterations: 15,
            lambda0: 0.,
            n_damped: 0,
            n_fit_params: 6,
            sgp4_only: false,
            use_sgp8: false,
            adjust_to_apogee: false,
            high_precision: false,
            norad_number: None,
            intl_desig: None,
        }
    }
}

/// Builder for [`FitParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct FitParamsBuilder {
    params: FitParams,
}

impl FitParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: FitParams::default(),
        }
    }

    pub fn output_freq(mut self, v: usize) -> Self {
        self.params.output_freq = v;
        self
    }
    pub fn n_iterations(mut self, v: usize) -> Self {
        self.params.n_iterations = v;
        self
    }
    pub fn lambda0(mut self, v: f64) -> Self {
        self.params.lambda0 = v;
        self
    }
    pub fn n_damped(mut self, v: usize) -> Self {
        self.params.n_damped = v;
        self
    }
    pub fn n_fit_params(mut self, v: usize) -> Self {
        self.params.n_fit_params = v;
        self
    }
    pub fn sgp4_only(mut self, v: bool) -> Self {
        self.params.sgp4_only = v;
        self
    }
    pub fn use_sgp8(mut self, v: bool) -> Self {
        self.params.use_sgp8 = v;
        self
    }
    pub fn adjust_to_apogee(mut self, v: bool) -> Self {
        self.params.adjust_to_apogee = v;
        self
    }
    pub fn high_precision(mut self, v: bool) -> Self {
        self.params.high_precision = v;
        self
    }
    pub fn norad_number(mut self, v: u32) -> Self {
        self.params.norad_number = Some(v);
        self
    }
    pub fn intl_desig(mut self, v: &str) -> Self {
        self.params.intl_desig = Some(v.to_string());
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `output_freq ≥ 1` and `n_iterations ≥ 1`.
    /// * `n_fit_params ∈ {6, 7, 8}`.
    /// * `lambda0` finite and non-negative.
    pub fn build(self) -> Result<FitParams, TleFitError> {
        let p = &self.params;
        if p.output_freq == 0 {
            return Err(TleFitError::InvalidFitParameter(
                "output_freq must be >= 1".into(),
            ));
        }
        if p.n_iterations == 0 {
            return Err(TleFitError::InvalidFitParameter(
                "n_iterations must be >= 1".into(),
            ));
        }
        if !(6..=8).contains(&p.n_fit_params) {
            return Err(TleFitError::InvalidFitParameter(
                "n_fit_params must be 6, 7 or 8".into(),
            ));
        }
        if !p.lambda0.is_finite() || p.lambda0 < 0. {
            return Err(TleFitError::InvalidFitParameter(
                "lambda0 must be finite and non-negative".into(),
            ));
        }
        Ok(self.params)
    }
}

impl fmt::Display for FitParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FitParams(output_freq={}, n_iterations={}, lambda0={:.3e}, n_damped={}, n_fit_params={}, sgp4_only={}, use_sgp8={}, adjust_to_apogee={}, high_precision={})",
            self.output_freq,
            self.n_iterations,
            self.lambda0,
            self.n_damped,
            self.n_fit_params,
            self.sgp4_only,
            self.use_sgp8,
            self.adjust_to_apogee,
            self.high_precision,
        )
    }
}
