//! A fit window: equally spaced state vectors around a central epoch.

use crate::elements::TleElements;
use crate::equinoctial::elements_with_params;
use crate::propagator::propagate;
use crate::state_vector::StateVector;
use crate::tlefit_errors::TleFitError;

/// The data one window fit works against: the input states, the sample
/// spacing, and the template element set carrying epoch and identifiers.
///
/// Sample `j` sits at `(j − ⌊N/2⌋) · step_minutes` from the template epoch,
/// which the driver pins to the central vector of the window.
pub struct FitWindow<'a> {
    pub template: &'a TleElements,
    pub states: &'a [StateVector],
    pub step_minutes: f64,
}

impl FitWindow<'_> {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Offset of sample `j` from the element-set epoch, in minutes.
    pub fn sample_offset_minutes(&self, j: usize) -> f64 {
        (j as i64 - (self.len() / 2) as i64) as f64 * self.step_minutes
    }

    /// Propagate the element set described by `params` to sample `j`.
    pub fn propagate_params(&self, params: &[f64], j: usize) -> Result<StateVector, TleFitError> {
        let tle = elements_with_params(self.template, params);
        propagate(&tle, self.sample_offset_minutes(j))
    }

    /// Sum of squared residuals of the trajectory described by `params`
    /// against the window.
    ///
    /// With a single sample all six components count; with more, positions
    /// only. Parameter vectors the propagator rejects score infinite, which
    /// no simplex move can accept.
    pub fn sum_squared_residuals(&self, params: &[f64; 6]) -> f64 {
        let tle = elements_with_params(self.template, params);
        let components = if self.len() > 1 { 3 } else { 6 };

        let mut err = 0.;
        for (j, state) in self.states.iter().enumerate() {
            let propagated = match propagate(&tle, self.sample_offset_minutes(j)) {
                Ok(propagated) => propagated,
                Err(_) => return f64::INFINITY,
            };
            for i in 0..components {
                let delta = propagated.component(i) - state.component(i);
                err += delta * delta;
            }
        }
        err
    }
}
