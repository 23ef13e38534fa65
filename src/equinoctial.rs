//! Nonsingular fit parameterization.
//!
//! The six fit parameters are equinoctial-style elements with two twists that
//! make the mapping a bijection between all of ℝ⁶ and the closed TLE orbits:
//! the eccentricity terms are scaled by `e / (1 − e)` so that `0 ≤ e < 1`
//! covers the whole (h, k) plane, and the mean motion enters through its
//! logarithm so that any real value maps back to a positive rate. A search
//! step can therefore never produce an element set the propagator rejects.
//!
//! * `h = (e / (1 − e)) · sin(ϖ)`, `k = (e / (1 − e)) · cos(ϖ)` with
//!   `ϖ = ω + Ω`,
//! * `p = tan(i/2) · sin(Ω)`, `q = tan(i/2) · cos(Ω)`,
//! * `λ = ϖ + M` (mean longitude),
//! * `ν = ln(n)`.

use smallvec::SmallVec;

use crate::constants::Radian;
use crate::elements::{EphemerisKind, TleElements};
use crate::kepler::principal_angle;
use crate::state_vector::StateVector;

/// Largest parameter vector the refiners handle (six equinoctial terms,
/// bstar, one reserved slot).
pub const MAX_FIT_PARAMS: usize = 8;

/// Parameter vector sized for the stack.
pub type ParamVector = SmallVec<[f64; MAX_FIT_PARAMS]>;

/// Equinoctial parameterization of a closed TLE orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquinoctialParams {
    pub ecc_sin_lon: f64,            // h = e/(1-e) * sin(ϖ)
    pub ecc_cos_lon: f64,            // k = e/(1-e) * cos(ϖ)
    pub tan_half_incl_sin_node: f64, // p = tan(i/2) * sin(Ω)
    pub tan_half_incl_cos_node: f64, // q = tan(i/2) * cos(Ω)
    pub mean_longitude: Radian,      // λ = ϖ + M
    pub log_mean_motion: f64,        // ν = ln(n)
}

impl From<&TleElements> for EquinoctialParams {
    fn from(tle: &TleElements) -> Self {
        let lon_perigee = tle.arg_perigee + tle.raan;
        let r = tle.eccentricity / (1. - tle.eccentricity);
        let tan_half_incl = (tle.inclination / 2.).tan();

        EquinoctialParams {
            ecc_sin_lon: r * lon_perigee.sin(),
            ecc_cos_lon: r * lon_perigee.cos(),
            tan_half_incl_sin_node: tan_half_incl * tle.raan.sin(),
            tan_half_incl_cos_node: tan_half_incl * tle.raan.cos(),
            mean_longitude: lon_perigee + tle.mean_anomaly,
            log_mean_motion: tle.mean_motion.ln(),
        }
    }
}

impl EquinoctialParams {
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.ecc_sin_lon,
            self.ecc_cos_lon,
            self.tan_half_incl_sin_node,
            self.tan_half_incl_cos_node,
            self.mean_longitude,
            self.log_mean_motion,
        ]
    }

    pub fn from_array(a: &[f64; 6]) -> Self {
        EquinoctialParams {
            ecc_sin_lon: a[0],
            ecc_cos_lon: a[1],
            tan_half_incl_sin_node: a[2],
            tan_half_incl_cos_node: a[3],
            mean_longitude: a[4],
            log_mean_motion: a[5],
        }
    }

    /// Inverse mapping. Identifiers, epoch, drag term and tag come from
    /// `template`; the angles are reduced to `[0, 2π)`.
    pub fn to_elements(&self, template: &TleElements) -> TleElements {
        let r = self.ecc_sin_lon.hypot(self.ecc_cos_lon);
        let lon_perigee = self.ecc_sin_lon.atan2(self.ecc_cos_lon);
        let tan_half_incl = self
            .tan_half_incl_sin_node
            .hypot(self.tan_half_incl_cos_node);

        let mut tle = template.clone();
        tle.inclination = 2. * tan_half_incl.atan();
        tle.raan = principal_angle(
            self.tan_half_incl_sin_node
                .atan2(self.tan_half_incl_cos_node),
        );
        tle.eccentricity = r / (1. + r);
        tle.arg_perigee = principal_angle(lon_perigee - tle.raan);
        tle.mean_anomaly = principal_angle(self.mean_longitude - lon_perigee);
        tle.mean_motion = self.log_mean_motion.exp();
        tle
    }
}

/// Fit-parameter vector of `tle`, `n_params` slots.
///
/// Slots 0..6 are the equinoctial terms; slot 6 is bstar when the fit
/// adjusts drag. High-precision sets expose their raw state vector instead.
pub(crate) fn params_from_elements(tle: &TleElements, n_params: usize) -> ParamVector {
    let mut params = ParamVector::new();
    if tle.ephemeris_kind == EphemerisKind::HighPrecision {
        let state = tle.high_state.unwrap_or(StateVector::from_components([0.; 6]));
        params.extend(state.to_components().iter().copied().take(n_params));
    } else {
        params.extend(EquinoctialParams::from(tle).to_array());
        if n_params > 6 {
            params.push(tle.bstar);
        }
    }
    params
}

/// Element set reconstructed from a fit-parameter vector.
pub(crate) fn elements_with_params(template: &TleElements, params: &[f64]) -> TleElements {
    if template.ephemeris_kind == EphemerisKind::HighPrecision {
        let mut components = template
            .high_state
            .map_or([0.; 6], |s| s.to_components());
        for (slot, value) in components.iter_mut().zip(params) {
            *slot = *value;
        }
        let mut tle = template.clone();
        tle.high_state = Some(StateVector::from_components(components));
        return tle;
    }

    let mut array = [0.; 6];
    array.copy_from_slice(&params[..6]);
    let mut tle = EquinoctialParams::from_array(&array).to_elements(template);
    if params.len() > 6 {
        tle.bstar = params[6];
    }
    tle
}

/// Central-difference step for parameter `index`.
///
/// High-precision sets are perturbed by one meter in position and 1e-4 m/s
/// in velocity; element fits use 1e-4 in the equinoctial terms and 1e-5 for
/// the drag term.
pub(crate) fn partial_step(kind: EphemerisKind, index: usize) -> f64 {
    if kind == EphemerisKind::HighPrecision {
        if index < 3 {
            1.
        } else {
            1e-4
        }
    } else if index == 6 {
        1e-5
    } else {
        1e-4
    }
}
