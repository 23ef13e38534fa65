//! Adapter around the external SGP4/SDP4 implementation.
//!
//! Element sets go in, geocentric states in the working units (AU, AU/day)
//! come out. The underlying library applies the near-Earth or deep-space
//! model by the standard period rule; [`select_ephemeris`] exposes that rule
//! so the fit driver can branch and report on it. High-precision passthrough
//! sets skip the model entirely: propagation is the identity at epoch.

use crate::constants::{AU, AU_METERS, DEEP_SPACE_PERIOD_MIN, SECONDS_PER_DAY, T2000};
use crate::elements::{EphemerisKind, TleElements};
use crate::state_vector::StateVector;
use crate::tlefit_errors::TleFitError;

/// Which analytic model applies to an element set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    NearEarth,
    DeepSpace,
}

impl ModelKind {
    /// Conventional model index (0 = near-Earth, 1 = deep-space).
    pub fn index(&self) -> i32 {
        match self {
            ModelKind::NearEarth => 0,
            ModelKind::DeepSpace => 1,
        }
    }
}

/// Model variant the propagator applies to `tle`: deep-space for periods of
/// 225 minutes and up.
pub fn select_ephemeris(tle: &TleElements) -> ModelKind {
    if tle.ephemeris_kind == EphemerisKind::HighPrecision
        || tle.period_minutes() >= DEEP_SPACE_PERIOD_MIN
    {
        ModelKind::DeepSpace
    } else {
        ModelKind::NearEarth
    }
}

/// State of `tle` at `minutes_from_epoch`, in AU and AU/day.
///
/// Preconditions: `0 ≤ e < 1` and `n > 0`
/// ([`TleFitError::InvalidElements`] otherwise). High-precision sets return
/// their stored state vector converted from meters and m/s.
pub fn propagate(tle: &TleElements, minutes_from_epoch: f64) -> Result<StateVector, TleFitError> {
    if tle.ephemeris_kind == EphemerisKind::HighPrecision {
        let stored = tle
            .high_state
            .ok_or_else(|| TleFitError::Propagation("high-precision set without a state".into()))?;
        // Identity at epoch, straight-line motion away from it.
        let seconds = minutes_from_epoch * 60.;
        return Ok(StateVector::new(
            (stored.position + stored.velocity * seconds) / AU_METERS,
            stored.velocity * (SECONDS_PER_DAY / AU_METERS),
        ));
    }

    tle.validate()?;

    let orbit = sgp4::Orbit::from_kozai_elements(
        &sgp4::WGS72,
        tle.inclination,
        tle.raan,
        tle.eccentricity,
        tle.arg_perigee,
        tle.mean_anomaly,
        tle.mean_motion,
    )
    .map_err(|e| TleFitError::Propagation(format!("{e:?}")))?;

    let epoch_years = (tle.epoch - T2000) / 365.25;
    let constants = sgp4::Constants::new(
        sgp4::WGS72,
        sgp4::iau_epoch_to_sidereal_time,
        epoch_years,
        tle.bstar,
        orbit,
    )
    .map_err(|e| TleFitError::Propagation(format!("{e:?}")))?;

    let prediction = constants
        .propagate(sgp4::MinutesSinceEpoch(minutes_from_epoch))
        .map_err(|e| TleFitError::Propagation(format!("{e:?}")))?;

    // The library yields km and km/s.
    let position = nalgebra::Vector3::from(prediction.position) / AU;
    let velocity = nalgebra::Vector3::from(prediction.velocity) * (SECONDS_PER_DAY / AU);
    Ok(StateVector::new(position, velocity))
}
