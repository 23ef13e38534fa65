use std::f64::consts::PI;

use crate::constants::{JulianDate, Radian, DPI, MINUTES_PER_DAY};
use crate::state_vector::StateVector;
use crate::tlefit_errors::TleFitError;

/// Ephemeris model tag carried by an element set.
///
/// `HighPrecision` short-circuits both model selection and the step sizes of
/// the numerical partials: such a set stores a raw state vector instead of
/// mean elements and propagates as the identity at epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EphemerisKind {
    #[default]
    Default,
    Sgp,
    Sgp4,
    Sdp4,
    Sgp8,
    Sdp8,
    HighPrecision,
}

impl EphemerisKind {
    /// Single-character tag used in the two-line format.
    pub fn tag(&self) -> char {
        match self {
            EphemerisKind::Default => '0',
            EphemerisKind::Sgp => '1',
            EphemerisKind::Sgp4 => '2',
            EphemerisKind::Sdp4 => '3',
            EphemerisKind::Sgp8 => '4',
            EphemerisKind::Sdp8 => '5',
            EphemerisKind::HighPrecision => 'H',
        }
    }
}

/// Mean elements of a two-line element set, in the propagator's convention.
///
/// Fields
/// -----------------
/// * `epoch`: Julian Date, UTC.
/// * `inclination`: radians, `[0, π]`.
/// * `raan`: right ascension of the ascending node, radians, `[0, 2π)`.
/// * `eccentricity`: `[0, 1)`.
/// * `arg_perigee`, `mean_anomaly`: radians, `[0, 2π)`.
/// * `mean_motion`: radians per minute, `> 0`.
/// * `bstar`: drag term (1/earth radii).
/// * `high_state`: raw state vector in meters and m/s, only present for
///   [`EphemerisKind::HighPrecision`] sets.
#[derive(Debug, Clone, PartialEq)]
pub struct TleElements {
    pub epoch: JulianDate,
    pub inclination: Radian,
    pub raan: Radian,
    pub eccentricity: f64,
    pub arg_perigee: Radian,
    pub mean_anomaly: Radian,
    pub mean_motion: f64,
    pub bstar: f64,
    pub norad_number: u32,
    pub intl_desig: String,
    pub classification: char,
    pub ephemeris_kind: EphemerisKind,
    pub high_state: Option<StateVector>,
}

impl TleElements {
    /// Empty element set carrying only identifiers, used as the template
    /// the fit fills in.
    pub fn template(norad_number: u32, intl_desig: &str, ephemeris_kind: EphemerisKind) -> Self {
        TleElements {
            epoch: 0.,
            inclination: 0.,
            raan: 0.,
            eccentricity: 0.,
            arg_perigee: 0.,
            mean_anomaly: 0.,
            mean_motion: 0.,
            bstar: 0.,
            norad_number,
            intl_desig: intl_desig.to_string(),
            classification: 'U',
            ephemeris_kind,
            high_state: None,
        }
    }

    /// High-precision passthrough set storing `state` (AU, AU/day) as raw
    /// meters and m/s.
    pub fn high_precision_from_state(
        state: &StateVector,
        epoch: JulianDate,
        template: &TleElements,
    ) -> Self {
        use crate::constants::{AU_METERS, SECONDS_PER_DAY};

        let mut tle = template.clone();
        tle.epoch = epoch;
        tle.ephemeris_kind = EphemerisKind::HighPrecision;
        tle.high_state = Some(StateVector::new(
            state.position * AU_METERS,
            state.velocity * (AU_METERS / SECONDS_PER_DAY),
        ));
        tle
    }

    /// Preconditions the propagator requires of mean elements.
    pub fn validate(&self) -> Result<(), TleFitError> {
        if self.ephemeris_kind == EphemerisKind::HighPrecision {
            return Ok(());
        }
        if !(0. ..1.).contains(&self.eccentricity) || !(self.mean_motion > 0.) {
            return Err(TleFitError::InvalidElements {
                eccentricity: self.eccentricity,
                mean_motion: self.mean_motion,
            });
        }
        Ok(())
    }

    /// Anomalistic period (minutes).
    pub fn period_minutes(&self) -> f64 {
        DPI / self.mean_motion
    }

    /// Move the epoch along the orbit so that the set sits at apogee
    /// (mean anomaly π).
    pub fn shift_to_apogee(&mut self) {
        let mut ma = self.mean_anomaly;
        if ma > PI {
            ma -= DPI;
        }
        let rad_per_day = self.mean_motion * MINUTES_PER_DAY;
        if ma > 0. {
            self.epoch += (PI - ma) / rad_per_day;
        } else {
            self.epoch -= (PI + ma) / rad_per_day;
        }
        self.mean_anomaly = PI;
    }
}
