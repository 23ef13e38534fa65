//! Two-body osculating elements from a geocentric state vector.
//!
//! The bootstrap treats these plain Keplerian elements as if they were the
//! mean elements of a TLE; the propagation mismatch that choice introduces is
//! what the fixed-point iteration in [`crate::bootstrap`] absorbs.

use nalgebra::Vector3;

use crate::constants::{JulianDate, Radian, DPI, GM_EARTH, MINUTES_PER_DAY};
use crate::elements::TleElements;
use crate::state_vector::StateVector;
use crate::tlefit_errors::TleFitError;

/// Below this eccentricity (or sin of inclination) the corresponding angle
/// is undefined and pinned to zero.
const DEGENERATE_EPS: f64 = 1e-12;

/// Principal value of an angle in [0, 2π).
pub(crate) fn principal_angle(a: f64) -> Radian {
    a.rem_euclid(DPI)
}

/// Osculating Keplerian elements of `state` at `epoch`, packaged as a TLE.
///
/// Identifiers, drag term and ephemeris tag are taken from `template`; the
/// six elements come from the two-body geometry of the state vector.
///
/// Arguments
/// ---------
/// * `state`: geocentric state, position in AU and velocity in AU/day.
/// * `epoch`: Julian Date (UTC) the state refers to.
/// * `template`: element set supplying everything that is not geometry.
///
/// Return
/// ------
/// * The osculating element set, or [`TleFitError::OpenOrbit`] when the
///   state is hyperbolic, parabolic or rectilinear (TLEs require `e < 1`).
pub fn osculating_elements(
    state: &StateVector,
    epoch: JulianDate,
    template: &TleElements,
) -> Result<TleElements, TleFitError> {
    let r = state.position;
    let v = state.velocity;
    let rmag = r.norm();

    // Angular momentum; a rectilinear trajectory has none.
    let h = r.cross(&v);
    let hmag = h.norm();
    if rmag < DEGENERATE_EPS * DEGENERATE_EPS || hmag == 0. {
        return Err(TleFitError::OpenOrbit(1.));
    }

    let energy = v.norm_squared() / 2. - GM_EARTH / rmag;
    let ecc_vec = v.cross(&h) / GM_EARTH - r / rmag;
    let ecc = ecc_vec.norm();
    if !(ecc < 1.) || energy >= 0. {
        return Err(TleFitError::OpenOrbit(ecc));
    }

    let semi_major_axis = -GM_EARTH / (2. * energy);
    let mean_motion = (GM_EARTH / semi_major_axis.powi(3)).sqrt() / MINUTES_PER_DAY;

    let h_unit = h / hmag;
    let inclination = (h.z / hmag).clamp(-1., 1.).acos();

    // Line of nodes; undefined for equatorial orbits, where the node is
    // pinned to the x axis.
    let node = Vector3::new(-h.y, h.x, 0.);
    let (node_unit, raan) = if node.norm() < DEGENERATE_EPS * hmag {
        (Vector3::x(), 0.)
    } else {
        let n_unit = node.normalize();
        (n_unit, principal_angle(node.y.atan2(node.x)))
    };

    // Perigee direction; for near-circular orbits the anomaly is measured
    // from the node instead and the argument of perigee is zero.
    let (perigee_unit, arg_perigee) = if ecc < DEGENERATE_EPS {
        (node_unit, 0.)
    } else {
        let p_unit = ecc_vec / ecc;
        let omega = p_unit.dot(&h_unit.cross(&node_unit)).atan2(p_unit.dot(&node_unit));
        (p_unit, principal_angle(omega))
    };

    let true_anomaly = r
        .dot(&h_unit.cross(&perigee_unit))
        .atan2(r.dot(&perigee_unit));
    let ecc_anomaly = ((1. - ecc * ecc).sqrt() * true_anomaly.sin())
        .atan2(ecc + true_anomaly.cos());
    let mean_anomaly = principal_angle(ecc_anomaly - ecc * ecc_anomaly.sin());

    let mut tle = template.clone();
    tle.epoch = epoch;
    tle.inclination = inclination;
    tle.raan = raan;
    tle.eccentricity = ecc;
    tle.arg_perigee = arg_perigee;
    tle.mean_anomaly = mean_anomaly;
    tle.mean_motion = mean_motion;
    tle.high_state = None;
    Ok(tle)
}

#[cfg(test)]
mod kepler_test {
    use super::*;
    use crate::elements::EphemerisKind;
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;

    fn template() -> TleElements {
        TleElements::template(99999, "00000", EphemerisKind::Default)
    }

    /// Circular LEO radius in AU (roughly 500 km altitude).
    const R0: f64 = 4.6e-5;

    #[test]
    fn test_principal_angle() {
        assert_relative_eq!(principal_angle(-0.1), DPI - 0.1, epsilon = 1e-14);
        assert_relative_eq!(principal_angle(DPI + 0.25), 0.25, epsilon = 1e-13);
        assert!(principal_angle(-1e9) >= 0.);
        assert!(principal_angle(1e9) < DPI);
    }

    #[test]
    fn test_circular_equatorial() {
        let vc = (GM_EARTH / R0).sqrt();
        let state = StateVector::from_components([R0, 0., 0., 0., vc, 0.]);
        let tle = osculating_elements(&state, 2_451_545.0, &template()).unwrap();

        assert!(tle.eccentricity < 1e-10);
        assert!(tle.inclination < 1e-10);
        let n_expected = (GM_EARTH / R0.powi(3)).sqrt() / MINUTES_PER_DAY;
        assert_relative_eq!(tle.mean_motion, n_expected, max_relative = 1e-10);
    }

    #[test]
    fn test_elliptic_at_perigee() {
        let a = 6e-5;
        let e = 0.3;
        let rp = a * (1. - e);
        let vp = (GM_EARTH * (1. + e) / rp).sqrt();
        let state = StateVector::from_components([rp, 0., 0., 0., vp, 0.]);
        let tle = osculating_elements(&state, 2_451_545.0, &template()).unwrap();

        assert_relative_eq!(tle.eccentricity, e, epsilon = 1e-12);
        assert!(tle.mean_anomaly < 1e-9 || DPI - tle.mean_anomaly < 1e-9);
        assert!(tle.arg_perigee < 1e-9);
        let n_expected = (GM_EARTH / a.powi(3)).sqrt() / MINUTES_PER_DAY;
        assert_relative_eq!(tle.mean_motion, n_expected, max_relative = 1e-12);
    }

    #[test]
    fn test_inclined_orbit_recovers_inclination() {
        let incl: f64 = 51.6_f64.to_radians();
        let rot = Matrix3::new(
            1., 0., 0.,
            0., incl.cos(), -incl.sin(),
            0., incl.sin(), incl.cos(),
        );
        let vc = (GM_EARTH / R0).sqrt();
        let state = StateVector::new(
            rot * nalgebra::Vector3::new(R0, 0., 0.),
            rot * nalgebra::Vector3::new(0., vc, 0.),
        );
        let tle = osculating_elements(&state, 2_451_545.0, &template()).unwrap();

        assert_relative_eq!(tle.inclination, incl, epsilon = 1e-12);
        // Rotation about x keeps the ascending node on the x axis.
        assert!(tle.raan < 1e-9 || DPI - tle.raan < 1e-9);
    }

    #[test]
    fn test_hyperbolic_state_rejected() {
        let vesc = (2. * GM_EARTH / R0).sqrt();
        let state = StateVector::from_components([R0, 0., 0., 0., 1.5 * vesc, 0.]);
        assert!(matches!(
            osculating_elements(&state, 2_451_545.0, &template()),
            Err(TleFitError::OpenOrbit(_))
        ));
    }
}
