//! Precession of geocentric vectors from J2000 to the mean frame of date
//! (IAU 1976 model, Astronomical Almanac 1987 section B18).

use nalgebra::Matrix3;

use crate::constants::{JulianDate, T2000};
use crate::state_vector::StateVector;

const DEG: f64 = std::f64::consts::PI / 180.;

/// Coordinate rotation by `alpha` about axis `k` (0 = X, 1 = Y, 2 = Z).
fn rotation(alpha: f64, k: usize) -> Matrix3<f64> {
    let (sina, cosa) = alpha.sin_cos();
    let mut r = Matrix3::zeros();

    let i1 = k;
    let i2 = (i1 + 1) % 3;
    let i3 = (i2 + 1) % 3;

    r[(i1, i1)] = 1.;
    r[(i2, i2)] = cosa;
    r[(i2, i3)] = sina;
    r[(i3, i2)] = -sina;
    r[(i3, i3)] = cosa;
    r
}

/// Precession matrix from the J2000 mean equatorial frame to the mean
/// equator and equinox of date.
///
/// The three IAU 1976 angles are polynomials in Julian centuries
/// `T = (jd − J2000) / 36525`:
///
/// ```text
/// ζ(T) = (0.6406161 + 0.0000839·T + 0.0000050·T²) · T  [deg]
/// θ(T) = (0.5567530 − 0.0001185·T − 0.0000116·T²) · T  [deg]
/// z(T) = (0.6406161 + 0.0003041·T + 0.0000051·T²) · T  [deg]
/// ```
///
/// composed as `R3(−z) · R2(θ) · R3(−ζ)`.
pub fn precession_from_j2000(jd_tt: JulianDate) -> Matrix3<f64> {
    let t = (jd_tt - T2000) / 36_525.;

    let zeta = ((5.0e-6 * t + 8.39e-5) * t + 0.640_616_1) * t * DEG;
    let z = ((5.1e-6 * t + 3.041e-4) * t + 0.640_616_1) * t * DEG;
    let theta = ((-1.16e-5 * t - 1.185e-4) * t + 0.556_753_0) * t * DEG;

    rotation(-z, 2) * rotation(theta, 1) * rotation(-zeta, 2)
}

/// Apply a precession matrix to position and velocity alike.
pub fn precess_state(matrix: &Matrix3<f64>, state: &StateVector) -> StateVector {
    StateVector::new(matrix * state.position, matrix * state.velocity)
}

#[cfg(test)]
mod ref_frames_test {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_identity_at_j2000() {
        let m = precession_from_j2000(T2000);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1. } else { 0. };
                assert_relative_eq!(m[(i, j)], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_orthonormal() {
        let m = precession_from_j2000(T2000 + 11_000.);
        let should_be_identity = m * m.transpose();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1. } else { 0. };
                assert_relative_eq!(should_be_identity[(i, j)], expected, epsilon = 1e-13);
            }
        }
    }

    #[test]
    fn test_general_precession_rate() {
        // One Julian century moves the equinox by roughly 1.4 degrees.
        let m = precession_from_j2000(T2000 + 36_525.);
        let x = Vector3::x();
        let moved = m * x;
        let angle = moved.dot(&x).clamp(-1., 1.).acos();
        assert!(
            (0.021..0.028).contains(&angle),
            "precession over a century was {angle} rad"
        );
    }

    #[test]
    fn test_precess_state_preserves_norms() {
        let m = precession_from_j2000(T2000 + 9_131.25);
        let state = StateVector::new(
            Vector3::new(4.5e-5, -1e-5, 2e-6),
            Vector3::new(3e-3, 1e-3, -4e-4),
        );
        let out = precess_state(&m, &state);
        assert_relative_eq!(
            out.position.norm(),
            state.position.norm(),
            max_relative = 1e-13
        );
        assert_relative_eq!(
            out.velocity.norm(),
            state.velocity.norm(),
            max_relative = 1e-13
        );
    }
}
