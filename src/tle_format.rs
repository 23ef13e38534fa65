//! Two-line ASCII formatting of element sets.
//!
//! Standard sets produce the usual 69-column pair with mod-10 checksums.
//! High-precision ("type h") sets cannot squeeze an f64 into the fixed
//! element columns, so their second line carries the six state components
//! (meters, m/s) in shortest round-trip scientific notation instead.

use crate::constants::{DPI, MINUTES_PER_DAY};
use crate::elements::{EphemerisKind, TleElements};
use crate::time::tle_epoch_fields;

/// Mod-10 TLE checksum: digits count as themselves, minus signs as one.
pub fn checksum(line: &str) -> u32 {
    line.chars()
        .map(|c| match c {
            '0'..='9' => c.to_digit(10).unwrap(),
            '-' => 1,
            _ => 0,
        })
        .sum::<u32>()
        % 10
}

/// Assumed-decimal exponent field ("` 34000-3`" reads as 0.34000e-3),
/// eight columns.
fn exp_field(value: f64) -> String {
    if value == 0. || !value.is_finite() {
        return " 00000-0".into();
    }
    let sign = if value < 0. { '-' } else { ' ' };
    let mut mantissa = value.abs();
    let mut exponent = 0i32;
    while mantissa >= 1. {
        mantissa /= 10.;
        exponent += 1;
    }
    while mantissa < 0.1 {
        mantissa *= 10.;
        exponent -= 1;
        if exponent < -9 {
            return " 00000-0".into();
        }
    }
    let mut digits = (mantissa * 100_000.).round() as u32;
    if digits >= 100_000 {
        digits = 10_000;
        exponent += 1;
    }
    if exponent > 9 {
        return " 00000-0".into();
    }
    let exponent_sign = if exponent < 0 { '-' } else { '+' };
    format!("{sign}{digits:05}{exponent_sign}{}", exponent.abs())
}

/// TLE epoch field `YYDDD.DDDDDDDD`.
fn epoch_field(jd_utc: f64) -> String {
    let (year, day_of_year) = tle_epoch_fields(jd_utc);
    format!("{:02}{:012.8}", year.rem_euclid(100), day_of_year)
}

/// Format an element set as its two lines.
pub fn write_tle(tle: &TleElements) -> (String, String) {
    let body1 = format!(
        "1 {:05}{} {:<8} {}  .00000000  00000-0 {} {} {:4}",
        tle.norad_number % 100_000,
        tle.classification,
        tle.intl_desig,
        epoch_field(tle.epoch),
        exp_field(tle.bstar),
        tle.ephemeris_kind.tag(),
        0,
    );
    let line1 = format!("{body1}{}", checksum(&body1));

    if tle.ephemeris_kind == EphemerisKind::HighPrecision {
        let state = tle
            .high_state
            .map_or([0.; 6], |s| s.to_components());
        let body2 = format!(
            "2 {:05} {:e} {:e} {:e} {:e} {:e} {:e}",
            tle.norad_number % 100_000,
            state[0],
            state[1],
            state[2],
            state[3],
            state[4],
            state[5],
        );
        let line2 = format!("{body2}{}", checksum(&body2));
        return (line1, line2);
    }

    let ecc_digits = ((tle.eccentricity * 1e7).round() as u32).min(9_999_999);
    let revs_per_day = tle.mean_motion * MINUTES_PER_DAY / DPI;
    let body2 = format!(
        "2 {:05} {:8.4} {:8.4} {:07} {:8.4} {:8.4} {:11.8}{:5}",
        tle.norad_number % 100_000,
        tle.inclination.to_degrees(),
        tle.raan.to_degrees(),
        ecc_digits,
        tle.arg_perigee.to_degrees(),
        tle.mean_anomaly.to_degrees(),
        revs_per_day,
        0,
    );
    let line2 = format!("{body2}{}", checksum(&body2));
    (line1, line2)
}
