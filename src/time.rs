//! Time-scale plumbing: TDT (= TT) to UTC offsets and epoch helpers.
//!
//! Input ephemerides are stamped in TDT; TLE epochs are UTC. The offset is
//! `TDT − UTC = 32.184 s + (TAI − UTC)`, with TAI − UTC taken from the
//! tabulated leap seconds (1972 onward) and the USNO rate-adjusted segments
//! of 1961–1971. Dates before 1961 extrapolate the first segment.

use hifitime::Epoch;

use crate::constants::{JulianDate, JD_TO_MJD, MJD, SECONDS_PER_DAY};

/// TDT − TAI, fixed by definition.
const TDT_MINUS_TAI: f64 = 32.184;

/// Leap-second table: (JD at which the value takes effect, TAI − UTC seconds).
const LEAP_SECONDS: [(f64, f64); 28] = [
    (2_441_317.5, 10.), // 1972-01-01
    (2_441_499.5, 11.), // 1972-07-01
    (2_441_683.5, 12.), // 1973-01-01
    (2_442_048.5, 13.), // 1974-01-01
    (2_442_413.5, 14.), // 1975-01-01
    (2_442_778.5, 15.), // 1976-01-01
    (2_443_144.5, 16.), // 1977-01-01
    (2_443_509.5, 17.), // 1978-01-01
    (2_443_874.5, 18.), // 1979-01-01
    (2_444_239.5, 19.), // 1980-01-01
    (2_444_786.5, 20.), // 1981-07-01
    (2_445_151.5, 21.), // 1982-07-01
    (2_445_516.5, 22.), // 1983-07-01
    (2_446_247.5, 23.), // 1985-07-01
    (2_447_161.5, 24.), // 1988-01-01
    (2_447_892.5, 25.), // 1990-01-01
    (2_448_257.5, 26.), // 1991-01-01
    (2_448_804.5, 27.), // 1992-07-01
    (2_449_169.5, 28.), // 1993-07-01
    (2_449_534.5, 29.), // 1994-07-01
    (2_450_083.5, 30.), // 1996-01-01
    (2_450_630.5, 31.), // 1997-07-01
    (2_451_179.5, 32.), // 1999-01-01
    (2_453_736.5, 33.), // 2006-01-01
    (2_454_832.5, 34.), // 2009-01-01
    (2_456_109.5, 35.), // 2012-07-01
    (2_457_204.5, 36.), // 2015-07-01
    (2_457_754.5, 37.), // 2017-01-01
];

/// Rate-adjusted TAI − UTC segments of 1961–1971:
/// (start JD, offset seconds, reference MJD, rate seconds/day).
const RUBBER_SECONDS: [(f64, f64, f64, f64); 13] = [
    (2_437_300.5, 1.422_818_0, 37_300., 0.001_296), // 1961-01-01
    (2_437_512.5, 1.372_818_0, 37_300., 0.001_296), // 1961-08-01
    (2_437_665.5, 1.845_858_0, 37_665., 0.001_123_2), // 1962-01-01
    (2_438_334.5, 1.945_858_0, 37_665., 0.001_123_2), // 1963-11-01
    (2_438_395.5, 3.240_130_0, 38_761., 0.001_296), // 1964-01-01
    (2_438_486.5, 3.340_130_0, 38_761., 0.001_296), // 1964-04-01
    (2_438_639.5, 3.440_130_0, 38_761., 0.001_296), // 1964-09-01
    (2_438_761.5, 3.540_130_0, 38_761., 0.001_296), // 1965-01-01
    (2_438_820.5, 3.640_130_0, 38_761., 0.001_296), // 1965-03-01
    (2_438_942.5, 3.740_130_0, 38_761., 0.001_296), // 1965-07-01
    (2_439_004.5, 3.840_130_0, 38_761., 0.001_296), // 1965-09-01
    (2_439_126.5, 4.313_170_0, 39_126., 0.002_592), // 1966-01-01
    (2_439_887.5, 4.213_170_0, 39_126., 0.002_592), // 1968-02-01
];

/// TDT − UTC in seconds at the given Julian Date.
pub fn td_minus_utc(jd: JulianDate) -> f64 {
    if jd >= LEAP_SECONDS[0].0 {
        let tai_utc = LEAP_SECONDS
            .iter()
            .rev()
            .find(|(start, _)| jd >= *start)
            .map(|(_, value)| *value)
            .unwrap_or(LEAP_SECONDS[0].1);
        return TDT_MINUS_TAI + tai_utc;
    }

    let (_, offset, mjd_ref, rate) = RUBBER_SECONDS
        .iter()
        .rev()
        .find(|(start, ..)| jd >= *start)
        .copied()
        .unwrap_or(RUBBER_SECONDS[0]);
    TDT_MINUS_TAI + offset + (jd - JD_TO_MJD - mjd_ref) * rate
}

/// UTC Julian Date corresponding to a TDT Julian Date.
pub fn utc_from_tdt(jd_tdt: JulianDate) -> JulianDate {
    jd_tdt - td_minus_utc(jd_tdt) / SECONDS_PER_DAY
}

pub fn jd_to_mjd(jd: JulianDate) -> MJD {
    jd - JD_TO_MJD
}

pub fn mjd_to_jd(mjd: MJD) -> JulianDate {
    mjd + JD_TO_MJD
}

/// Year and fractional day-of-year of a UTC Julian Date, as the TLE epoch
/// field wants them (January 1st is day 1).
pub(crate) fn tle_epoch_fields(jd_utc: JulianDate) -> (i32, f64) {
    let epoch = Epoch::from_mjd_utc(jd_to_mjd(jd_utc));
    let (year, ..) = epoch.to_gregorian_utc();
    let jan1_mjd = Epoch::from_gregorian_utc_at_midnight(year, 1, 1).to_mjd_utc_days();
    (year, jd_to_mjd(jd_utc) - jan1_mjd + 1.)
}
