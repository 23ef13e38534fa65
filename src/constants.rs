// Constants
pub const DPI: f64 = 2. * std::f64::consts::PI;
pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const MINUTES_PER_DAY: f64 = 1_440.0;

/// Astronomical unit (km)
pub const AU: f64 = 149_597_870.7;
pub const AU_METERS: f64 = AU * 1000.;

/// Geocentric gravitational parameter, WGS-72 value (km^3/s^2)
pub const GM_EARTH_KM: f64 = 398_600.8;
/// Geocentric gravitational parameter in the working units (AU^3/day^2)
pub const GM_EARTH: f64 = GM_EARTH_KM * SECONDS_PER_DAY * SECONDS_PER_DAY / (AU * AU * AU);

pub const T2000: f64 = 2_451_545.0; // J2000 epoch as a Julian Date
pub const JD_TO_MJD: f64 = 2_400_000.5; // Julian Date -> Modified Julian Date offset

/// TLEs are not usable outside this epoch range
pub const JAN_1956: f64 = 2_435_473.5;
pub const JAN_2050: f64 = 2_469_807.5;

/// Orbits with a period of at least this many minutes take the deep-space model
pub const DEEP_SPACE_PERIOD_MIN: f64 = 225.0;

// type def
pub type Radian = f64;
pub type Kilometer = f64;
/// Julian Date
pub type JulianDate = f64;
/// Modified Julian Date
pub type MJD = f64;
