use thiserror::Error;

#[derive(Error, Debug)]
pub enum TleFitError {
    #[error("invalid mean elements: eccentricity {eccentricity}, mean motion {mean_motion} rad/min")]
    InvalidElements { eccentricity: f64, mean_motion: f64 },

    #[error("state vector does not describe a closed orbit (eccentricity {0})")]
    OpenOrbit(f64),

    #[error("bootstrap produced no usable candidate in {iterations} iterations")]
    BootstrapDiverged { iterations: usize },

    #[error("singular normal equations: least-squares solve failed")]
    SolveFailed,

    #[error("SGP4 propagation failed: {0}")]
    Propagation(String),

    #[error("ephemeris epoch JD {0} outside the supported range 1956..2050")]
    EphemerisOutOfRange(f64),

    #[error("malformed ephemeris input at line {line}: {reason}")]
    InputParseError { line: usize, reason: String },

    #[error("invalid fit parameter: {0}")]
    InvalidFitParameter(String),

    #[error("unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}
