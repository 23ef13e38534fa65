pub mod bootstrap;
pub mod constants;
pub mod elements;
pub mod ephemeris;
pub mod equinoctial;
pub mod fit;
mod kepler;
pub mod least_squares;
pub mod propagator;
pub mod ref_frames;
pub mod simplex;
mod state_vector;
pub mod time;
pub mod tle_format;
pub mod tlefit_errors;
pub mod window;

pub use bootstrap::{bootstrap_tle, BootstrapResult};
pub use elements::{EphemerisKind, TleElements};
pub use ephemeris::EphemerisFile;
pub use equinoctial::EquinoctialParams;
pub use fit::{FitDriver, FitParams, RunSummary};
pub use kepler::osculating_elements;
pub use propagator::{propagate, select_ephemeris, ModelKind};
pub use state_vector::StateVector;
pub use tlefit_errors::TleFitError;
