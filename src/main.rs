use std::fs::File;
use std::io::{self, BufWriter};
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use tlefit::ephemeris::EphemerisFile;
use tlefit::fit::report::write_report;
use tlefit::fit::{FitDriver, FitParams};
use tlefit::TleFitError;

/// Fit SGP4/SDP4 two-line element sets to an ephemeris of geocentric state
/// vectors.
#[derive(Parser, Debug)]
#[command(name = "tlefit", version, about)]
struct Args {
    /// Input ephemeris file (header, comments, then `jd x y z vx vy vz`)
    input: Utf8PathBuf,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<Utf8PathBuf>,

    /// Output frequency: input vectors per fitted TLE
    #[arg(short = 'f', long, default_value_t = 10)]
    freq: usize,

    /// NORAD catalog number (otherwise scraped from the input header)
    #[arg(short, long)]
    norad: Option<u32>,

    /// International designator, e.g. 97034A
    #[arg(short, long)]
    intl_desig: Option<String>,

    /// Least-squares iterations per window
    #[arg(short = 'z', long, default_value_t = 15)]
    iterations: usize,

    /// Initial Levenberg-Marquardt damping
    #[arg(short = 'l', long, default_value_t = 0.)]
    lambda0: f64,

    /// Iteration index from which the damping drops to zero
    #[arg(long, default_value_t = 0)]
    damped_iterations: usize,

    /// Fit bstar as a seventh parameter (also selects the eighth-order
    /// model)
    #[arg(short = '7', long)]
    fit_bstar: bool,

    /// Request the eighth-order model variant
    #[arg(short = '8', long)]
    sgp8: bool,

    /// Force SGP4 for all orbits, never SDP4
    #[arg(short = 'g', long)]
    sgp4_only: bool,

    /// High-precision state-vector passthrough ("type h")
    #[arg(short = 'H', long)]
    high_precision: bool,

    /// Move each element set to apogee before fitting
    #[arg(short, long)]
    apogee: bool,

    /// Reserved; accepted without effect
    #[arg(short = 'p', long)]
    params_to_set: Option<i32>,

    /// Verbosity (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn fit_params(args: &Args) -> Result<FitParams, TleFitError> {
    let mut builder = FitParams::builder()
        .output_freq(args.freq)
        .n_iterations(args.iterations)
        .lambda0(args.lambda0)
        .n_damped(args.damped_iterations)
        .use_sgp8(args.sgp8 || args.fit_bstar)
        .sgp4_only(args.sgp4_only)
        .high_precision(args.high_precision)
        .adjust_to_apogee(args.apogee);
    if args.fit_bstar {
        builder = builder.n_fit_params(7);
    }
    if let Some(norad) = args.norad {
        builder = builder.norad_number(norad);
    }
    if let Some(intl) = &args.intl_desig {
        builder = builder.intl_desig(intl);
    }
    builder.build()
}

fn main() -> Result<(), TleFitError> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let params = fit_params(&args)?;
    let ephemeris = EphemerisFile::from_path(&args.input)?;
    let driver = FitDriver::new(params.clone());

    let progress = if args.output.is_some() {
        let bar = ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} {msg}").expect("static template"),
        );
        bar.set_message(format!(
            "fitting {} windows",
            ephemeris.rows.len() / params.output_freq.max(1)
        ));
        bar.enable_steady_tick(Duration::from_millis(120));
        Some(bar)
    } else {
        None
    };

    let summary = driver.run(&ephemeris);

    if let Some(bar) = progress {
        bar.finish_with_message(format!(
            "{} TLEs written, worst residual {:.2} km",
            summary.tles_written(),
            summary.worst_residual_km
        ));
    }

    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            write_report(&mut out, &ephemeris, &params, &summary)?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_report(&mut out, &ephemeris, &params, &summary)?;
        }
    }
    Ok(())
}
