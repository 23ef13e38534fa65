//! Output text stream: preserved header comments, per-window diagnostics,
//! the two-line element blocks, and the run-final residual histogram.

use std::io::{self, Write};

use itertools::Itertools;

use crate::ephemeris::EphemerisFile;
use crate::tle_format::write_tle;

use super::driver::{RunSummary, HISTOGRAM_EDGES_KM};
use super::FitParams;

/// Write the complete output stream for a finished run.
pub fn write_report<W: Write>(
    out: &mut W,
    ephemeris: &EphemerisFile,
    params: &FitParams,
    summary: &RunSummary,
) -> io::Result<()> {
    let run_at = hifitime::Epoch::now()
        .map(|e| e.to_string())
        .unwrap_or_else(|_| "unknown".into());
    writeln!(out, "# Made by tlefit {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "# Run at {run_at}")?;

    let mjd_start = ephemeris.jd_first_tdt - 2_400_000.5;
    writeln!(
        out,
        "# Ephem range: {:.6} {:.6} {:.6}",
        mjd_start,
        mjd_start + ephemeris.step_days * ephemeris.total_lines as f64,
        ephemeris.step_days * params.output_freq as f64,
    )?;
    for comment in &ephemeris.comments {
        writeln!(out, "# {comment}")?;
    }

    if params.sgp4_only {
        writeln!(
            out,
            "# SGP4 only: these TLEs are _not_ fitted to SDP4,  even for"
        )?;
        writeln!(
            out,
            "# deep-space TLEs.  These may not work with your software."
        )?;
    }
    writeln!(out, "#")?;
    writeln!(
        out,
        "# 1 NoradU COSPAR   Epoch.epoch     dn/dt/2  d2n/dt2/6 BSTAR    T El# C"
    )?;
    writeln!(
        out,
        "# 2 NoradU Inclina RAAscNode Eccent  ArgPeri MeanAno  MeanMotion Rev# C"
    )?;

    for report in &summary.windows {
        writeln!(out)?;
        match &report.tle {
            Some(tle) => {
                writeln!(out, "# Worst residual: {:.2} km", report.worst_residual_km)?;
                if report.solve_failed {
                    writeln!(
                        out,
                        "# ERROR in least-squares solution: MJD {:.6}",
                        report.mjd_tdt
                    )?;
                }
                writeln!(out, "# MJD {:.6}", report.mjd_tdt)?;
                if let Some(name) = &ephemeris.object_name {
                    writeln!(out, "{name}")?;
                }
                let (line1, line2) = write_tle(tle);
                writeln!(out, "{line1}")?;
                writeln!(out, "{line2}")?;
            }
            None => {
                writeln!(
                    out,
                    "# FAILED (bootstrap diverged) for MJD {:.6}",
                    report.mjd_tdt
                )?;
            }
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "Worst residual in entire run: {:.2} km on MJD {:.1}",
        summary.worst_residual_km, summary.worst_mjd
    )?;
    let edges = HISTOGRAM_EDGES_KM
        .iter()
        .map(|edge| format!("{:<6}", *edge as u64))
        .join("");
    writeln!(out, "      {edges}km")?;
    let counts = summary
        .histogram
        .counts
        .iter()
        .map(|count| format!("{count:6}"))
        .join("");
    writeln!(out, "{counts}")?;
    Ok(())
}
