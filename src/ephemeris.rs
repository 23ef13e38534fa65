//! Input ephemeris reader.
//!
//! The input is an ASCII ephemeris of geocentric state vectors:
//!
//! ```text
//! JD_tdt_first  step_days  total_lines
//! <comment lines ... until a line starting with "Created ">
//! jd_tdt  x  y  z  vx  vy  vz          (AU and AU/day, J2000 equatorial)
//! ...
//! ```
//!
//! Comment lines are preserved for the output stream and scraped for
//! metadata: an object name on an `Orbital elements: ` line, a NORAD number
//! after a `NORAD ` token, and an international designator from a
//! `YYYY-NNN` pattern. Epochs outside 1956–2050 and malformed lines are
//! fatal to the whole run.

use std::fs::File;
use std::io::{BufRead, BufReader};

use camino::Utf8Path;

use crate::constants::{JulianDate, JAN_1956, JAN_2050};
use crate::state_vector::StateVector;
use crate::tlefit_errors::TleFitError;

/// One input sample: its TDT epoch and the state vector.
#[derive(Debug, Clone, Copy)]
pub struct EphemerisRow {
    pub jd_tdt: JulianDate,
    pub state: StateVector,
}

/// A parsed input ephemeris.
#[derive(Debug, Clone)]
pub struct EphemerisFile {
    pub jd_first_tdt: JulianDate,
    pub step_days: f64,
    /// Line count announced by the header (the actual row count governs).
    pub total_lines: usize,
    pub rows: Vec<EphemerisRow>,
    /// Header comment lines, preserved verbatim.
    pub comments: Vec<String>,
    pub object_name: Option<String>,
    pub norad_number: Option<u32>,
    pub intl_desig: Option<String>,
}

impl EphemerisFile {
    pub fn from_path(path: &Utf8Path) -> Result<Self, TleFitError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, TleFitError> {
        let mut lines = reader.lines().enumerate();

        let (_, header) = lines.next().ok_or_else(|| TleFitError::InputParseError {
            line: 1,
            reason: "empty input".into(),
        })?;
        let header = header?;
        let (jd_first_tdt, step_days, total_lines) = parse_header(&header)?;
        check_epoch_range(jd_first_tdt)?;

        let mut file = EphemerisFile {
            jd_first_tdt,
            step_days,
            total_lines,
            rows: Vec::new(),
            comments: Vec::new(),
            object_name: None,
            norad_number: None,
            intl_desig: None,
        };

        let mut in_data = false;
        for (index, line) in lines {
            let line = line?;
            let line_number = index + 1;

            if !in_data {
                file.scrape_metadata(&line);
                file.comments.push(line.clone());
                if line.starts_with("Created ") {
                    in_data = true;
                }
                continue;
            }

            if line.trim().is_empty() {
                continue;
            }
            let row = parse_row(&line, line_number)?;
            check_epoch_range(row.jd_tdt)?;
            file.rows.push(row);
        }

        Ok(file)
    }

    fn scrape_metadata(&mut self, line: &str) {
        if let Some(name) = line.strip_prefix("Orbital elements: ") {
            self.object_name = Some(name.trim().to_string());
        }
        if self.norad_number.is_none() {
            if let Some(position) = line.find("NORAD ") {
                let rest = &line[position + 6..];
                let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                if let Ok(number) = digits.parse() {
                    self.norad_number = Some(number);
                }
            }
        }
        if self.intl_desig.is_none() {
            self.intl_desig = scan_intl_desig(line);
        }
    }
}

/// International designator from a `YYYY-NNN...` pattern: two year digits
/// plus the four characters following the dash.
fn scan_intl_desig(line: &str) -> Option<String> {
    let bytes = line.as_bytes();
    for start in 0..bytes.len().saturating_sub(8) {
        let window = &bytes[start..];
        if window[..4].iter().all(u8::is_ascii_digit)
            && window[4] == b'-'
            && window[5].is_ascii_digit()
        {
            let year: u32 = line[start..start + 4].parse().ok()?;
            if year > 1900 {
                let launch = &line[start + 5..start + 9];
                return Some(format!("{}{}", &line[start + 2..start + 4], launch));
            }
        }
    }
    None
}

fn check_epoch_range(jd: JulianDate) -> Result<(), TleFitError> {
    if !(JAN_1956..=JAN_2050).contains(&jd) {
        return Err(TleFitError::EphemerisOutOfRange(jd));
    }
    Ok(())
}

fn parse_header(line: &str) -> Result<(f64, f64, usize), TleFitError> {
    let error = |reason: &str| TleFitError::InputParseError {
        line: 1,
        reason: reason.into(),
    };
    let mut tokens = line.split_whitespace();
    let jd = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| error("missing or invalid first-epoch JD"))?;
    let step = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| error("missing or invalid step size"))?;
    let total = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| error("missing or invalid line count"))?;
    Ok((jd, step, total))
}

fn parse_row(line: &str, line_number: usize) -> Result<EphemerisRow, TleFitError> {
    let values: Vec<f64> = line
        .split_whitespace()
        .map(str::parse::<f64>)
        .collect::<Result<_, _>>()
        .map_err(|e| TleFitError::InputParseError {
            line: line_number,
            reason: e.to_string(),
        })?;
    if values.len() != 7 {
        return Err(TleFitError::InputParseError {
            line: line_number,
            reason: format!("expected 7 fields, found {}", values.len()),
        });
    }

    let mut components = [0.; 6];
    components.copy_from_slice(&values[1..]);
    Ok(EphemerisRow {
        jd_tdt: values[0],
        state: StateVector::from_components(components),
    })
}

#[cfg(test)]
mod ephemeris_test {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
2460000.5 0.01 4
Orbital elements: 1998-067A = NORAD 25544 (ISS)
Some free-form remark
Created Mon Feb 24 2023
2460000.50 4.5e-5 0.0 0.0 0.0 3.0e-3 1.0e-3
2460000.51 4.5e-5 1.0e-6 0.0 0.0 3.0e-3 1.0e-3

2460000.52 4.5e-5 2.0e-6 0.0 0.0 3.0e-3 1.0e-3
2460000.53 4.5e-5 3.0e-6 0.0 0.0 3.0e-3 1.0e-3
";

    #[test]
    fn test_parse_sample() {
        let file = EphemerisFile::from_reader(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(file.jd_first_tdt, 2_460_000.5);
        assert_eq!(file.step_days, 0.01);
        assert_eq!(file.total_lines, 4);
        assert_eq!(file.rows.len(), 4);
        assert_eq!(file.rows[2].jd_tdt, 2_460_000.52);
        assert_eq!(file.rows[3].state.position.y, 3.0e-6);
        assert_eq!(file.comments.len(), 3);
    }

    #[test]
    fn test_metadata_scraping() {
        let file = EphemerisFile::from_reader(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(
            file.object_name.as_deref(),
            Some("1998-067A = NORAD 25544 (ISS)")
        );
        assert_eq!(file.norad_number, Some(25_544));
        assert_eq!(file.intl_desig.as_deref(), Some("98067A"));
    }

    #[test]
    fn test_malformed_data_line_is_fatal() {
        let input = "2460000.5 0.01 1\nCreated now\n2460000.5 1 2 three 4 5 6\n";
        let result = EphemerisFile::from_reader(Cursor::new(input));
        assert!(matches!(
            result,
            Err(TleFitError::InputParseError { line: 3, .. })
        ));
    }

    #[test]
    fn test_wrong_field_count_is_fatal() {
        let input = "2460000.5 0.01 1\nCreated now\n2460000.5 1 2 3\n";
        assert!(EphemerisFile::from_reader(Cursor::new(input)).is_err());
    }

    #[test]
    fn test_out_of_range_epoch_is_fatal() {
        let input = "2400000.5 0.01 1\nCreated now\n2400000.5 1 0 0 0 0 0\n";
        assert!(matches!(
            EphemerisFile::from_reader(Cursor::new(input)),
            Err(TleFitError::EphemerisOutOfRange(_))
        ));
    }
}
