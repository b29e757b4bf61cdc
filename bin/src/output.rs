//! CSV output

use field::{MomentResult, YearResult};
use photosynthesis_core::common::Float;
use std::io::{self, Write};

/// Writes the sunlight and sky light of one moment, one row each.
///
/// * `out`    - Destination.
/// * `names`  - Sensor names.
/// * `result` - Light per sensor.
pub fn write_moment(
    out: &mut dyn Write,
    names: &[String],
    result: &MomentResult,
) -> io::Result<()> {
    write_row(out, &["light"], names)?;
    write_values(out, &["sunlight"], &result.sunlight)?;
    write_values(out, &["diffuse light"], &result.diffuse)
}

/// Writes the sunlight time series followed by the daily sky light,
/// separated by an empty line.
///
/// * `out`    - Destination.
/// * `names`  - Sensor names.
/// * `result` - Light per sensor.
pub fn write_year(out: &mut dyn Write, names: &[String], result: &YearResult) -> io::Result<()> {
    write_row(out, &["day", "time (s)"], names)?;
    for row in result.sunlight.iter() {
        write_values(out, &[&row.day.to_string(), &row.time.to_string()], &row.values)?;
    }

    writeln!(out)?;
    write_row(out, &["day"], names)?;
    for row in result.diffuse.iter() {
        write_values(out, &[&row.day.to_string()], &row.values)?;
    }
    Ok(())
}

fn write_row(out: &mut dyn Write, keys: &[&str], cells: &[String]) -> io::Result<()> {
    let line: Vec<&str> = keys.iter().copied().chain(cells.iter().map(String::as_str)).collect();
    writeln!(out, "{}", line.join(","))
}

fn write_values(out: &mut dyn Write, keys: &[&str], values: &[Float]) -> io::Result<()> {
    let cells: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
    write_row(out, keys, &cells)
}
