//! Write operations for run results

// standard library
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// crate modules
use crate::error::Result;
use crate::summary::RunSummary;

// critmc modules
use critmc_geometry::Flux;

/// Write the flux array to a plain text file
///
/// Values are written as a whitespace separated list, each followed by a
/// single space. Each group starts on a new line, as does each row of `x`,
/// and each `y` column within it. The `z` values of a column are on the same
/// line.
///
/// This is a raw dump meant for external plotting tools, with no header or
/// metadata. For a viewer ready file see
/// [write_vtk()](critmc_geometry::write_vtk).
///
/// ```no_run
/// # use critmc_geometry::Flux;
/// # use critmc_transport::write_flux_ascii;
/// let flux = Flux::new(2, [3, 3, 3]);
/// write_flux_ascii(&flux, "./flux.txt").unwrap();
/// ```
pub fn write_flux_ascii<P: AsRef<Path>>(flux: &Flux, path: P) -> Result<()> {
    let mut writer = init_writer(path)?;

    for group in flux.to_nested() {
        writeln!(writer)?;
        for plane in group {
            writeln!(writer)?;
            for column in plane {
                writeln!(writer)?;
                for value in column {
                    write!(writer, "{value} ")?;
                }
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// Write a [RunSummary] to a JSON file
///
/// ```no_run
/// # use critmc_transport::{write_summary_json, RunSummary};
/// let summary = RunSummary::default();
/// write_summary_json(&summary, "./summary.json").unwrap();
/// ```
pub fn write_summary_json<P: AsRef<Path>>(summary: &RunSummary, path: P) -> Result<()> {
    let writer = init_writer(path)?;
    serde_json::to_writer_pretty(writer, summary)?;
    Ok(())
}

/// Initialise a writer from anything that can be turned into a path
fn init_writer<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>> {
    let file = File::create(path)?;
    Ok(BufWriter::new(file))
}
