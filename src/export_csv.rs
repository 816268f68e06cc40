//! CSV dump of a joint score histogram: one `away,home,count` row per non-empty cell.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::{Result, SimError};
use crate::histogram::JointHistogram;

#[derive(Debug, Serialize)]
struct CellRecord {
    away: usize,
    home: usize,
    count: u32,
}

/// Write the non-empty cells of `hist` to `writer`, header first, row-major order.
pub fn write_histogram_csv<W: Write>(hist: &JointHistogram<'_>, writer: W) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    out.write_record(["away", "home", "count"])?;
    for (away, home, count) in hist.iter_nonzero() {
        out.serialize(CellRecord { away, home, count })?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn export_histogram_csv(hist: &JointHistogram<'_>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_histogram_csv(hist, file)?;
    tracing::info!(path = %path.display(), "histogram exported");
    Ok(())
}
