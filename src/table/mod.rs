//! Delimited (CSV) output for acquired samples and extracted job records.
//!
//! Every row type carries a fixed, named column schema. Files are written with
//! a header row and no index column, in insertion order.

pub mod timestamp;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unexpected header {found:?}, expected {expected:?}")]
    Header {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// A record with a fixed column layout.
///
/// `COLUMNS` must match the serde field names of the implementing type, in
/// declaration order.
pub trait TableRow: Serialize + DeserializeOwned {
    const COLUMNS: &'static [&'static str];
}

/// Writes rows as CSV to any writer, header first.
pub fn write_table<R: TableRow>(rows: &[R], writer: impl Write) -> Result<(), TableError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    // Header is written explicitly so an empty table still carries its schema
    wtr.write_record(R::COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes rows to `path`, creating parent directories as needed.
pub fn write_table_to_path<R: TableRow>(rows: &[R], path: &Path) -> Result<(), TableError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    write_table(rows, io::BufWriter::new(file))?;

    tracing::info!(path = %path.display(), rows = rows.len(), "Wrote table");
    Ok(())
}

/// Reads rows back, matching columns by header name.
///
/// Columns beyond `R::COLUMNS` are ignored; a missing column is reported by
/// the deserializer unless the row type defaults it.
pub fn read_table<R: TableRow>(reader: impl Read) -> Result<Vec<R>, TableError> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(reader);
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

pub fn read_table_from_path<R: TableRow>(path: &Path) -> Result<Vec<R>, TableError> {
    let file = File::open(path).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("failed to open '{}': {}", path.display(), e),
        )
    })?;
    read_table(io::BufReader::new(file))
}

/// Reads rows and additionally requires the header to equal `R::COLUMNS`.
pub fn read_table_strict<R: TableRow>(reader: impl Read) -> Result<Vec<R>, TableError> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(reader);

    let found: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if found != R::COLUMNS {
        return Err(TableError::Header {
            expected: R::COLUMNS.iter().map(|c| c.to_string()).collect(),
            found,
        });
    }

    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}
