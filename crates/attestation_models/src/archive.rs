//! On-disk archive of a fetched record set.
//!
//! The archive is the same `{ "data": [...] }` shape the API serves, written
//! as indented JSON. Saving a downloaded feed and re-loading it later must
//! yield the same record set, so the offline classification path behaves
//! exactly like the online one.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::AttestationRecord;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct Archive {
    data: Vec<AttestationRecord>,
}

/// Write records to `path` as an indented JSON archive.
pub fn save_archive<P: AsRef<Path>>(
    path: P,
    records: &[AttestationRecord],
) -> Result<(), ArchiveError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let archive = Archive {
        data: records.to_vec(),
    };
    serde_json::to_writer_pretty(writer, &archive)?;
    Ok(())
}

/// Read a record set back from an archive written by [`save_archive`]
/// (or downloaded verbatim from the API).
pub fn load_archive<P: AsRef<Path>>(path: P) -> Result<Vec<AttestationRecord>, ArchiveError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let archive: Archive = serde_json::from_reader(reader)?;
    Ok(archive.data)
}
