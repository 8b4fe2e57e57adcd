use crate::parser::RejectedLine;
use database::DbError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to read '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No valid data found in the input ({} line(s) rejected).", rejected.len())]
    NoValidData { rejected: Vec<RejectedLine> },

    #[error("Failed to save the imported data: {0}")]
    Database(#[from] DbError),
}
