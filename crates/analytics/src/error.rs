use database::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Failed to read enrollment data: {0}")]
    Database(#[from] DbError),
}
