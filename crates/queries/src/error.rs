use core_types::FieldError;
use database::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] FieldError),

    #[error("Student '{student_id}' is already enrolled in '{course_code}'.")]
    DuplicateEnrollment {
        student_id: String,
        course_code: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}
