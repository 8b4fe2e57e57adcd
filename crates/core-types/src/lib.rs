pub mod error;
pub mod structs;
pub mod validation;

// Re-export the core types to provide a clean public API.
pub use error::FieldError;
pub use structs::{ConsolidatedSnapshot, Course, Enrollment, EnrollmentRecord, Student};
pub use validation::EnrollmentLine;
