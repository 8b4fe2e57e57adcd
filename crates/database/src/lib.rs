//! # Enrollment Database Crate
//!
//! This crate is the record store of the application: a single SQLite file
//! holding students, courses and the enrollments that relate them.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. The rest of the workspace talks to the
//!   store through the capability traits in [`repository`], so services can be
//!   exercised against substitute stores.
//! - **Referential integrity:** the schema declares foreign keys and every
//!   connection enforces them.
//! - **Embedded schema:** migrations ship inside the binary and run at startup.
//!
//! ## Public API
//!
//! - `connect` / `connect_in_memory`: open a connection pool.
//! - `run_migrations`: bring the schema up to date.
//! - `Repository`, `EnrollmentStore`: the capability traits.
//! - `DbRepository`: one store per entity kind, sharing a pool.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, connect_in_memory, run_migrations};
pub use error::DbError;
pub use repository::{DbRepository, EnrollmentStore, Repository};
pub use sqlx::sqlite::SqlitePool;

#[cfg(test)]
mod tests {
    use super::*;
    use configuration::DatabaseSettings;

    #[tokio::test]
    async fn connect_creates_the_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enrollments.db");
        let settings = DatabaseSettings {
            url: format!("sqlite://{}", path.display()),
            max_connections: 2,
        };

        let pool = connect(&settings).await.unwrap();
        run_migrations(&pool).await.unwrap();
        // Migrations are idempotent.
        run_migrations(&pool).await.unwrap();

        assert!(path.exists());
        let repo = DbRepository::new(pool);
        assert!(repo.students.get_all().await.unwrap().is_empty());
    }
}
