//! # Enrollment Analytics Engine
//!
//! Aggregate questions over the enrollment relation: how many courses a
//! student takes, who takes a course, and the overall statistics with top-5
//! rankings of students and courses.
//!
//! ## Architectural Principles
//!
//! - **Store-agnostic:** the engine reads through the `database` capability
//!   traits and never issues SQL itself.
//! - **Best effort per entity:** one unreadable count drops that entity from
//!   the rankings and is reported in `GeneralStatistics::skipped`; it does not
//!   abort the whole computation.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: counts, course listings and `general_statistics`.
//! - `GeneralStatistics`, `Ranked`, `SkippedEntity`: the results.
//! - `rank_top`: the stable descending top-N ranking.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::{EntityKind, GeneralStatistics, Ranked, SkippedEntity, TOP_N, rank_top};
