//! # Enrollment File Importer
//!
//! Turns raw `student_id,student_name,course_code,course_name` lines into
//! persisted students, courses and enrollments.
//!
//! Validation is per line and never fatal: bad lines are reported and
//! skipped. Persistence is not transactional, but every insert is preceded by
//! an existence check, so re-running an import on the same input is safe and
//! creates nothing new.

pub mod error;
pub mod parser;

pub use error::ImportError;
pub use parser::{ParsedBatch, RejectedLine, parse_lines};

use core_types::ConsolidatedSnapshot;
use database::DbRepository;
use std::path::Path;

/// What happened to each line of an import, and what was written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub lines_read: usize,
    pub accepted: usize,
    pub blank_lines: Vec<usize>,
    pub rejected: Vec<RejectedLine>,
    pub students_created: usize,
    pub courses_created: usize,
    pub enrollments_created: usize,
}

/// The result of a successful import. The snapshot is owned by the caller.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub snapshot: ConsolidatedSnapshot,
    pub report: ImportReport,
}

pub struct FileImporter {
    repo: DbRepository,
}

impl FileImporter {
    pub fn new(repo: DbRepository) -> Self {
        Self { repo }
    }

    /// Reads the whole file and imports its lines.
    pub async fn import_file(&self, path: &Path) -> Result<ImportOutcome, ImportError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ImportError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::info!(path = %path.display(), "Importing enrollment file.");
        self.import_lines(contents.lines()).await
    }

    /// Validates, deduplicates and persists a batch of lines.
    ///
    /// Fails with `ImportError::NoValidData` without touching the store when
    /// no line passes validation.
    pub async fn import_lines<I, S>(&self, lines: I) -> Result<ImportOutcome, ImportError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let batch = parse_lines(lines);

        for rejected in &batch.rejected {
            tracing::warn!(line = rejected.line, reason = %rejected.reason, "Skipping invalid line.");
        }

        if batch.accepted == 0 {
            return Err(ImportError::NoValidData {
                rejected: batch.rejected,
            });
        }

        let mut report = ImportReport {
            lines_read: batch.lines_read,
            accepted: batch.accepted,
            blank_lines: batch.blank_lines,
            rejected: batch.rejected,
            ..ImportReport::default()
        };

        // Students and courses first, so every enrollment has both ends in place.
        for student in &batch.students {
            if !self.repo.students.exists(&student.id).await? {
                self.repo.students.create(student).await?;
                report.students_created += 1;
            }
        }

        for course in &batch.courses {
            if !self.repo.courses.exists(&course.code).await? {
                self.repo.courses.create(course).await?;
                report.courses_created += 1;
            }
        }

        for (student_id, course_code) in &batch.pairs {
            if !self.repo.enrollments.exists(student_id, course_code).await? {
                self.repo.enrollments.create(student_id, course_code).await?;
                report.enrollments_created += 1;
            }
        }

        tracing::info!(
            accepted = report.accepted,
            rejected = report.rejected.len(),
            students_created = report.students_created,
            courses_created = report.courses_created,
            enrollments_created = report.enrollments_created,
            "Import finished."
        );

        Ok(ImportOutcome {
            snapshot: batch.snapshot,
            report,
        })
    }
}
