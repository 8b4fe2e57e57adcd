//! Lookups and single-record inserts over the record store.

pub mod error;

pub use error::QueryError;

use core_types::{ConsolidatedSnapshot, Course, EnrollmentLine, EnrollmentRecord, Student};
use database::{DbError, DbRepository};
use std::collections::HashMap;

/// A student together with every course they are enrolled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDetails {
    pub student: Student,
    pub courses: Vec<Course>,
}

/// Which ends of a manually inserted enrollment had to be created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub student_created: bool,
    pub course_created: bool,
}

#[derive(Debug, Clone)]
pub struct QueryService {
    repo: DbRepository,
}

impl QueryService {
    pub fn new(repo: DbRepository) -> Self {
        Self { repo }
    }

    /// `Ok(None)` when no student has this id.
    pub async fn find_student(&self, id: &str) -> Result<Option<StudentDetails>, QueryError> {
        let Some(student) = self.repo.students.get_by_key(id).await? else {
            return Ok(None);
        };
        let courses = self.repo.enrollments.courses_for_student(&student.id).await?;
        Ok(Some(StudentDetails { student, courses }))
    }

    /// Enrolls a student in a course, creating either one if it is missing.
    ///
    /// Fields follow the same rules as import lines. An existing student or
    /// course keeps its stored name. Enrolling the same pair twice fails with
    /// `QueryError::DuplicateEnrollment`.
    pub async fn insert_enrollment(
        &self,
        student_id: &str,
        student_name: &str,
        course_code: &str,
        course_name: &str,
    ) -> Result<InsertOutcome, QueryError> {
        let line = EnrollmentLine::from_fields(student_id, student_name, course_code, course_name)?;
        let mut outcome = InsertOutcome::default();

        if !self.repo.students.exists(&line.student_id).await? {
            self.repo.students.create(&line.student()).await?;
            outcome.student_created = true;
        }

        if !self.repo.courses.exists(&line.course_code).await? {
            self.repo.courses.create(&line.course()).await?;
            outcome.course_created = true;
        }

        let duplicate = || QueryError::DuplicateEnrollment {
            student_id: line.student_id.clone(),
            course_code: line.course_code.clone(),
        };

        if self
            .repo
            .enrollments
            .exists(&line.student_id, &line.course_code)
            .await?
        {
            return Err(duplicate());
        }

        match self
            .repo
            .enrollments
            .create(&line.student_id, &line.course_code)
            .await
        {
            Ok(()) => {}
            Err(DbError::Duplicate(_)) => return Err(duplicate()),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            student_id = %line.student_id,
            course_code = %line.course_code,
            "Inserted enrollment."
        );
        Ok(outcome)
    }

    /// Every enrollment joined with its student and course, in storage order.
    pub async fn all_records(&self) -> Result<Vec<EnrollmentRecord>, QueryError> {
        let students: HashMap<String, Student> = self
            .repo
            .students
            .get_all()
            .await?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let courses: HashMap<String, Course> = self
            .repo
            .courses
            .get_all()
            .await?
            .into_iter()
            .map(|c| (c.code.clone(), c))
            .collect();

        let records = self
            .repo
            .enrollments
            .get_all()
            .await?
            .into_iter()
            .filter_map(|e| {
                match (students.get(&e.student_id), courses.get(&e.course_code)) {
                    (Some(student), Some(course)) => Some(EnrollmentRecord {
                        student: student.clone(),
                        course: course.clone(),
                    }),
                    _ => {
                        tracing::warn!(
                            student_id = %e.student_id,
                            course_code = %e.course_code,
                            "Enrollment references a missing student or course."
                        );
                        None
                    }
                }
            })
            .collect();

        Ok(records)
    }

    /// The enrollment rows of every student in the snapshot, students in key order.
    pub async fn records_for_snapshot(
        &self,
        snapshot: &ConsolidatedSnapshot,
    ) -> Result<Vec<EnrollmentRecord>, QueryError> {
        let mut records = Vec::new();
        for student in snapshot.students.values() {
            let courses = self.repo.enrollments.courses_for_student(&student.id).await?;
            records.extend(courses.into_iter().map(|course| EnrollmentRecord {
                student: student.clone(),
                course,
            }));
        }
        Ok(records)
    }
}
