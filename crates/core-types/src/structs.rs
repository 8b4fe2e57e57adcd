use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

/// A student, keyed by their national id number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: String,
    pub name: String,
}

impl Student {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// An academic offering, keyed by its course code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub code: String,
    pub name: String,
}

impl Course {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// The `(student, course)` relation as stored in the `enrollments` table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub student_id: String,
    pub course_code: String,
}

/// A fully joined enrollment row. Listings and exports are built from these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub student: Student,
    pub course: Course,
}

/// Every student and course seen in the most recent import.
///
/// Entries are only ever added, never replaced: the first name seen for a key
/// is the one that sticks. Maps are ordered by key so that anything derived
/// from a snapshot is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidatedSnapshot {
    pub students: BTreeMap<String, Student>,
    pub courses: BTreeMap<String, Course>,
}

impl ConsolidatedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the student unless the id is already present. Returns `true` if it was added.
    pub fn insert_student(&mut self, student: Student) -> bool {
        if self.students.contains_key(&student.id) {
            return false;
        }
        self.students.insert(student.id.clone(), student);
        true
    }

    /// Adds the course unless the code is already present. Returns `true` if it was added.
    pub fn insert_course(&mut self, course: Course) -> bool {
        if self.courses.contains_key(&course.code) {
            return false;
        }
        self.courses.insert(course.code.clone(), course);
        true
    }

    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.get(id)
    }

    pub fn course(&self, code: &str) -> Option<&Course> {
        self.courses.get(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_name_seen_wins() {
        let mut snapshot = ConsolidatedSnapshot::new();
        assert!(snapshot.insert_student(Student::new("123456", "Ana Lopez")));
        assert!(!snapshot.insert_student(Student::new("123456", "Ana María López")));
        assert!(snapshot.insert_course(Course::new("MAT101", "Calculus")));
        assert!(!snapshot.insert_course(Course::new("MAT101", "Calculus I")));

        assert_eq!(snapshot.student("123456").unwrap().name, "Ana Lopez");
        assert_eq!(snapshot.course("MAT101").unwrap().name, "Calculus");
        assert_eq!(snapshot.students.len(), 1);
        assert_eq!(snapshot.courses.len(), 1);
    }

    #[test]
    fn new_snapshot_is_empty() {
        let snapshot = ConsolidatedSnapshot::new();
        assert!(snapshot.students.is_empty() && snapshot.courses.is_empty());
        assert!(snapshot.student("123456").is_none());
    }
}
