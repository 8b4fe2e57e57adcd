use core_types::{Course, Student};
use std::fmt;

/// How many entries a ranking keeps.
pub const TOP_N: usize = 5;

/// An entity paired with the count it is ranked by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked<T> {
    pub entity: T,
    pub count: u64,
}

impl<T> Ranked<T> {
    pub fn new(entity: T, count: u64) -> Self {
        Self { entity, count }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Student,
    Course,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Student => write!(f, "student"),
            EntityKind::Course => write!(f, "course"),
        }
    }
}

/// An entity left out of a ranking because its count could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntity {
    pub kind: EntityKind,
    pub key: String,
    pub reason: String,
}

/// Summary figures over the whole enrollment relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralStatistics {
    pub total_students: usize,
    pub total_courses: usize,
    /// Sum of the per-student counts that could be read.
    pub total_enrollments: u64,
    /// Students with the most courses, at most [`TOP_N`].
    pub top_students: Vec<Ranked<Student>>,
    /// Courses with the most students, at most [`TOP_N`].
    pub top_courses: Vec<Ranked<Course>>,
    pub skipped: Vec<SkippedEntity>,
}

/// Keeps the `limit` highest counts, dropping zero counts.
///
/// The sort is stable, so equal counts stay in the order they were collected.
pub fn rank_top<T>(candidates: Vec<Ranked<T>>, limit: usize) -> Vec<Ranked<T>> {
    let mut ranked: Vec<Ranked<T>> = candidates.into_iter().filter(|r| r.count > 0).collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}
