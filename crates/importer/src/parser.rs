use core_types::{ConsolidatedSnapshot, Course, EnrollmentLine, FieldError, Student};
use std::collections::HashSet;
use std::fmt;

/// A line that failed validation, with its 1-based position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    pub line: usize,
    pub reason: FieldError,
}

impl fmt::Display for RejectedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// The pure result of validating and deduplicating a batch of lines.
#[derive(Debug, Clone, Default)]
pub struct ParsedBatch {
    pub snapshot: ConsolidatedSnapshot,
    /// Distinct students in the order they first appear.
    pub students: Vec<Student>,
    /// Distinct courses in the order they first appear.
    pub courses: Vec<Course>,
    /// Distinct `(student_id, course_code)` pairs in the order they first appear.
    pub pairs: Vec<(String, String)>,
    pub lines_read: usize,
    pub accepted: usize,
    pub blank_lines: Vec<usize>,
    pub rejected: Vec<RejectedLine>,
}

/// Validates every line and folds the valid ones into a batch.
///
/// Blank lines are set aside before validation. The first name seen for a
/// student id or course code is kept; later differing names are ignored.
pub fn parse_lines<I, S>(lines: I) -> ParsedBatch
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut batch = ParsedBatch::default();
    let mut seen_pairs = HashSet::new();

    for (index, raw) in lines.into_iter().enumerate() {
        let line_no = index + 1;
        let raw = raw.as_ref();
        batch.lines_read += 1;

        if raw.trim().is_empty() {
            batch.blank_lines.push(line_no);
            continue;
        }

        let parsed = match EnrollmentLine::parse(raw) {
            Ok(parsed) => parsed,
            Err(reason) => {
                batch.rejected.push(RejectedLine {
                    line: line_no,
                    reason,
                });
                continue;
            }
        };
        batch.accepted += 1;

        let student = parsed.student();
        if batch.snapshot.insert_student(student.clone()) {
            batch.students.push(student);
        }
        let course = parsed.course();
        if batch.snapshot.insert_course(course.clone()) {
            batch.courses.push(course);
        }

        let pair = (parsed.student_id, parsed.course_code);
        if seen_pairs.insert(pair.clone()) {
            batch.pairs.push(pair);
        }
    }

    batch
}
