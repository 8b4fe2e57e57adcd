use crate::error::FieldError;
use crate::structs::{Course, Student};

const FIELD_NAMES: [&str; 4] = ["student id", "student name", "course code", "course name"];
const STUDENT_ID_MIN: usize = 6;
const STUDENT_ID_MAX: usize = 12;
const MIN_TEXT_LEN: usize = 2;

/// One validated enrollment tuple with every field already trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentLine {
    pub student_id: String,
    pub student_name: String,
    pub course_code: String,
    pub course_name: String,
}

impl EnrollmentLine {
    /// Parses `student_id,student_name,course_code,course_name`.
    ///
    /// There is no quoting or escaping: a line with a comma inside a name has
    /// more than four fields and is rejected.
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        let fields: Vec<&str> = line.split(',').collect();
        let [student_id, student_name, course_code, course_name] = fields.as_slice() else {
            return Err(FieldError::FieldCount(fields.len()));
        };
        Self::from_fields(student_id, student_name, course_code, course_name)
    }

    /// Validates four loose fields, as typed in by hand.
    pub fn from_fields(
        student_id: &str,
        student_name: &str,
        course_code: &str,
        course_name: &str,
    ) -> Result<Self, FieldError> {
        let trimmed = [
            student_id.trim(),
            student_name.trim(),
            course_code.trim(),
            course_name.trim(),
        ];

        if let Some(index) = trimmed.iter().position(|f| f.is_empty()) {
            return Err(FieldError::EmptyField {
                index: index + 1,
                name: FIELD_NAMES[index],
            });
        }

        let [student_id, student_name, course_code, course_name] = trimmed;

        let id_len = student_id.chars().count();
        if !(STUDENT_ID_MIN..=STUDENT_ID_MAX).contains(&id_len) {
            return Err(FieldError::StudentIdLength(student_id.to_string()));
        }

        for (field, value) in [
            ("student name", student_name),
            ("course code", course_code),
            ("course name", course_name),
        ] {
            if value.chars().count() < MIN_TEXT_LEN {
                return Err(FieldError::TooShort {
                    field,
                    value: value.to_string(),
                });
            }
        }

        Ok(Self {
            student_id: student_id.to_string(),
            student_name: student_name.to_string(),
            course_code: course_code.to_string(),
            course_name: course_name.to_string(),
        })
    }

    pub fn student(&self) -> Student {
        Student::new(&self.student_id, &self.student_name)
    }

    pub fn course(&self) -> Course {
        Course::new(&self.course_code, &self.course_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_trims_a_valid_line() {
        let line = EnrollmentLine::parse(" 123456 , Ana Lopez ,MAT101, Calculus ").unwrap();
        assert_eq!(line.student_id, "123456");
        assert_eq!(line.student_name, "Ana Lopez");
        assert_eq!(line.course_code, "MAT101");
        assert_eq!(line.course_name, "Calculus");
    }

    #[test]
    fn rejects_wrong_field_counts() {
        assert_eq!(EnrollmentLine::parse("bad,line"), Err(FieldError::FieldCount(2)));
        assert_eq!(
            EnrollmentLine::parse("123456,Ana,MAT101,Calculus,extra"),
            Err(FieldError::FieldCount(5))
        );
    }

    #[test]
    fn rejects_empty_fields() {
        assert_eq!(
            EnrollmentLine::parse("123456,  ,MAT101,Calculus"),
            Err(FieldError::EmptyField {
                index: 2,
                name: "student name"
            })
        );
    }

    #[test]
    fn student_id_length_bounds() {
        assert_eq!(
            EnrollmentLine::parse("12345,Ana Lopez,MAT101,Calculus"),
            Err(FieldError::StudentIdLength("12345".to_string()))
        );
        assert!(EnrollmentLine::parse("123456,Ana Lopez,MAT101,Calculus").is_ok());
        assert!(EnrollmentLine::parse("123456789012,Ana Lopez,MAT101,Calculus").is_ok());
        assert!(EnrollmentLine::parse("1234567890123,Ana Lopez,MAT101,Calculus").is_err());
    }

    #[test]
    fn short_text_fields_are_rejected() {
        assert_eq!(
            EnrollmentLine::parse("123456,Ana Lopez,M,Calculus"),
            Err(FieldError::TooShort {
                field: "course code",
                value: "M".to_string()
            })
        );
        assert!(matches!(
            EnrollmentLine::parse("123456,A,MAT101,Calculus"),
            Err(FieldError::TooShort { field: "student name", .. })
        ));
    }
}
