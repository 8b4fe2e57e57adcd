//! JSON and CSV renderings of enrollment records.
//!
//! Both formats carry one entry per `(student, course)` pair. The field names
//! are fixed by the files downstream tools already consume.

pub mod error;

pub use error::ExportError;

use configuration::ExportFormat;
use core_types::EnrollmentRecord;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Header row of the CSV export.
pub const CSV_HEADER: [&str; 4] = [
    "CEDULA",
    "NOMBRE_ESTUDIANTE",
    "CODIGO_MATERIA",
    "NOMBRE_MATERIA",
];

#[derive(Serialize)]
struct StudentEntry<'a> {
    cedula: &'a str,
    nombre: &'a str,
}

#[derive(Serialize)]
struct CourseEntry<'a> {
    codigo: &'a str,
    nombre: &'a str,
}

#[derive(Serialize)]
struct RecordEntry<'a> {
    estudiante: StudentEntry<'a>,
    materia: CourseEntry<'a>,
}

impl<'a> From<&'a EnrollmentRecord> for RecordEntry<'a> {
    fn from(record: &'a EnrollmentRecord) -> Self {
        Self {
            estudiante: StudentEntry {
                cedula: &record.student.id,
                nombre: &record.student.name,
            },
            materia: CourseEntry {
                codigo: &record.course.code,
                nombre: &record.course.name,
            },
        }
    }
}

/// Pretty-printed JSON array. No records gives `[]`.
pub fn to_json(records: &[EnrollmentRecord]) -> Result<String, ExportError> {
    let entries: Vec<RecordEntry<'_>> = records.iter().map(RecordEntry::from).collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

/// Writes the header and one row per record.
pub fn write_csv<W: Write>(writer: W, records: &[EnrollmentRecord]) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;
    for record in records {
        csv.write_record([
            &record.student.id,
            &record.student.name,
            &record.course.code,
            &record.course.name,
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes `records` to `path` in the given format, creating parent
/// directories as needed. Returns the number of records written.
pub fn export_to_file(
    records: &[EnrollmentRecord],
    format: ExportFormat,
    path: &Path,
) -> Result<usize, ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Json => {
            writer.write_all(to_json(records)?.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        ExportFormat::Csv => write_csv(&mut writer, records)?,
    }
    writer.flush()?;

    tracing::info!(%format, path = %path.display(), records = records.len(), "Export written.");
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Course, Student};

    fn records() -> Vec<EnrollmentRecord> {
        vec![
            EnrollmentRecord {
                student: Student::new("123456", "Ana Lopez"),
                course: Course::new("MAT101", "Calculus"),
            },
            EnrollmentRecord {
                student: Student::new("223456", "Ben Diaz"),
                course: Course::new("FIS101", "Physics, Intro"),
            },
        ]
    }

    #[test]
    fn json_uses_the_published_field_names() {
        let json = to_json(&records()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["estudiante"]["cedula"], "123456");
        assert_eq!(value[0]["estudiante"]["nombre"], "Ana Lopez");
        assert_eq!(value[0]["materia"]["codigo"], "MAT101");
        assert_eq!(value[1]["materia"]["nombre"], "Physics, Intro");
        assert_eq!(value.as_array().unwrap().len(), 2);
        // Pretty-printed.
        assert!(json.contains("\n  {"));
    }

    #[test]
    fn json_of_nothing_is_an_empty_array() {
        assert_eq!(to_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn csv_has_header_and_quotes_embedded_commas() {
        let mut out = Vec::new();
        write_csv(&mut out, &records()).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "CEDULA,NOMBRE_ESTUDIANTE,CODIGO_MATERIA,NOMBRE_MATERIA",
                "123456,Ana Lopez,MAT101,Calculus",
                "223456,Ben Diaz,FIS101,\"Physics, Intro\"",
            ]
        );
    }

    #[test]
    fn export_to_file_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("enrollments.csv");

        let written = export_to_file(&records(), ExportFormat::Csv, &path).unwrap();

        assert_eq!(written, 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("CEDULA,NOMBRE_ESTUDIANTE"));
    }
}
