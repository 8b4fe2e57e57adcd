//! The interactive, numbered menu.

use crate::render;
use analytics::AnalyticsEngine;
use anyhow::{Context, bail};
use configuration::{ExportFormat, ExportSettings, ImportSettings};
use core_types::ConsolidatedSnapshot;
use database::DbRepository;
use importer::{FileImporter, ImportError, RejectedLine};
use queries::{QueryError, QueryService};
use std::io::{self, BufRead, Write};

const NO_FILE_LOADED: &str = "Import an enrollment file first (option 1).";

/// Drives the menu over any line source and sink.
///
/// The snapshot of the last successful import lives here and is replaced by
/// every new import.
pub struct Console<R, W> {
    input: R,
    output: W,
    import_settings: ImportSettings,
    export_settings: ExportSettings,
    importer: FileImporter,
    analytics: AnalyticsEngine,
    queries: QueryService,
    snapshot: Option<ConsolidatedSnapshot>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(
        repo: DbRepository,
        import_settings: ImportSettings,
        export_settings: ExportSettings,
        input: R,
        output: W,
    ) -> Self {
        Self {
            input,
            output,
            import_settings,
            export_settings,
            importer: FileImporter::new(repo.clone()),
            analytics: AnalyticsEngine::new(repo.clone()),
            queries: QueryService::new(repo),
            snapshot: None,
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs until the user picks "Exit" or the input ends.
    ///
    /// Operation failures are printed and the menu is shown again; only a
    /// failure to read input or write output ends the loop with an error.
    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "\n=== UNIVERSITY ENROLLMENT SYSTEM ===")?;
            writeln!(self.output, "1. Import enrollment file")?;
            writeln!(self.output, "2. Show number of courses per student")?;
            writeln!(self.output, "3. Filter students by course")?;
            writeln!(self.output, "4. Export data to JSON")?;
            writeln!(self.output, "5. Export data to CSV")?;
            writeln!(self.output, "6. Advanced queries")?;
            writeln!(self.output, "7. Exit")?;

            let Some(choice) = self.prompt("Select an option: ")? else {
                return Ok(());
            };

            let result = match choice.as_str() {
                "1" => self.import_file().await,
                "2" => self.show_course_counts().await,
                "3" => self.filter_by_course().await,
                "4" => self.export(ExportFormat::Json).await,
                "5" => self.export(ExportFormat::Csv).await,
                "6" => match self.advanced_menu().await? {
                    MenuExit::Back => Ok(()),
                    MenuExit::EndOfInput => return Ok(()),
                },
                "7" => {
                    writeln!(self.output, "Exiting...")?;
                    return Ok(());
                }
                _ => {
                    writeln!(self.output, "Invalid option. Please try again.")?;
                    Ok(())
                }
            };
            self.report(result)?;
        }
    }

    async fn advanced_menu(&mut self) -> io::Result<MenuExit> {
        loop {
            writeln!(self.output, "\n=== ADVANCED QUERIES ===")?;
            writeln!(self.output, "1. Find student by id")?;
            writeln!(self.output, "2. General statistics")?;
            writeln!(self.output, "3. Insert new record")?;
            writeln!(self.output, "4. Show all records")?;
            writeln!(self.output, "5. Back to main menu")?;

            let Some(choice) = self.prompt("Select an option: ")? else {
                return Ok(MenuExit::EndOfInput);
            };

            let result = match choice.as_str() {
                "1" => self.find_student().await,
                "2" => self.show_statistics().await,
                "3" => self.insert_record().await,
                "4" => self.show_all_records().await,
                "5" => return Ok(MenuExit::Back),
                _ => {
                    writeln!(self.output, "Invalid option. Please try again.")?;
                    Ok(())
                }
            };
            self.report(result)?;
        }
    }

    /// Prints an operation failure without leaving the menu.
    fn report(&mut self, result: anyhow::Result<()>) -> io::Result<()> {
        if let Err(e) = result {
            tracing::error!(error = %format!("{e:#}"), "Menu operation failed.");
            writeln!(self.output, "\nError: {e:#}")?;
        }
        Ok(())
    }

    /// `None` once the input is exhausted. The answer is trimmed.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        // Non-UTF-8 input is decoded lossily.
        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&line).trim().to_string()))
    }

    /// Like `prompt`, but running out of input is an error for the current operation.
    fn ask(&mut self, label: &str) -> anyhow::Result<String> {
        self.prompt(label)?.context("input ended unexpectedly")
    }

    fn print_rejections(&mut self, rejected: &[RejectedLine]) -> io::Result<()> {
        for line in rejected {
            writeln!(self.output, "Warning: {line}")?;
        }
        Ok(())
    }

    async fn import_file(&mut self) -> anyhow::Result<()> {
        let input = self.ask("\nEnter the path of the enrollment file: ")?;
        let path = self.import_settings.resolve(&input);

        let outcome = match self.importer.import_file(&path).await {
            Ok(outcome) => outcome,
            Err(ImportError::NoValidData { rejected }) => {
                self.print_rejections(&rejected)?;
                bail!("no valid lines found in {}", path.display());
            }
            Err(e) => return Err(e.into()),
        };

        let report = &outcome.report;
        self.print_rejections(&report.rejected)?;
        if !report.blank_lines.is_empty() {
            let lines: Vec<String> = report.blank_lines.iter().map(usize::to_string).collect();
            writeln!(self.output, "Skipped blank line(s): {}", lines.join(", "))?;
        }

        writeln!(self.output, "\nFile imported successfully!")?;
        writeln!(self.output, "Students registered: {}", outcome.snapshot.students.len())?;
        writeln!(self.output, "Courses registered: {}", outcome.snapshot.courses.len())?;
        writeln!(
            self.output,
            "New records: {} student(s), {} course(s), {} enrollment(s)",
            report.students_created, report.courses_created, report.enrollments_created
        )?;

        self.snapshot = Some(outcome.snapshot);
        Ok(())
    }

    async fn show_course_counts(&mut self) -> anyhow::Result<()> {
        let Some(snapshot) = &self.snapshot else {
            writeln!(self.output, "\n{NO_FILE_LOADED}")?;
            return Ok(());
        };

        let mut rows = Vec::with_capacity(snapshot.students.len());
        for student in snapshot.students.values() {
            let count = self.analytics.count_enrollments_for(&student.id).await?;
            rows.push((student.clone(), count));
        }

        writeln!(self.output, "\n=== COURSES PER STUDENT ===")?;
        writeln!(self.output, "{}", render::course_counts_table(&rows))?;
        Ok(())
    }

    async fn filter_by_course(&mut self) -> anyhow::Result<()> {
        if self.snapshot.is_none() {
            writeln!(self.output, "\n{NO_FILE_LOADED}")?;
            return Ok(());
        }

        let code = self.ask("\nEnter the course code: ")?;
        let Some(course) = self.snapshot.as_ref().and_then(|s| s.course(&code)).cloned() else {
            writeln!(self.output, "Course not found. Try a valid code.")?;
            return Ok(());
        };

        let students = self.analytics.students_enrolled_in(&course.code).await?;

        writeln!(
            self.output,
            "\n=== STUDENTS ENROLLED IN {} ({}) ===",
            course.name, course.code
        )?;
        if students.is_empty() {
            writeln!(self.output, "No students are enrolled in this course.")?;
            return Ok(());
        }
        writeln!(self.output, "{}", render::students_table(&students))?;
        writeln!(self.output, "Total: {} student(s)", students.len())?;
        Ok(())
    }

    async fn export(&mut self, format: ExportFormat) -> anyhow::Result<()> {
        let Some(snapshot) = &self.snapshot else {
            writeln!(self.output, "\n{NO_FILE_LOADED}")?;
            return Ok(());
        };

        let records = self.queries.records_for_snapshot(snapshot).await?;
        let path = self.export_settings.path_for(format);
        exporter::export_to_file(&records, format, &path)
            .with_context(|| format!("exporting {format} to {}", path.display()))?;

        writeln!(self.output, "\nData exported successfully to {}", path.display())?;
        Ok(())
    }

    async fn find_student(&mut self) -> anyhow::Result<()> {
        let id = self.ask("\nEnter the student id: ")?;
        if id.is_empty() {
            writeln!(self.output, "The student id cannot be empty.")?;
            return Ok(());
        }

        match self.queries.find_student(&id).await? {
            Some(details) => {
                writeln!(self.output, "\n=== STUDENT INFORMATION ===")?;
                write!(self.output, "{}", render::student_details(&details))?;
            }
            None => writeln!(self.output, "No student found with id: {id}")?,
        }
        Ok(())
    }

    async fn show_statistics(&mut self) -> anyhow::Result<()> {
        let stats = self.analytics.general_statistics().await?;
        writeln!(self.output, "\n=== GENERAL STATISTICS ===")?;
        write!(self.output, "{}", render::statistics(&stats))?;
        Ok(())
    }

    async fn insert_record(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "\n=== INSERT NEW RECORD ===")?;
        let student_id = self.ask("Enter the student id: ")?;
        let student_name = self.ask("Enter the student name: ")?;
        let course_code = self.ask("Enter the course code: ")?;
        let course_name = self.ask("Enter the course name: ")?;

        match self
            .queries
            .insert_enrollment(&student_id, &student_name, &course_code, &course_name)
            .await
        {
            Ok(_) => writeln!(self.output, "Record inserted successfully!")?,
            Err(e @ (QueryError::DuplicateEnrollment { .. } | QueryError::InvalidRecord(_))) => {
                writeln!(self.output, "Record rejected: {e}")?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    async fn show_all_records(&mut self) -> anyhow::Result<()> {
        let records = self.queries.all_records().await?;
        if records.is_empty() {
            writeln!(self.output, "\nThere are no records in the database.")?;
            return Ok(());
        }

        writeln!(self.output, "\n=== ALL RECORDS ({}) ===", records.len())?;
        writeln!(self.output, "{}", render::records_table(&records))?;
        Ok(())
    }
}

enum MenuExit {
    Back,
    EndOfInput,
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::connect_in_memory;
    use std::io::Cursor;
    use std::path::Path;

    fn settings(data_dir: &Path, output_dir: &Path) -> (ImportSettings, ExportSettings) {
        (
            ImportSettings {
                data_dir: data_dir.to_path_buf(),
            },
            ExportSettings {
                output_dir: output_dir.to_path_buf(),
                json_file: "enrollments.json".to_string(),
                csv_file: "enrollments.csv".to_string(),
            },
        )
    }

    async fn run_script(script: &str, data_dir: &Path, output_dir: &Path) -> String {
        let repo = DbRepository::new(connect_in_memory().await.unwrap());
        let (import, export) = settings(data_dir, output_dir);
        let mut console = Console::new(
            repo,
            import,
            export,
            Cursor::new(script.as_bytes().to_vec()),
            Vec::new(),
        );
        console.run().await.unwrap();
        String::from_utf8(console.into_output()).unwrap()
    }

    fn write_sample(dir: &Path) {
        std::fs::write(
            dir.join("sample.txt"),
            "123456,Ana Lopez,MAT101,Calculus\n223456,Ben Diaz,MAT101,Calculus\n\nbad,line\n",
        )
        .unwrap();
    }

    #[tokio::test]
    async fn menu_requires_an_import_first() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_script("2\n4\n7\n", dir.path(), dir.path()).await;

        assert_eq!(out.matches(NO_FILE_LOADED).count(), 2);
        assert!(out.contains("Exiting..."));
        assert!(!dir.path().join("enrollments.json").exists());
    }

    #[tokio::test]
    async fn import_filter_and_export() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(dir.path());

        let out = run_script("1\nsample.txt\n3\nMAT101\n3\nXYZ\n4\n5\n7\n", dir.path(), dir.path()).await;

        assert!(out.contains("Warning: line 4: expected 4 comma-separated fields, found 2"));
        assert!(out.contains("Skipped blank line(s): 3"));
        assert!(out.contains("Students registered: 2"));
        assert!(out.contains("Courses registered: 1"));
        assert!(out.contains("STUDENTS ENROLLED IN Calculus (MAT101)"));
        assert!(out.contains("Total: 2 student(s)"));
        assert!(out.contains("Course not found."));

        let json = std::fs::read_to_string(dir.path().join("enrollments.json")).unwrap();
        assert!(json.contains("\"cedula\": \"123456\""));
        let csv = std::fs::read_to_string(dir.path().join("enrollments.csv")).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[tokio::test]
    async fn advanced_queries_survive_failures() {
        let dir = tempfile::tempdir().unwrap();
        let script = "\
1
missing.txt
6
3
123456
Ana Lopez
MAT101
Calculus
3
123456
Ana Lopez
MAT101
Calculus
1
123456
1
999999
2
4
5
7
";
        let out = run_script(script, dir.path(), dir.path()).await;

        assert!(out.contains("Error: Failed to read"));
        assert!(out.contains("Record inserted successfully!"));
        assert!(out.contains("Record rejected: Student '123456' is already enrolled in 'MAT101'."));
        assert!(out.contains("Name: Ana Lopez"));
        assert!(out.contains("No student found with id: 999999"));
        assert!(out.contains("GENERAL STATISTICS"));
        assert!(out.contains("ALL RECORDS (1)"));
        assert!(out.contains("Exiting..."));
    }

    #[tokio::test]
    async fn non_utf8_input_is_just_an_invalid_option() {
        let dir = tempfile::tempdir().unwrap();
        let repo = DbRepository::new(connect_in_memory().await.unwrap());
        let (import, export) = settings(dir.path(), dir.path());
        let script = b"\xff\xfe\n7\n".to_vec();
        let mut console = Console::new(repo, import, export, Cursor::new(script), Vec::new());

        console.run().await.unwrap();

        let out = String::from_utf8(console.into_output()).unwrap();
        assert!(out.contains("Invalid option. Please try again."));
        assert!(out.contains("Exiting..."));
    }

    #[tokio::test]
    async fn end_of_input_leaves_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_script("6\n", dir.path(), dir.path()).await;
        assert!(out.contains("ADVANCED QUERIES"));
        assert!(!out.contains("Exiting..."));
    }
}
