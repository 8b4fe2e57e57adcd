//! Text tables for the console and the one-shot commands.

use analytics::GeneralStatistics;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use core_types::{EnrollmentRecord, Student};
use queries::StudentDetails;

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn records_table(records: &[EnrollmentRecord]) -> Table {
    let mut table = table(vec!["STUDENT ID", "STUDENT NAME", "COURSE CODE", "COURSE NAME"]);
    for record in records {
        table.add_row(vec![
            record.student.id.clone(),
            record.student.name.clone(),
            record.course.code.clone(),
            record.course.name.clone(),
        ]);
    }
    table
}

pub fn students_table(students: &[Student]) -> Table {
    let mut table = table(vec!["#", "STUDENT ID", "NAME"]);
    for (i, student) in students.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), student.id.clone(), student.name.clone()]);
    }
    table
}

/// One row per student with the number of courses they take.
pub fn course_counts_table(rows: &[(Student, u64)]) -> Table {
    let mut table = table(vec!["STUDENT ID", "NAME", "COURSES"]);
    for (student, count) in rows {
        table.add_row(vec![student.id.clone(), student.name.clone(), count.to_string()]);
    }
    table
}

pub fn student_details(details: &StudentDetails) -> String {
    let mut out = format!(
        "Student ID: {}\nName: {}\nEnrolled courses: {}\n",
        details.student.id,
        details.student.name,
        details.courses.len()
    );

    if details.courses.is_empty() {
        out.push_str("The student is not enrolled in any course.\n");
        return out;
    }

    let mut table = table(vec!["#", "CODE", "COURSE"]);
    for (i, course) in details.courses.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), course.code.clone(), course.name.clone()]);
    }
    out.push_str(&table.to_string());
    out.push('\n');
    out
}

pub fn statistics(stats: &GeneralStatistics) -> String {
    let mut totals = table(vec!["METRIC", "VALUE"]);
    totals
        .add_row(vec!["Students".to_string(), stats.total_students.to_string()])
        .add_row(vec!["Courses".to_string(), stats.total_courses.to_string()])
        .add_row(vec![
            "Enrollments".to_string(),
            stats.total_enrollments.to_string(),
        ]);
    let mut out = format!("{totals}\n");

    if !stats.top_students.is_empty() {
        let mut top = table(vec!["#", "STUDENT", "ID", "COURSES"]);
        for (i, ranked) in stats.top_students.iter().enumerate() {
            top.add_row(vec![
                (i + 1).to_string(),
                ranked.entity.name.clone(),
                ranked.entity.id.clone(),
                ranked.count.to_string(),
            ]);
        }
        out.push_str(&format!("\nTOP 5 - Students with the most courses:\n{top}\n"));
    }

    if !stats.top_courses.is_empty() {
        let mut top = table(vec!["#", "COURSE", "CODE", "STUDENTS"]);
        for (i, ranked) in stats.top_courses.iter().enumerate() {
            top.add_row(vec![
                (i + 1).to_string(),
                ranked.entity.name.clone(),
                ranked.entity.code.clone(),
                ranked.count.to_string(),
            ]);
        }
        out.push_str(&format!("\nTOP 5 - Courses with the most students:\n{top}\n"));
    }

    for skipped in &stats.skipped {
        out.push_str(&format!(
            "Note: {} '{}' was left out of the rankings ({}).\n",
            skipped.kind, skipped.key, skipped.reason
        ));
    }

    out
}
