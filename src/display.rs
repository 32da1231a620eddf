//! Pretty printing of rosters, attendance, and reports as tables.
//!
//! Each function renders into a `String` so the command-line front end decides where the output
//! goes.

use crate::error::Result;
use crate::manager::AttendanceManager;
use crate::models::{Attendance, AttendanceRow, Student};
use crate::stats::{self, Report};
use chrono::NaiveDate;
use std::collections::HashMap;
use tabled::{Table, Tabled, settings::Style};

/// How many records the dashboard lists under "recent attendance".
const RECENT_RECORDS: usize = 5;

fn table<T: Tabled>(rows: impl IntoIterator<Item = T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::modern());
    table.to_string()
}

/// Attaches student names to attendance records, dropping records whose student is unknown.
fn with_names(records: Vec<Attendance>, roster: &[Student]) -> Vec<AttendanceRow> {
    let names: HashMap<&str, &str> = roster
        .iter()
        .map(|s| (s.student_id.as_str(), s.name.as_str()))
        .collect();

    records
        .into_iter()
        .filter_map(|record| {
            let name = names.get(record.student_id.as_str())?.to_string();
            Some(AttendanceRow {
                date: record.date,
                student_id: record.student_id,
                name,
                course: record.course,
                status: record.status,
            })
        })
        .collect()
}

/// Quick statistics, the most recent attendance, and the attendance percentage of every student.
pub fn dashboard(manager: &mut AttendanceManager) -> Result<String> {
    let roster = manager.load_students()?;
    let records = manager.load_attendance()?;

    let mut out = format!(
        "Student Attendance Dashboard\nTotal students: {}\nTotal attendance records: {}\n\n",
        roster.len(),
        records.len()
    );

    if records.is_empty() {
        out.push_str("No attendance records available");
        return Ok(out);
    }

    let recent = with_names(stats::recent(&records, RECENT_RECORDS), &roster);
    out.push_str(&format!("Recent attendance:\n{}\n\n", table(recent)));

    let percentages = stats::calculate_attendance_stats(&records);
    out.push_str(&format!("Attendance by student:\n{}", table(percentages)));

    Ok(out)
}

/// The roster. Without `verbose`, only IDs and names are shown.
pub fn roster(manager: &mut AttendanceManager, verbose: bool) -> Result<String> {
    let roster = manager.load_students()?;

    if roster.is_empty() {
        return Ok("No students on the roster".to_string());
    }

    let rendered = if verbose {
        table(roster)
    } else {
        #[derive(Tabled)]
        struct SimpleStudent {
            student_id: String,
            name: String,
        }

        table(roster.into_iter().map(|student| SimpleStudent {
            student_id: student.student_id,
            name: student.name,
        }))
    };

    Ok(format!("Roster:\n{rendered}"))
}

pub fn courses(manager: &mut AttendanceManager) -> Result<String> {
    let courses = manager.load_courses()?;

    if courses.is_empty() {
        return Ok("No courses".to_string());
    }

    Ok(format!("Courses:\n{}", table(courses)))
}

/// Everything recorded on `date`.
pub fn day_attendance(manager: &mut AttendanceManager, date: NaiveDate) -> Result<String> {
    let rows = manager.attendance_on(date)?;

    if rows.is_empty() {
        return Ok(format!("No attendance records for {date}"));
    }

    Ok(format!("Attendance on {date}:\n{}", table(rows)))
}

pub fn report(report: &Report) -> String {
    if report.trend.is_empty() {
        return "No attendance records found for the selected criteria.".to_string();
    }

    format!(
        "Attendance overview:\n{}\n\nDaily attendance:\n{}\n\nStudent-wise attendance:\n{}",
        table([report.overview.clone()]),
        table(report.trend.iter().cloned()),
        table(report.students.iter().cloned()),
    )
}

pub fn payments(manager: &mut AttendanceManager) -> Result<String> {
    let payments = manager.load_payments()?;

    if payments.is_empty() {
        return Ok("No payments recorded".to_string());
    }

    Ok(format!("Payments:\n{}", table(payments)))
}
