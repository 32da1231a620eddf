//! Attendance aggregation.
//!
//! Everything here is a pure fold over a slice of [`Attendance`] records, so the same functions
//! serve the whole-history statistics as well as filtered reports. Empty input always produces an
//! empty (or zeroed) result rather than an error.

use crate::models::{Attendance, Status, Student};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tabled::Tabled;

/// Attendance totals for a single student.
#[derive(Tabled, Serialize, Debug, Clone, PartialEq)]
pub struct StudentStats {
    pub student_id: String,
    pub total: usize,
    pub present: usize,
    pub percentage: f64,
}

/// Attendance totals for a single class date.
#[derive(Tabled, Serialize, Debug, Clone, PartialEq)]
pub struct DailyAttendance {
    pub date: NaiveDate,
    pub total: usize,
    pub present: usize,
    pub percentage: f64,
}

/// Headline numbers of a report.
#[derive(Tabled, Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Overview {
    pub total_classes: usize,
    pub total_present: usize,
    pub total_absent: usize,
}

/// Per-student totals joined with the student's name.
#[derive(Tabled, Serialize, Debug, Clone, PartialEq)]
pub struct NamedStudentStats {
    pub student_id: String,
    pub name: String,
    pub total: usize,
    pub present: usize,
    pub percentage: f64,
}

/// Everything shown on an attendance report.
#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct Report {
    pub overview: Overview,
    pub trend: Vec<DailyAttendance>,
    pub students: Vec<NamedStudentStats>,
}

/// A predicate over attendance records, applied before aggregation.
///
/// Both date bounds are inclusive. A `None` bound or course matches everything.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub course: Option<String>,
}

impl AttendanceFilter {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            course: None,
        }
    }

    pub fn with_course(mut self, course: impl Into<String>) -> Self {
        self.course = Some(course.into());
        self
    }

    pub fn matches(&self, date: NaiveDate, course: &str) -> bool {
        self.start.is_none_or(|start| date >= start)
            && self.end.is_none_or(|end| date <= end)
            && self.course.as_deref().is_none_or(|c| c == course)
    }

    /// Returns the records that satisfy this filter, preserving their order.
    pub fn apply(&self, records: &[Attendance]) -> Vec<Attendance> {
        records
            .iter()
            .filter(|record| self.matches(record.date, &record.course))
            .cloned()
            .collect()
    }
}

/// `part / whole` as a percentage, rounded to two decimals with ties going to the even digit.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }

    let raw = part as f64 / whole as f64 * 100.0;
    (raw * 100.0).round_ties_even() / 100.0
}

/// Computes per-student totals, ordered by student ID.
///
/// Only students that appear in `records` are represented.
pub fn calculate_attendance_stats(records: &[Attendance]) -> Vec<StudentStats> {
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();

    for record in records {
        let (total, present) = counts.entry(record.student_id.as_str()).or_default();
        *total += 1;
        if record.status == Status::Present {
            *present += 1;
        }
    }

    counts
        .into_iter()
        .map(|(student_id, (total, present))| StudentStats {
            student_id: student_id.to_string(),
            total,
            present,
            percentage: percentage(present, total),
        })
        .collect()
}

/// Computes the share of present students per date, in chronological order.
pub fn daily_trend(records: &[Attendance]) -> Vec<DailyAttendance> {
    let mut counts: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();

    for record in records {
        let (total, present) = counts.entry(record.date).or_default();
        *total += 1;
        if record.status == Status::Present {
            *present += 1;
        }
    }

    counts
        .into_iter()
        .map(|(date, (total, present))| DailyAttendance {
            date,
            total,
            present,
            percentage: percentage(present, total),
        })
        .collect()
}

pub fn overview(records: &[Attendance]) -> Overview {
    let total_classes = records
        .iter()
        .map(|record| record.date)
        .collect::<BTreeSet<_>>()
        .len();
    let total_present = records
        .iter()
        .filter(|record| record.status == Status::Present)
        .count();

    Overview {
        total_classes,
        total_present,
        total_absent: records.len() - total_present,
    }
}

/// Returns the `n` most recent records, newest first. Records on the same date keep their
/// insertion order.
pub fn recent(records: &[Attendance], n: usize) -> Vec<Attendance> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
    sorted.truncate(n);
    sorted
}

/// Aggregates `records` into a [`Report`]. Students missing from `roster` are left out of the
/// per-student table but still count towards the overview and trend.
pub fn build_report(records: &[Attendance], roster: &[Student]) -> Report {
    let names: BTreeMap<&str, &str> = roster
        .iter()
        .map(|student| (student.student_id.as_str(), student.name.as_str()))
        .collect();

    let students = calculate_attendance_stats(records)
        .into_iter()
        .filter_map(|stats| {
            let name = names.get(stats.student_id.as_str())?.to_string();
            Some(NamedStudentStats {
                student_id: stats.student_id,
                name,
                total: stats.total,
                present: stats.present,
                percentage: stats.percentage,
            })
        })
        .collect();

    Report {
        overview: overview(records),
        trend: daily_trend(records),
        students,
    }
}
