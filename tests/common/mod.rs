//! Test utilities: a throwaway database that is deleted when the test ends, even if it panics.

#![allow(dead_code)]

use attendance::AttendanceManager;
use attendance::models::{NewAttendance, Status, Student};
use chrono::NaiveDate;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestDb {
    pub manager: AttendanceManager,
    pub url: String,
    pub dir: PathBuf,
    _temp_dir: TempDir, // Keep alive to prevent cleanup
}

impl TestDb {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let url = temp_dir
            .path()
            .join("attendance.db")
            .to_string_lossy()
            .into_owned();
        let manager = AttendanceManager::open(&url).expect("open test database");

        Self {
            manager,
            url,
            dir: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        }
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

pub fn student(id: &str, name: &str, course: &str, year: i32) -> Student {
    Student {
        student_id: id.to_string(),
        name: name.to_string(),
        course: course.to_string(),
        year,
    }
}

pub fn record(day: &str, student_id: &str, course: &str, status: Status) -> NewAttendance {
    NewAttendance {
        date: date(day),
        student_id: student_id.to_string(),
        course: course.to_string(),
        status,
    }
}
