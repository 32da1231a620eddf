//! Reading the bulk import CSV files and writing attendance reports back out.
//!
//! The import directory holds `students.csv`, `courses.csv`, and `attendance.csv`, with headers
//! matching the field names of [`Student`], [`Course`], and [`NewAttendance`]. Extra columns are
//! ignored, which lets an exported report be fed straight back in as `attendance.csv`.

use crate::error::Result;
use crate::manager::AttendanceManager;
use crate::models::{AttendanceRow, Course, NewAttendance, Student};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

pub const STUDENTS_FILE: &str = "students.csv";
pub const COURSES_FILE: &str = "courses.csv";
pub const ATTENDANCE_FILE: &str = "attendance.csv";

/// The full contents of an import directory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportData {
    pub students: Vec<Student>,
    pub courses: Vec<Course>,
    pub attendance: Vec<NewAttendance>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub students: usize,
    pub courses: usize,
    pub attendance: usize,
}

impl ImportData {
    /// Reads all three CSV files from `dir`.
    pub fn read_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        Ok(Self {
            students: read_csv(dir.join(STUDENTS_FILE))?,
            courses: read_csv(dir.join(COURSES_FILE))?,
            attendance: read_csv(dir.join(ATTENDANCE_FILE))?,
        })
    }
}

/// Replaces all students, courses, and attendance with the CSV files in `dir`.
///
/// Nothing is changed unless every file parses and every row is stored.
pub fn import_dir(
    manager: &mut AttendanceManager,
    dir: impl AsRef<Path>,
) -> Result<ImportSummary> {
    let dir = dir.as_ref();

    let result = ImportData::read_dir(dir).and_then(|data| manager.replace_all(&data));
    if let Err(err) = &result {
        error!("Import from {} rolled back: {err}", dir.display());
    }

    result
}

/// Deserializes every row of the CSV file at `path`.
pub fn read_csv<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let path = path.as_ref();
    let file = fs::File::open(path)?;
    let rows = read_records(file)?;

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Deserializes every row of a CSV document with a header line.
pub fn read_records<T: DeserializeOwned, R: io::Read>(reader: R) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }

    Ok(rows)
}

/// Writes attendance rows as CSV with a header line.
pub fn write_rows<W: io::Write>(writer: W, rows: &[AttendanceRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// The name of a report exported on `date`, e.g. `attendance_report_20240301.csv`.
pub fn report_file_name(date: NaiveDate) -> String {
    format!("attendance_report_{}.csv", date.format("%Y%m%d"))
}

/// Exports `rows` into `dir` under a name stamped with `date`, returning the path written.
pub fn export_report(
    dir: impl AsRef<Path>,
    date: NaiveDate,
    rows: &[AttendanceRow],
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let path = dir.join(report_file_name(date));
    write_rows(fs::File::create(&path)?, rows)?;

    debug!("Exported {} rows to {}", rows.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;

    #[test]
    fn reads_students_with_padding() {
        let csv = "student_id, name, course, year\nS1, Ada Lovelace, Math, 2024\n";
        let students: Vec<Student> = read_records(csv.as_bytes()).unwrap();

        assert_eq!(
            students,
            vec![Student {
                student_id: "S1".into(),
                name: "Ada Lovelace".into(),
                course: "Math".into(),
                year: 2024,
            }]
        );
    }

    #[test]
    fn attendance_ignores_extra_columns() {
        let csv = "date,student_id,name,course,status\n2024-03-01,S1,Ada,Math,Present\n";
        let records: Vec<NewAttendance> = read_records(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, Status::Present);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn rejects_unknown_status() {
        let csv = "date,student_id,course,status\n2024-03-01,S1,Math,Late\n";
        assert!(read_records::<NewAttendance, _>(csv.as_bytes()).is_err());
    }

    #[test]
    fn report_name_is_stamped() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(report_file_name(date), "attendance_report_20240301.csv");
    }

    #[test]
    fn written_rows_have_header() {
        let rows = vec![AttendanceRow {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            student_id: "S1".into(),
            name: "Ada".into(),
            course: "Math".into(),
            status: Status::Absent,
        }];

        let mut out = Vec::new();
        write_rows(&mut out, &rows).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "date,student_id,name,course,status\n2024-03-01,S1,Ada,Math,Absent\n"
        );
    }
}
