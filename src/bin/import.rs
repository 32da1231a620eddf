//! One-shot bulk import.
//!
//! Deletes every student, course, and attendance record and loads the CSV files from the
//! configured `data_dir` (or the directory given as the first argument) in their place. If any row
//! fails, the import is rolled back and the error is reported; the database is left untouched.

use anyhow::Result;
use attendance::{AttendanceManager, Settings, transfer};
use std::path::PathBuf;

pub fn main() -> Result<()> {
    attendance::init_tracing();

    let settings = Settings::load()?;
    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or(settings.data_dir);

    let mut manager = AttendanceManager::open(&settings.database_url)?;

    match transfer::import_dir(&mut manager, &dir) {
        Ok(summary) => println!(
            "Data imported successfully: {} students, {} courses, {} attendance records",
            summary.students, summary.courses, summary.attendance
        ),
        Err(err) => eprintln!("Error importing data: {err}"),
    }

    Ok(())
}
