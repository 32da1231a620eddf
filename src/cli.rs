//! This module contains the command-line interface [`Cli`] parser for managing students, courses,
//! attendance, and payments.

use crate::models::{PaymentStatus, Student, parse_date};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// The command line configuration struct, where the command-line interface parser is automatically
/// derived by [`clap::Parser`].
#[derive(Parser, Debug)]
#[command(name = "attendance", about = "Student attendance tracking")]
pub struct Cli {
    /// Path of the sqlite3 database, overriding the configured one.
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// The different commands available for managing student attendance records.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show quick statistics, recent attendance, and percentages per student.
    Dashboard,

    /// Show the roster.
    Roster {
        /// Show every column instead of only IDs and names.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Add a new student to the roster.
    AddStudent(StudentArgs),

    /// Synchronize the roster with a students CSV file. Students missing from the file are removed
    /// unless they have attendance records.
    SyncStudents { file_path: PathBuf },

    /// List the courses.
    Courses,

    /// Add a course, or rename an existing one.
    AddCourse {
        course_id: String,
        course_name: String,
    },

    /// Mark attendance for every student of a course. Students not listed as absent are marked
    /// present.
    Mark {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        #[arg(long)]
        course: String,

        /// IDs of the students who were absent.
        #[arg(long, num_args = 1..)]
        absent: Vec<String>,
    },

    /// Show the attendance taken on a date.
    Day {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Show an attendance report for a date range, optionally exporting it as CSV.
    Report(ReportArgs),

    /// List payments.
    Payments,

    /// Record a payment.
    AddPayment {
        student_id: String,
        amount: i32,

        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        #[arg(long, value_enum, default_value_t = PaymentStatus::Pending)]
        status: PaymentStatus,
    },

    /// Replace all students, courses, and attendance with the CSV files in a directory.
    Import {
        /// Directory holding `students.csv`, `courses.csv`, and `attendance.csv`.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct StudentArgs {
    pub student_id: String,
    pub name: String,
    pub course: String,
    pub year: i32,
}

impl From<StudentArgs> for Student {
    fn from(args: StudentArgs) -> Self {
        Self {
            student_id: args.student_id,
            name: args.name,
            course: args.course,
            year: args.year,
        }
    }
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// First date of the report. Defaults to 30 days before the end date.
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last date of the report. Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Only include this course.
    #[arg(long)]
    pub course: Option<String>,

    /// Write the report rows as CSV into this directory, or the configured export directory when
    /// none is given.
    #[arg(long, num_args = 0..=1)]
    pub export: Option<Option<PathBuf>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_mark_with_absentees() {
        let cli = Cli::parse_from([
            "attendance",
            "mark",
            "--date",
            "2024-03-01",
            "--course",
            "Math",
            "--absent",
            "S2",
            "S3",
        ]);

        match cli.command {
            Command::Mark {
                date,
                course,
                absent,
            } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 1));
                assert_eq!(course, "Math");
                assert_eq!(absent, vec!["S2", "S3"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn export_directory_is_optional() {
        let export = |args: &[&str]| match Cli::parse_from(args).command {
            Command::Report(report) => report.export,
            other => panic!("unexpected command {other:?}"),
        };

        assert_eq!(export(&["attendance", "report"]), None);
        assert_eq!(export(&["attendance", "report", "--export"]), Some(None));
        assert_eq!(
            export(&["attendance", "report", "--export", "out"]),
            Some(Some(PathBuf::from("out")))
        );
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(Cli::try_parse_from(["attendance", "day", "--date", "01/03/2024"]).is_err());
    }
}
