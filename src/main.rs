use anyhow::{Context, Result};
use attendance::cli::{Cli, Command};
use attendance::models::{Course, Student};
use attendance::stats::AttendanceFilter;
use attendance::transfer;
use attendance::{AttendanceManager, Settings, display};
use chrono::{Days, Local};
use clap::Parser;

/// How far back a report reaches when no start date is given.
const DEFAULT_REPORT_DAYS: Days = Days::new(30);

fn main() -> Result<()> {
    attendance::init_tracing();

    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load settings")?;

    let database_url = cli.database_url.as_deref().unwrap_or(&settings.database_url);
    let mut manager = AttendanceManager::open(database_url)
        .with_context(|| format!("failed to open {database_url}"))?;

    let today = Local::now().date_naive();

    match cli.command {
        Command::Dashboard => println!("{}", display::dashboard(&mut manager)?),
        Command::Roster { verbose } => println!("{}", display::roster(&mut manager, verbose)?),
        Command::AddStudent(args) => {
            let student = Student::from(args);
            manager.add_student(&student)?;
            println!("Added {} ({})", student.name, student.student_id);
        }
        Command::SyncStudents { file_path } => {
            let roster: Vec<Student> = transfer::read_csv(&file_path)?;
            let summary = manager.save_students(&roster)?;
            println!(
                "Students added: {}, updated: {}, removed: {}, kept for their attendance: {}",
                summary.inserted, summary.updated, summary.removed, summary.retained
            );
        }
        Command::Courses => println!("{}", display::courses(&mut manager)?),
        Command::AddCourse {
            course_id,
            course_name,
        } => {
            manager.save_courses(&[Course {
                course_id,
                course_name,
            }])?;
            println!("Course saved");
        }
        Command::Mark {
            date,
            course,
            absent,
        } => {
            let date = date.unwrap_or(today);
            let absent: Vec<&str> = absent.iter().map(String::as_str).collect();

            match manager.mark_attendance(date, &course, &absent) {
                Ok(0) => println!("No students found for {course}."),
                Ok(marked) => println!("Attendance marked for {marked} students."),
                Err(err @ attendance::Error::AlreadySubmitted { .. }) => eprintln!("{err}"),
                Err(err) => return Err(err.into()),
            }
        }
        Command::Day { date } => {
            let date = date.unwrap_or(today);
            println!("{}", display::day_attendance(&mut manager, date)?);
        }
        Command::Report(args) => {
            let end = args.end.unwrap_or(today);
            let start = args
                .start
                .or_else(|| end.checked_sub_days(DEFAULT_REPORT_DAYS))
                .unwrap_or(end);

            let mut filter = AttendanceFilter::between(start, end);
            filter.course = args.course;

            let report = manager.report(&filter)?;
            println!("{}", display::report(&report));

            if let Some(dir) = args.export {
                let dir = dir.unwrap_or(settings.export_dir);
                let rows = manager.attendance_report_rows(&filter)?;
                let path = transfer::export_report(&dir, today, &rows)?;
                println!("Exported {} rows to {}", rows.len(), path.display());
            }
        }
        Command::Payments => println!("{}", display::payments(&mut manager)?),
        Command::AddPayment {
            student_id,
            amount,
            date,
            status,
        } => {
            let payment =
                manager.save_payment(&student_id, amount, date.unwrap_or(today), status)?;
            println!("Recorded payment {} ({})", payment.id, payment.status);
        }
        Command::Import { dir } => {
            let dir = dir.unwrap_or(settings.data_dir);
            match transfer::import_dir(&mut manager, &dir) {
                Ok(summary) => println!(
                    "Imported {} students, {} courses, and {} attendance records",
                    summary.students, summary.courses, summary.attendance
                ),
                Err(err) => eprintln!("Error importing data: {err}"),
            }
        }
    }

    Ok(())
}
