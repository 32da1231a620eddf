use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Could not connect to the database: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{student_id} already has a {course} attendance record on {date}")]
    DuplicateAttendance {
        date: NaiveDate,
        student_id: String,
        course: String,
    },

    #[error("Attendance already marked for {course} on {date}")]
    AlreadySubmitted { date: NaiveDate, course: String },

    #[error("Student '{0}' is not on the roster")]
    UnknownStudent(String),

    #[error("Student '{0}' already exists")]
    StudentExists(String),

    #[error("Invalid status '{0}'")]
    InvalidStatus(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, Error>;
