//! Plain data records for every table, plus the two closed status enumerations and their mapping
//! to SQLite `TEXT` columns.

use crate::error::Error;
use crate::schema::{attendance, courses, payments, students};
use chrono::NaiveDate;
use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// A student on the roster.
///
/// `course` is the free-text name of the course the student is enrolled in, not a reference into
/// the `courses` table.
#[derive(
    Queryable, Selectable, Insertable, Tabled, Serialize, Deserialize, Debug, Clone, PartialEq, Eq,
)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Student {
    pub student_id: String,
    pub name: String,
    pub course: String,
    pub year: i32,
}

#[derive(
    Queryable, Selectable, Insertable, Tabled, Serialize, Deserialize, Debug, Clone, PartialEq, Eq,
)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Course {
    pub course_id: String,
    pub course_name: String,
}

/// A persisted attendance record.
#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = attendance)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Attendance {
    pub id: i32,
    pub date: NaiveDate,
    pub student_id: String,
    pub course: String,
    pub status: Status,
}

/// An attendance record that has not been stored yet. This is also the row format of
/// `attendance.csv`.
#[derive(Insertable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[diesel(table_name = attendance)]
pub struct NewAttendance {
    pub date: NaiveDate,
    pub student_id: String,
    pub course: String,
    pub status: Status,
}

impl From<Attendance> for NewAttendance {
    fn from(record: Attendance) -> Self {
        Self {
            date: record.date,
            student_id: record.student_id,
            course: record.course,
            status: record.status,
        }
    }
}

/// An attendance record joined with the name of its student, as shown in reports and written to
/// exported CSV files.
#[derive(Queryable, Tabled, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRow {
    pub date: NaiveDate,
    pub student_id: String,
    pub name: String,
    pub course: String,
    pub status: Status,
}

#[derive(Queryable, Selectable, Tabled, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Payment {
    pub id: i32,
    pub student_id: String,
    pub amount: i32,
    pub payment_date: NaiveDate,
    pub status: PaymentStatus,
}

#[derive(Insertable)]
#[diesel(table_name = payments)]
pub struct NewPayment<'a> {
    pub student_id: &'a str,
    pub amount: i32,
    pub payment_date: NaiveDate,
    pub status: PaymentStatus,
}

/// Whether a student was at a class meeting.
#[derive(
    AsExpression,
    FromSqlRow,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
)]
#[diesel(sql_type = Text)]
pub enum Status {
    Present,
    Absent,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Present => "Present",
            Status::Absent => "Absent",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(Status::Present),
            "absent" => Ok(Status::Absent),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

impl ToSql<Text, Sqlite> for Status {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for Status {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let value = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        Ok(value.parse::<Status>()?)
    }
}

/// Payment state. New payments start out as [`PaymentStatus::Pending`].
#[derive(
    AsExpression,
    FromSqlRow,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
)]
#[diesel(sql_type = Text)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

impl ToSql<Text, Sqlite> for PaymentStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for PaymentStatus {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let value = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        Ok(value.parse::<PaymentStatus>()?)
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Present".parse::<Status>().unwrap(), Status::Present);
        assert_eq!(" absent ".parse::<Status>().unwrap(), Status::Absent);
        assert!(matches!(
            "Excused".parse::<Status>(),
            Err(Error::InvalidStatus(s)) if s == "Excused"
        ));
    }

    #[test]
    fn payment_status_defaults_to_pending() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
        assert_eq!("PAID".parse::<PaymentStatus>().unwrap(), PaymentStatus::Paid);
        assert!("Refunded".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn dates_must_be_iso() {
        assert_eq!(
            parse_date("2024-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert!(matches!(parse_date("03/01/2024"), Err(Error::InvalidDate(_))));
    }
}
