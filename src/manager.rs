use crate::error::{Error, Result};
use crate::models::{
    Attendance, AttendanceRow, Course, NewAttendance, NewPayment, Payment, PaymentStatus, Status,
    Student,
};
use crate::schema::{CREATE_TABLES, attendance, courses, payments, students};
use crate::stats::{self, AttendanceFilter, Report, StudentStats};
use crate::transfer::{ImportData, ImportSummary};
use chrono::NaiveDate;
use diesel::connection::SimpleConnection;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// The columns of an [`AttendanceRow`], for queries joining `attendance` with `students`.
const ROW_COLUMNS: (
    attendance::date,
    attendance::student_id,
    students::name,
    attendance::course,
    attendance::status,
) = (
    attendance::date,
    attendance::student_id,
    students::name,
    attendance::course,
    attendance::status,
);

/// What an upsert did to the stored rows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SaveSummary {
    pub inserted: usize,
    pub updated: usize,
    /// Rows that were missing from the input and deleted.
    pub removed: usize,
    /// Rows that were missing from the input but kept because other records depend on them.
    pub retained: usize,
}

/// The manager for recording, modifying, and retrieving attendance data.
///
/// Every write runs inside its own transaction, which is committed when the operation succeeds and
/// rolled back on every error path. The connection is closed when the manager is dropped.
pub struct AttendanceManager {
    db: SqliteConnection,
}

impl AttendanceManager {
    /// Opens the `sqlite3` database at `database_url`, creating any missing tables.
    pub fn open(database_url: &str) -> Result<Self> {
        let mut db = SqliteConnection::establish(database_url)?;

        db.batch_execute("PRAGMA foreign_keys = ON;")?;
        db.batch_execute(CREATE_TABLES)?;

        debug!("Opened attendance database at {database_url}");

        Ok(Self { db })
    }

    /// Retrieves all students on the roster, ordered by ID.
    pub fn load_students(&mut self) -> Result<Vec<Student>> {
        Ok(students::table
            .select(Student::as_select())
            .order(students::student_id.asc())
            .load(&mut self.db)?)
    }

    /// Retrieves every attendance record in chronological order.
    pub fn load_attendance(&mut self) -> Result<Vec<Attendance>> {
        Ok(attendance::table
            .select(Attendance::as_select())
            .order((attendance::date.asc(), attendance::id.asc()))
            .load(&mut self.db)?)
    }

    pub fn load_courses(&mut self) -> Result<Vec<Course>> {
        Ok(courses::table
            .select(Course::as_select())
            .order(courses::course_id.asc())
            .load(&mut self.db)?)
    }

    pub fn load_payments(&mut self) -> Result<Vec<Payment>> {
        Ok(payments::table
            .select(Payment::as_select())
            .order((payments::payment_date.asc(), payments::id.asc()))
            .load(&mut self.db)?)
    }

    /// Retrieves a specific student from the roster based on their ID.
    pub fn get_student(&mut self, student_id: &str) -> Result<Option<Student>> {
        Ok(students::table
            .find(student_id)
            .select(Student::as_select())
            .first(&mut self.db)
            .optional()?)
    }

    /// Returns the distinct course names students are enrolled in.
    pub fn course_names(&mut self) -> Result<Vec<String>> {
        Ok(students::table
            .select(students::course)
            .distinct()
            .order(students::course.asc())
            .load(&mut self.db)?)
    }

    /// Retrieves the students enrolled in `course`.
    pub fn students_in_course(&mut self, course: &str) -> Result<Vec<Student>> {
        Ok(students::table
            .filter(students::course.eq(course))
            .select(Student::as_select())
            .order(students::student_id.asc())
            .load(&mut self.db)?)
    }

    /// Adds a single student to the roster.
    pub fn add_student(&mut self, student: &Student) -> Result<()> {
        self.db.transaction::<_, Error, _>(|conn| {
            let taken: bool = diesel::select(exists(students::table.find(&student.student_id)))
                .get_result(conn)?;
            if taken {
                return Err(Error::StudentExists(student.student_id.clone()));
            }

            diesel::insert_into(students::table)
                .values(student)
                .execute(conn)?;
            Ok(())
        })?;

        info!("Added student {}", student.student_id);
        Ok(())
    }

    /// Upserts the given roster.
    ///
    /// Students already stored have their name, course, and year updated; new students are
    /// inserted. Stored students missing from `roster` are removed, unless they have attendance
    /// records, in which case they are silently kept.
    pub fn save_students(&mut self, roster: &[Student]) -> Result<SaveSummary> {
        let summary = self.db.transaction::<_, Error, _>(|conn| {
            let mut summary = SaveSummary::default();

            for student in roster {
                let updated = diesel::update(students::table.find(&student.student_id))
                    .set((
                        students::name.eq(&student.name),
                        students::course.eq(&student.course),
                        students::year.eq(student.year),
                    ))
                    .execute(conn)?;

                if updated == 0 {
                    diesel::insert_into(students::table)
                        .values(student)
                        .execute(conn)?;
                    summary.inserted += 1;
                } else {
                    summary.updated += 1;
                }
            }

            let keep: HashSet<&str> = roster.iter().map(|s| s.student_id.as_str()).collect();
            let stored: Vec<String> = students::table
                .select(students::student_id)
                .load(conn)?;

            for student_id in stored.iter().filter(|id| !keep.contains(id.as_str())) {
                if has_attendance(conn, student_id)? {
                    debug!("Keeping {student_id}, who has attendance records");
                    summary.retained += 1;
                } else {
                    diesel::delete(students::table.find(student_id)).execute(conn)?;
                    summary.removed += 1;
                }
            }

            Ok(summary)
        })?;

        info!(
            "Saved students: {} inserted, {} updated, {} removed, {} retained",
            summary.inserted, summary.updated, summary.removed, summary.retained
        );

        Ok(summary)
    }

    /// Upserts the given courses. Stored courses missing from `list` are left alone.
    pub fn save_courses(&mut self, list: &[Course]) -> Result<SaveSummary> {
        let summary = self.db.transaction::<_, Error, _>(|conn| {
            let mut summary = SaveSummary::default();

            for course in list {
                let updated = diesel::update(courses::table.find(&course.course_id))
                    .set(courses::course_name.eq(&course.course_name))
                    .execute(conn)?;

                if updated == 0 {
                    diesel::insert_into(courses::table)
                        .values(course)
                        .execute(conn)?;
                    summary.inserted += 1;
                } else {
                    summary.updated += 1;
                }
            }

            Ok(summary)
        })?;

        info!(
            "Saved courses: {} inserted, {} updated",
            summary.inserted, summary.updated
        );

        Ok(summary)
    }

    /// Inserts every record as a new attendance entry.
    ///
    /// No check is made for an earlier submission of the same date and course; use
    /// [`AttendanceManager::mark_attendance`] for that. A record that repeats an existing
    /// `(date, student, course)` fails with [`Error::DuplicateAttendance`] and nothing from the
    /// batch is stored.
    pub fn save_attendance(&mut self, records: &[NewAttendance]) -> Result<usize> {
        let inserted = self
            .db
            .transaction::<_, Error, _>(|conn| insert_attendance(conn, records))?;

        info!("Saved {inserted} attendance records");
        Ok(inserted)
    }

    /// Returns whether any attendance has been recorded for `course` on `date`.
    pub fn attendance_exists(&mut self, date: NaiveDate, course: &str) -> Result<bool> {
        Ok(submitted(&mut self.db, date, course)?)
    }

    /// Records attendance for every student enrolled in `course` on `date`. Students listed in
    /// `absent` are marked [`Status::Absent`], everybody else [`Status::Present`].
    ///
    /// Fails with [`Error::AlreadySubmitted`] if attendance for that date and course was already
    /// taken. IDs in `absent` that are not enrolled in the course are ignored.
    ///
    /// Returns the number of records that were written.
    pub fn mark_attendance(
        &mut self,
        date: NaiveDate,
        course: &str,
        absent: &[&str],
    ) -> Result<usize> {
        let enrolled = self.students_in_course(course)?;

        for id in absent {
            if !enrolled.iter().any(|student| student.student_id == *id) {
                warn!("Tried to mark {id} absent, but they are not enrolled in {course}");
            }
        }

        let records: Vec<NewAttendance> = enrolled
            .into_iter()
            .map(|student| {
                let status = if absent.contains(&student.student_id.as_str()) {
                    Status::Absent
                } else {
                    Status::Present
                };

                NewAttendance {
                    date,
                    student_id: student.student_id,
                    course: course.to_string(),
                    status,
                }
            })
            .collect();

        let inserted = self.db.transaction::<_, Error, _>(|conn| {
            if submitted(conn, date, course)? {
                warn!("Attendance for {course} on {date} was already submitted");
                return Err(Error::AlreadySubmitted {
                    date,
                    course: course.to_string(),
                });
            }

            insert_attendance(conn, &records)
        })?;

        info!("Marked attendance for {inserted} students of {course} on {date}");
        Ok(inserted)
    }

    /// Returns all attendance taken on `date`, with student names.
    pub fn attendance_on(&mut self, date: NaiveDate) -> Result<Vec<AttendanceRow>> {
        Ok(attendance::table
            .inner_join(students::table)
            .filter(attendance::date.eq(date))
            .select(ROW_COLUMNS)
            .order((attendance::course.asc(), students::name.asc()))
            .load(&mut self.db)?)
    }

    /// Returns the attendance records that satisfy `filter`, with student names, in chronological
    /// order. Records whose student is no longer on the roster are skipped.
    pub fn attendance_report_rows(
        &mut self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRow>> {
        let rows: Vec<AttendanceRow> = attendance::table
            .inner_join(students::table)
            .select(ROW_COLUMNS)
            .order((attendance::date.asc(), attendance::id.asc()))
            .load(&mut self.db)?;

        Ok(rows
            .into_iter()
            .filter(|row| filter.matches(row.date, &row.course))
            .collect())
    }

    /// Computes per-student statistics over the entire attendance history.
    pub fn calculate_attendance_stats(&mut self) -> Result<Vec<StudentStats>> {
        let records = self.load_attendance()?;
        Ok(stats::calculate_attendance_stats(&records))
    }

    /// Builds a report over the attendance records that satisfy `filter`.
    pub fn report(&mut self, filter: &AttendanceFilter) -> Result<Report> {
        let records = filter.apply(&self.load_attendance()?);
        let roster = self.load_students()?;
        Ok(stats::build_report(&records, &roster))
    }

    /// Records a payment for a student on the roster.
    pub fn save_payment(
        &mut self,
        student_id: &str,
        amount: i32,
        payment_date: NaiveDate,
        status: PaymentStatus,
    ) -> Result<Payment> {
        let payment = self.db.transaction::<_, Error, _>(|conn| {
            let known: bool =
                diesel::select(exists(students::table.find(student_id))).get_result(conn)?;
            if !known {
                return Err(Error::UnknownStudent(student_id.to_string()));
            }

            Ok(diesel::insert_into(payments::table)
                .values(NewPayment {
                    student_id,
                    amount,
                    payment_date,
                    status,
                })
                .returning(Payment::as_returning())
                .get_result(conn)?)
        })?;

        info!("Recorded payment {} of {amount} for {student_id}", payment.id);
        Ok(payment)
    }

    /// Replaces all students, courses, and attendance with `data`.
    ///
    /// This either stores all of `data` or, if any row fails, leaves the database exactly as it
    /// was. Payments are not touched.
    pub fn replace_all(&mut self, data: &ImportData) -> Result<ImportSummary> {
        let summary = self.db.transaction::<_, Error, _>(|conn| {
            // Clear the current tables, children first.
            diesel::delete(attendance::table).execute(conn)?;
            diesel::delete(students::table).execute(conn)?;
            diesel::delete(courses::table).execute(conn)?;

            for student in &data.students {
                diesel::insert_into(students::table)
                    .values(student)
                    .execute(conn)?;
            }

            for course in &data.courses {
                diesel::insert_into(courses::table)
                    .values(course)
                    .execute(conn)?;
            }

            let attendance = insert_attendance(conn, &data.attendance)?;

            Ok(ImportSummary {
                students: data.students.len(),
                courses: data.courses.len(),
                attendance,
            })
        })?;

        info!(
            "Imported {} students, {} courses, and {} attendance records",
            summary.students, summary.courses, summary.attendance
        );

        Ok(summary)
    }
}

fn has_attendance(conn: &mut SqliteConnection, student_id: &str) -> QueryResult<bool> {
    diesel::select(exists(
        attendance::table.filter(attendance::student_id.eq(student_id)),
    ))
    .get_result(conn)
}

fn submitted(conn: &mut SqliteConnection, date: NaiveDate, course: &str) -> QueryResult<bool> {
    diesel::select(exists(
        attendance::table
            .filter(attendance::date.eq(date))
            .filter(attendance::course.eq(course)),
    ))
    .get_result(conn)
}

/// Inserts attendance records one at a time so a failure can be traced back to its row.
fn insert_attendance(conn: &mut SqliteConnection, records: &[NewAttendance]) -> Result<usize> {
    let roster: HashSet<String> = students::table
        .select(students::student_id)
        .load::<String>(conn)?
        .into_iter()
        .collect();

    for record in records {
        if !roster.contains(&record.student_id) {
            return Err(Error::UnknownStudent(record.student_id.clone()));
        }

        let duplicate: bool = diesel::select(exists(
            attendance::table
                .filter(attendance::date.eq(record.date))
                .filter(attendance::student_id.eq(&record.student_id))
                .filter(attendance::course.eq(&record.course)),
        ))
        .get_result(conn)?;

        if duplicate {
            return Err(duplicate_error(record));
        }

        diesel::insert_into(attendance::table)
            .values(record)
            .execute(conn)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    duplicate_error(record)
                }
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    Error::UnknownStudent(record.student_id.clone())
                }
                err => err.into(),
            })?;
    }

    Ok(records.len())
}

fn duplicate_error(record: &NewAttendance) -> Error {
    Error::DuplicateAttendance {
        date: record.date,
        student_id: record.student_id.clone(),
        course: record.course.clone(),
    }
}
