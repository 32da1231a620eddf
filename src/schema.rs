// Diesel table definitions. Kept in sync by hand with `CREATE_TABLES` below, which is executed
// whenever a database is opened.

diesel::table! {
    attendance (id) {
        id -> Integer,
        date -> Date,
        student_id -> Text,
        course -> Text,
        status -> Text,
    }
}

diesel::table! {
    courses (course_id) {
        course_id -> Text,
        course_name -> Text,
    }
}

diesel::table! {
    payments (id) {
        id -> Integer,
        student_id -> Text,
        amount -> Integer,
        payment_date -> Date,
        status -> Text,
    }
}

diesel::table! {
    students (student_id) {
        student_id -> Text,
        name -> Text,
        course -> Text,
        year -> Integer,
    }
}

diesel::joinable!(attendance -> students (student_id));

diesel::allow_tables_to_appear_in_same_query!(
    attendance,
    courses,
    payments,
    students,
);

/// The SQL that creates every table if it does not exist yet.
///
/// `attendance` carries a uniqueness constraint over `(date, student_id, course)`, so the same
/// student can never be recorded twice for one class meeting, no matter which path inserts it.
pub const CREATE_TABLES: &str = "
    CREATE TABLE IF NOT EXISTS students (
        student_id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        course TEXT NOT NULL,
        year INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS courses (
        course_id TEXT PRIMARY KEY NOT NULL,
        course_name TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS attendance (
        id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        date DATE NOT NULL,
        student_id TEXT NOT NULL REFERENCES students (student_id),
        course TEXT NOT NULL,
        status TEXT NOT NULL CHECK (status IN ('Present', 'Absent')),
        UNIQUE (date, student_id, course)
    );

    CREATE INDEX IF NOT EXISTS idx_attendance_date_course ON attendance (date, course);

    CREATE TABLE IF NOT EXISTS payments (
        id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        student_id TEXT NOT NULL,
        amount INTEGER NOT NULL,
        payment_date DATE NOT NULL,
        status TEXT NOT NULL DEFAULT 'Pending' CHECK (status IN ('Pending', 'Paid'))
    );
";
