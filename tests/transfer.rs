mod common;

use attendance::Error;
use attendance::models::{NewAttendance, Status};
use attendance::stats::AttendanceFilter;
use attendance::transfer::{self, ATTENDANCE_FILE, COURSES_FILE, STUDENTS_FILE};
use common::{TestDb, date, record, student};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const STUDENTS_CSV: &str = "\
student_id,name,course,year
S1,Ada Lovelace,Math,2024
S2,Brian Kernighan,Math,2023
S3,Chen Ning,Physics,2024
";

const COURSES_CSV: &str = "\
course_id,course_name
C1,Math
C2,Physics
";

const ATTENDANCE_CSV: &str = "\
date,student_id,course,status
2024-03-01,S1,Math,Present
2024-03-01,S2,Math,Absent
2024-03-02,S3,Physics,Present
";

fn write_import_dir(dir: &Path, attendance_csv: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(STUDENTS_FILE), STUDENTS_CSV).unwrap();
    fs::write(dir.join(COURSES_FILE), COURSES_CSV).unwrap();
    fs::write(dir.join(ATTENDANCE_FILE), attendance_csv).unwrap();
}

fn tuples(db: &mut TestDb) -> HashSet<NewAttendance> {
    db.manager
        .load_attendance()
        .unwrap()
        .into_iter()
        .map(NewAttendance::from)
        .collect()
}

#[test]
fn import_replaces_everything() {
    let mut db = TestDb::new();
    db.manager
        .save_students(&[student("OLD", "Former Student", "History", 2020)])
        .unwrap();
    db.manager
        .save_attendance(&[record("2023-09-01", "OLD", "History", Status::Present)])
        .unwrap();

    let import = db.dir.join("data");
    write_import_dir(&import, ATTENDANCE_CSV);

    let summary = transfer::import_dir(&mut db.manager, &import).unwrap();
    assert_eq!(
        (summary.students, summary.courses, summary.attendance),
        (3, 2, 3)
    );

    assert!(db.manager.get_student("OLD").unwrap().is_none());
    assert_eq!(db.manager.load_courses().unwrap().len(), 2);
    assert_eq!(
        tuples(&mut db),
        HashSet::from([
            record("2024-03-01", "S1", "Math", Status::Present),
            record("2024-03-01", "S2", "Math", Status::Absent),
            record("2024-03-02", "S3", "Physics", Status::Present),
        ])
    );
}

#[test]
fn failed_import_changes_nothing() {
    let mut db = TestDb::new();
    db.manager
        .save_students(&[student("OLD", "Former Student", "History", 2020)])
        .unwrap();

    // The last row references a student that is not in students.csv.
    let import = db.dir.join("data");
    write_import_dir(
        &import,
        &format!("{ATTENDANCE_CSV}2024-03-02,ghost,Physics,Present\n"),
    );

    let err = transfer::import_dir(&mut db.manager, &import).unwrap_err();
    assert!(matches!(err, Error::UnknownStudent(id) if id == "ghost"));

    let ids: Vec<_> = db
        .manager
        .load_students()
        .unwrap()
        .into_iter()
        .map(|s| s.student_id)
        .collect();
    assert_eq!(ids, vec!["OLD"]);
    assert!(db.manager.load_attendance().unwrap().is_empty());
}

#[test]
fn malformed_files_are_reported() {
    let mut db = TestDb::new();
    let import = db.dir.join("data");
    write_import_dir(
        &import,
        "date,student_id,course,status\n2024-03-01,S1,Math,Late\n",
    );

    assert!(matches!(
        transfer::import_dir(&mut db.manager, &import),
        Err(Error::Csv(_))
    ));
    assert!(db.manager.load_students().unwrap().is_empty());

    let missing = db.dir.join("missing");
    assert!(matches!(
        transfer::import_dir(&mut db.manager, &missing),
        Err(Error::Io(_))
    ));
}

#[test]
fn exported_report_imports_back() {
    let mut source = TestDb::new();
    let import = source.dir.join("data");
    write_import_dir(&import, ATTENDANCE_CSV);
    transfer::import_dir(&mut source.manager, &import).unwrap();

    let rows = source
        .manager
        .attendance_report_rows(&AttendanceFilter::default())
        .unwrap();
    let exports = source.dir.join("exports");
    let path = transfer::export_report(&exports, date("2024-03-31"), &rows).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str(),
        Some("attendance_report_20240331.csv")
    );

    // Feed the export back in as attendance.csv of a fresh database.
    let mut target = TestDb::new();
    let reimport = target.dir.join("data");
    write_import_dir(&reimport, &fs::read_to_string(&path).unwrap());
    transfer::import_dir(&mut target.manager, &reimport).unwrap();

    assert_eq!(tuples(&mut target), tuples(&mut source));
}
