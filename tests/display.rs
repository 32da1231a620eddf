mod common;

use attendance::display;
use attendance::models::Status;
use attendance::stats::AttendanceFilter;
use common::{TestDb, date, record, student};

#[test]
fn empty_database_renders_placeholders() {
    let mut db = TestDb::new();

    let dashboard = display::dashboard(&mut db.manager).unwrap();
    assert!(dashboard.contains("Total students: 0"));
    assert!(dashboard.contains("No attendance records available"));

    assert_eq!(
        display::roster(&mut db.manager, false).unwrap(),
        "No students on the roster"
    );

    let report = db.manager.report(&AttendanceFilter::default()).unwrap();
    assert_eq!(
        display::report(&report),
        "No attendance records found for the selected criteria."
    );
}

#[test]
fn dashboard_lists_recent_attendance_with_names() {
    let mut db = TestDb::new();
    db.manager
        .save_students(&[
            student("S1", "Ada Lovelace", "Math", 2024),
            student("S2", "Brian Kernighan", "Math", 2023),
        ])
        .unwrap();
    db.manager
        .save_attendance(&[
            record("2024-03-01", "S1", "Math", Status::Present),
            record("2024-03-01", "S2", "Math", Status::Absent),
        ])
        .unwrap();

    let dashboard = display::dashboard(&mut db.manager).unwrap();
    assert!(dashboard.contains("Total students: 2"));
    assert!(dashboard.contains("Total attendance records: 2"));
    assert!(dashboard.contains("Ada Lovelace"));
    assert!(dashboard.contains("Brian Kernighan"));

    let roster = display::roster(&mut db.manager, false).unwrap();
    assert!(roster.contains("Ada Lovelace"));
    assert!(!roster.contains("2023"), "year is only shown in verbose mode");
    assert!(display::roster(&mut db.manager, true).unwrap().contains("2023"));

    let day = display::day_attendance(&mut db.manager, date("2024-03-01")).unwrap();
    assert!(day.contains("Absent"));
    let other_day = display::day_attendance(&mut db.manager, date("2024-03-02")).unwrap();
    assert_eq!(other_day, "No attendance records for 2024-03-02");
}
