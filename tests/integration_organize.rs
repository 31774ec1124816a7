use assert_fs::prelude::*;
use chrono::{Local, TimeZone};
use predicates::prelude::*;
use smart_file_organizer::app::{OrganizeRequest, Session};
use smart_file_organizer::core::classify::TimeGranularity;
use smart_file_organizer::core::history::HISTORY_FILE_NAME;
use smart_file_organizer::error::{OrganizerError, RuleError};
use smart_file_organizer::events::null_sender;
use std::fs;
use std::time::SystemTime;

fn session_for(dir: &assert_fs::TempDir) -> Session {
    let mut session = Session::new(null_sender()).unwrap();
    session.select_directory(dir.path()).unwrap();
    session
}

fn set_mtime(path: &std::path::Path, year: i32, month: u32, day: u32) {
    let local = Local
        .with_ymd_and_hms(year, month, day, 9, 4, 3)
        .single()
        .unwrap();
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::from(local)).unwrap();
}

#[test]
fn test_organize_by_extension() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a.pdf").write_str("pdf").unwrap();
    temp.child("b.jpg").write_str("jpg").unwrap();
    temp.child("Makefile").write_str("all:").unwrap();
    temp.child("existing").create_dir_all().unwrap();

    let mut session = session_for(&temp);
    let result = session
        .organize_and_wait(OrganizeRequest::ByExtension)
        .unwrap();

    assert_eq!(result.moved, 3);
    assert!(result.failed.is_empty());
    temp.child("pdf/a.pdf").assert(predicate::path::is_file());
    temp.child("jpg/b.jpg").assert(predicate::path::is_file());
    temp.child("other/Makefile").assert(predicate::path::is_file());
    temp.child("a.pdf").assert(predicate::path::missing());
    // Sub-directories are never descended into or moved
    temp.child("existing").assert(predicate::path::is_dir());
    temp.child(HISTORY_FILE_NAME).assert(predicate::path::is_file());
}

#[test]
fn test_organize_by_nested_month() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("report.txt").write_str("q3").unwrap();
    set_mtime(temp.child("report.txt").path(), 2023, 7, 5);

    let mut session = session_for(&temp);
    session
        .organize_and_wait(OrganizeRequest::ByTime {
            granularity: TimeGranularity::Month,
            nested: true,
        })
        .unwrap();

    temp.child("2023/07/report.txt")
        .assert(predicate::path::is_file());
}

#[test]
fn test_organize_by_flat_day() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("report.txt").write_str("q3").unwrap();
    set_mtime(temp.child("report.txt").path(), 2023, 7, 5);

    let mut session = session_for(&temp);
    session
        .organize_and_wait(OrganizeRequest::ByTime {
            granularity: TimeGranularity::Day,
            nested: false,
        })
        .unwrap();

    temp.child("2023-07-05/report.txt")
        .assert(predicate::path::is_file());
}

#[test]
fn test_organize_by_keyword_leaves_unmatched_files() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("Invoice_March.pdf").write_str("x").unwrap();
    temp.child("holiday_photo.jpg").write_str("x").unwrap();
    temp.child("notes.txt").write_str("x").unwrap();

    let mut session = session_for(&temp);
    let result = session
        .organize_and_wait(OrganizeRequest::ByKeyword {
            groups: "invoice, receipt; photo".to_string(),
            folders: "Finance; Pictures".to_string(),
        })
        .unwrap();

    assert_eq!(result.moved, 2);
    assert_eq!(result.skipped, 1);
    temp.child("Finance/Invoice_March.pdf")
        .assert(predicate::path::is_file());
    temp.child("Pictures/holiday_photo.jpg")
        .assert(predicate::path::is_file());
    temp.child("notes.txt").assert(predicate::path::is_file());
}

#[test]
fn test_rule_count_mismatch_has_no_side_effects() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("invoice.pdf").write_str("x").unwrap();

    let mut session = session_for(&temp);
    let result = session.organize_and_wait(OrganizeRequest::ByKeyword {
        groups: "invoice; photo".to_string(),
        folders: "Finance".to_string(),
    });

    assert!(matches!(
        result,
        Err(OrganizerError::Rules(RuleError::RuleCountMismatch {
            groups: 2,
            folders: 1
        }))
    ));
    temp.child("invoice.pdf").assert(predicate::path::is_file());
    temp.child("Finance").assert(predicate::path::missing());
    temp.child(HISTORY_FILE_NAME)
        .assert(predicate::path::missing());
}

#[test]
fn test_collision_gets_numbered_name() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("pdf/a.pdf").write_str("old").unwrap();
    temp.child("a.pdf").write_str("new").unwrap();

    let mut session = session_for(&temp);
    let result = session
        .organize_and_wait(OrganizeRequest::ByExtension)
        .unwrap();

    assert_eq!(result.moved, 1);
    temp.child("pdf/a.pdf").assert("old");
    temp.child("pdf/a (1).pdf").assert("new");
}

#[test]
fn test_second_run_ignores_history_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a.txt").write_str("a").unwrap();

    let mut session = session_for(&temp);
    session
        .organize_and_wait(OrganizeRequest::ByExtension)
        .unwrap();

    temp.child("b.csv").write_str("b").unwrap();
    let result = session
        .organize_and_wait(OrganizeRequest::ByExtension)
        .unwrap();

    assert_eq!(result.moved, 1);
    temp.child(HISTORY_FILE_NAME).assert(predicate::path::is_file());
    temp.child("json").assert(predicate::path::missing());
    assert_eq!(session.pending_undos().unwrap(), 2);
}

#[test]
fn test_empty_directory_records_nothing() {
    let temp = assert_fs::TempDir::new().unwrap();

    let mut session = session_for(&temp);
    let result = session
        .organize_and_wait(OrganizeRequest::ByExtension)
        .unwrap();

    assert_eq!(result.moved, 0);
    assert!(result.batch_id.is_none());
    assert_eq!(session.pending_undos().unwrap(), 0);
    temp.child(HISTORY_FILE_NAME)
        .assert(predicate::path::missing());
}

#[test]
fn test_preview_moves_nothing() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a.pdf").write_str("a").unwrap();
    temp.child("b.pdf").write_str("b").unwrap();

    let session = session_for(&temp);
    let plan = session.preview(OrganizeRequest::ByExtension).unwrap();

    assert_eq!(plan.moves.len(), 2);
    assert_eq!(plan.directories_to_create, vec![temp.path().join("pdf")]);
    temp.child("a.pdf").assert(predicate::path::is_file());
    temp.child("pdf").assert(predicate::path::missing());
}
