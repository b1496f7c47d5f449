//! Integration tests for file-level updates.
//!
//! Each test works in its own temporary directory so documents and their
//! archives can be inspected after the run.

use chrono::{DateTime, Duration, Local, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};
use taskpaper_rollover::config::ArchiveConfig;
use taskpaper_rollover::dates::DayOverride;
use taskpaper_rollover::error::ErrorCode;
use taskpaper_rollover::outline::Outline;
use taskpaper_rollover::update::{Clock, UpdateSettings, run_batch, update_file};
use tempfile::TempDir;

fn clock(y: i32, m: u32, d: u32) -> Clock {
    Clock::fixed(
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap(),
    )
}

fn write_doc(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn catch_up_settings() -> UpdateSettings {
    UpdateSettings {
        catch_up: true,
        awareness_tags: vec!["should".to_string()],
        ..Default::default()
    }
}

#[test]
fn single_day_update_writes_document_and_archive() {
    let temp = TempDir::new().unwrap();
    let path = write_doc(
        temp.path(),
        "todo.taskpaper",
        "Home:\n\t- water plants @done @today\n\t- call plumber @tomorrow\n",
    );

    let outcome = update_file(&path, &UpdateSettings::default(), None, &clock(2024, 1, 2)).unwrap();
    assert!(outcome.written);
    assert_eq!(outcome.archived(), 1);
    assert_eq!(outcome.archive_path, temp.path().join("todoArchive.taskpaper"));

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "Home:\n\t- call plumber @today\n"
    );
    assert_eq!(
        fs::read_to_string(&outcome.archive_path).unwrap(),
        "Archive: @updated(2024-01-02 06:00)\n\
         Home:\n\
         \t- water plants @done @archived(2024-01-02)\n"
    );
}

#[test]
fn weekday_override_picks_most_recent_match() {
    let temp = TempDir::new().unwrap();
    let path = write_doc(temp.path(), "todo.taskpaper", "- standup @monday\n");

    // 2024-01-10 is a Wednesday; the override rolls as of Monday the 8th.
    let settings = UpdateSettings {
        day_override: Some(DayOverride::Weekday(chrono::Weekday::Mon)),
        simulate: true,
        ..Default::default()
    };
    let outcome = update_file(&path, &settings, None, &clock(2024, 1, 10)).unwrap();
    assert_eq!(outcome.days.len(), 1);
    assert_eq!(outcome.days[0].day, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
    assert_eq!(outcome.document, "- standup @today\n");
    // Stamped with the real time, not the pretended day.
    assert!(outcome.archive.starts_with("Archive: @updated(2024-01-10 06:00)"));
}

#[test]
fn catch_up_replays_days_since_marker() {
    let temp = TempDir::new().unwrap();
    let path = write_doc(
        temp.path(),
        "todo.taskpaper",
        "- call bank @monday\n- sleep in @weekend\n- maybe later @should\n",
    );
    fs::write(
        temp.path().join("todoArchive.taskpaper"),
        "Archive: @updated(2024-01-04 08:00)\n",
    )
    .unwrap();

    let outcome = update_file(&path, &catch_up_settings(), None, &clock(2024, 1, 8)).unwrap();
    let days: Vec<_> = outcome.days.iter().map(|d| d.day.to_string()).collect();
    assert_eq!(days, ["2024-01-05", "2024-01-06", "2024-01-07", "2024-01-08"]);

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "- call bank @today\n- sleep in @today\n- maybe later\n"
    );
    assert_eq!(
        fs::read_to_string(&outcome.archive_path).unwrap(),
        "Archive: @updated(2024-01-08 06:00)\n"
    );

    // A second run the same day has nothing left to replay.
    let again = update_file(&path, &catch_up_settings(), None, &clock(2024, 1, 8)).unwrap();
    assert!(again.days.is_empty());
}

#[test]
fn catch_up_falls_back_to_archive_mtime() {
    let temp = TempDir::new().unwrap();
    let path = write_doc(temp.path(), "todo.taskpaper", "- a @indays(5)\n");
    let archive_path = temp.path().join("todoArchive.taskpaper");
    fs::write(&archive_path, "Old:\n\t- thing @done @archived(2023-12-01)\n").unwrap();

    let modified = fs::metadata(&archive_path).unwrap().modified().unwrap();
    let last = DateTime::<Local>::from(modified).date_naive();
    let now = (last + Duration::days(2)).and_hms_opt(6, 0, 0).unwrap();

    let outcome = update_file(&path, &catch_up_settings(), None, &Clock::fixed(now)).unwrap();
    assert_eq!(outcome.days.len(), 2);
    assert_eq!(fs::read_to_string(&path).unwrap(), "- a @indays(3)\n");

    let archive = Outline::parse(&fs::read_to_string(&archive_path).unwrap());
    let config = ArchiveConfig::default();
    assert_eq!(
        taskpaper_rollover::catchup::last_updated(&archive, &config),
        Some(now.date())
    );
}

#[test]
fn catch_up_without_archive_fails_and_leaves_document() {
    let temp = TempDir::new().unwrap();
    let path = write_doc(temp.path(), "todo.taskpaper", "- a @tomorrow\n");

    let err = update_file(&path, &catch_up_settings(), None, &clock(2024, 1, 8)).unwrap_err();
    assert_eq!(err.code, ErrorCode::NoLastUpdate);
    assert_eq!(fs::read_to_string(&path).unwrap(), "- a @tomorrow\n");
    assert!(!temp.path().join("todoArchive.taskpaper").exists());
}

#[cfg(target_os = "linux")]
#[test]
fn failed_archive_write_keeps_completed_items_in_document() {
    let temp = TempDir::new().unwrap();
    let text = "- ship release @done\n- keep @today\n";
    let path = write_doc(temp.path(), "todo.taskpaper", text);
    // Readable but never writable, even as root.
    std::os::unix::fs::symlink("/proc/version", temp.path().join("todoArchive.taskpaper"))
        .unwrap();

    let err = update_file(&path, &UpdateSettings::default(), None, &clock(2024, 1, 2)).unwrap_err();
    assert_eq!(err.code, ErrorCode::WriteFailed);
    assert_eq!(
        err.path.as_deref(),
        Some(temp.path().join("todoArchive.taskpaper").display().to_string().as_str())
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn recurring_templates_are_merged_and_left_unchanged() {
    let temp = TempDir::new().unwrap();
    let path = write_doc(temp.path(), "todo.taskpaper", "Work:\n\t- fix bug @today\n");
    let templates_text = "Work:\n\t- standup @daily\n";
    let templates = Outline::parse(templates_text);

    let outcome = update_file(
        &path,
        &UpdateSettings::default(),
        Some(&templates),
        &clock(2024, 1, 2),
    )
    .unwrap();
    assert_eq!(outcome.days[0].rollover.merged, 1);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "Work:\n\t- fix bug @today\n\t- standup @today\n"
    );
    assert_eq!(templates.render(), templates_text);
}

#[test]
fn batch_continues_after_a_failed_file() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.taskpaper");
    let good = write_doc(temp.path(), "good.taskpaper", "- a @tomorrow\n");

    let reports = run_batch(
        &[missing.clone(), good.clone()],
        &UpdateSettings::default(),
        None,
        &clock(2024, 1, 2),
    );
    assert_eq!(reports.len(), 2);

    assert_eq!(reports[0].path, missing);
    let err = reports[0].result.as_ref().unwrap_err();
    assert_eq!(err.code, ErrorCode::ReadFailed);

    assert!(reports[1].result.is_ok());
    assert_eq!(fs::read_to_string(&good).unwrap(), "- a @today\n");
}
