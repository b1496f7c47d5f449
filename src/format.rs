//! Batch report rendering.

use crate::update::FileReport;
use serde_json::{Value, json};

/// Output format for the batch report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Render per-file results.
pub fn format_report(reports: &[FileReport], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_report_text(reports),
        OutputFormat::Json => {
            let entries: Vec<Value> = reports.iter().map(report_json).collect();
            serde_json::to_string_pretty(&entries).unwrap_or_default()
        }
    }
}

fn format_report_text(reports: &[FileReport]) -> String {
    let mut out = String::new();
    for report in reports {
        match report.result {
            Ok(ref outcome) => {
                let span = match (outcome.days.first(), outcome.days.last()) {
                    (Some(first), Some(last)) if first.day == last.day => first.day.to_string(),
                    (Some(first), Some(last)) => format!("{}..{}", first.day, last.day),
                    _ => "up to date".to_string(),
                };
                out.push_str(&format!(
                    "{}: {} day(s) [{}], {} archived{}\n",
                    report.path.display(),
                    outcome.days.len(),
                    span,
                    outcome.archived(),
                    if outcome.written { "" } else { " (simulated)" }
                ));
            }
            Err(ref e) => {
                out.push_str(&format!("{}: FAILED {:?}: {}\n", report.path.display(), e.code, e));
            }
        }
    }
    out
}

fn report_json(report: &FileReport) -> Value {
    match report.result {
        Ok(ref outcome) => json!({
            "path": report.path,
            "status": "ok",
            "days": outcome.days,
            "archived": outcome.archived(),
            "written": outcome.written,
        }),
        Err(ref e) => json!({
            "path": report.path,
            "status": "error",
            "error": e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catchup::DayReport;
    use crate::error::UpdateError;
    use crate::update::FileOutcome;
    use chrono::NaiveDate;
    use std::path::{Path, PathBuf};

    fn sample() -> Vec<FileReport> {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let days = vec![
            DayReport {
                day: day(6),
                archived: 1,
                rollover: Default::default(),
            },
            DayReport {
                day: day(7),
                archived: 2,
                rollover: Default::default(),
            },
        ];
        vec![
            FileReport {
                path: PathBuf::from("todo.taskpaper"),
                result: Ok(FileOutcome {
                    path: PathBuf::from("todo.taskpaper"),
                    archive_path: PathBuf::from("todoArchive.taskpaper"),
                    days,
                    written: true,
                    document: String::new(),
                    archive: String::new(),
                }),
            },
            FileReport {
                path: PathBuf::from("gone.taskpaper"),
                result: Err(UpdateError::read_failed(Path::new("gone.taskpaper"), "not found")),
            },
        ]
    }

    #[test]
    fn text_report_lists_each_file() {
        let text = format_report(&sample(), OutputFormat::Text);
        assert_eq!(
            text,
            "todo.taskpaper: 2 day(s) [2024-01-06..2024-01-07], 3 archived\n\
             gone.taskpaper: FAILED ReadFailed: Cannot read gone.taskpaper: not found\n"
        );
    }

    #[test]
    fn json_report_carries_error_code() {
        let json: Value = serde_json::from_str(&format_report(&sample(), OutputFormat::Json)).unwrap();
        assert_eq!(json[0]["status"], "ok");
        assert_eq!(json[0]["archived"], 3);
        assert_eq!(json[0]["days"][1]["day"], "2024-01-07");
        assert_eq!(json[1]["error"]["code"], "READ_FAILED");
    }
}
