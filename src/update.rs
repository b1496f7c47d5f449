//! File-level updates.
//!
//! Reads a document and its sibling archive, decides which days to process,
//! runs the daily pipeline for each, stamps the archive and writes both files
//! back (or hands the rendered text to the caller when simulating).
//!
//! Files are processed one at a time. A failure on one file is reported and
//! the batch moves on; nothing is written for a file whose update failed.

use crate::catchup::{DayContext, DayReport, last_updated, run_days, stamp};
use crate::config::{ArchiveConfig, Config};
use crate::dates::{DayOverride, missed_days, resolve_effective_date};
use crate::error::{UpdateError, UpdateResult};
use crate::outline::Outline;
use crate::rollover::{RolloverContext, RolloverOptions};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Settings for one invocation, after config and CLI overrides are combined.
#[derive(Debug, Clone, Default)]
pub struct UpdateSettings {
    pub day_override: Option<DayOverride>,
    pub carry_tomorrow: bool,
    pub catch_up: bool,
    pub simulate: bool,
    pub archive: ArchiveConfig,
    pub awareness_tags: Vec<String>,
}

impl UpdateSettings {
    pub fn from_config(config: &Config, day_override: Option<DayOverride>) -> Self {
        Self {
            day_override,
            carry_tomorrow: config.carry_tomorrow,
            catch_up: config.catch_up,
            simulate: config.simulate,
            archive: config.archive.clone(),
            awareness_tags: config.awareness_tags.clone(),
        }
    }

    fn day_context<'a>(&'a self, templates: Option<&'a Outline>) -> DayContext<'a> {
        DayContext {
            rollover: RolloverContext {
                templates,
                options: RolloverOptions {
                    carry_tomorrow: self.carry_tomorrow,
                },
            },
            awareness_tags: &self.awareness_tags,
        }
    }
}

/// The real wall-clock time, captured once per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    pub now: NaiveDateTime,
}

impl Clock {
    pub fn local() -> Self {
        Self {
            now: Local::now().naive_local(),
        }
    }

    pub fn fixed(now: NaiveDateTime) -> Self {
        Self { now }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }
}

/// Result of updating one document.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub archive_path: PathBuf,
    pub days: Vec<DayReport>,
    /// False when simulating.
    pub written: bool,
    /// Rendered document after the update.
    #[serde(skip)]
    pub document: String,
    /// Rendered archive after the update.
    #[serde(skip)]
    pub archive: String,
}

impl FileOutcome {
    pub fn archived(&self) -> usize {
        self.days.iter().map(|d| d.archived).sum()
    }
}

/// One entry of a batch run.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub result: UpdateResult<FileOutcome>,
}

/// Read the recurring template outline.
pub fn load_templates(path: &Path) -> UpdateResult<Outline> {
    let text =
        fs::read_to_string(path).map_err(|e| UpdateError::template_read_failed(path, e))?;
    Ok(Outline::parse(&text))
}

/// Load the optional recurring templates for a run.
///
/// An unreadable template file is logged and the run continues without
/// templates; the documents still roll over.
pub fn recurring_templates(path: Option<&Path>) -> Option<Outline> {
    let path = path?;
    match load_templates(path) {
        Ok(outline) => {
            info!(path = %path.display(), "Loaded recurring templates");
            Some(outline)
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error_code = ?e.code,
                error = %e,
                "Recurring templates unavailable, continuing without them"
            );
            None
        }
    }
}

/// Read a document for display only.
pub fn load_outline(path: &Path) -> UpdateResult<Outline> {
    let text = fs::read_to_string(path).map_err(|e| UpdateError::read_failed(path, e))?;
    Ok(Outline::parse(&text))
}

/// Date part of the file's modification time, in local time.
fn modified_date(path: &Path) -> Option<NaiveDate> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Local>::from(modified).date_naive())
}

/// Update one document and its archive.
pub fn update_file(
    path: &Path,
    settings: &UpdateSettings,
    templates: Option<&Outline>,
    clock: &Clock,
) -> UpdateResult<FileOutcome> {
    let text = fs::read_to_string(path).map_err(|e| UpdateError::read_failed(path, e))?;
    let mut doc = Outline::parse(&text);

    let archive_path = settings.archive.archive_path_for(path);
    let mut archive = match fs::read_to_string(&archive_path) {
        Ok(text) => Outline::parse(&text),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(archive = %archive_path.display(), "No archive yet, starting a new one");
            Outline::new()
        }
        Err(e) => return Err(UpdateError::read_failed(&archive_path, e)),
    };

    let effective = resolve_effective_date(clock.today(), settings.day_override);
    let days = if settings.catch_up {
        let last = match last_updated(&archive, &settings.archive) {
            Some(last) => last,
            None => {
                let fallback = modified_date(&archive_path)
                    .ok_or_else(|| UpdateError::no_last_update(path))?;
                warn!(
                    archive = %archive_path.display(),
                    last = %fallback,
                    "No readable update marker, using archive modification time"
                );
                fallback
            }
        };
        missed_days(last, effective)
    } else {
        vec![effective]
    };

    info!(
        path = %path.display(),
        effective = %effective,
        days = days.len(),
        catch_up = settings.catch_up,
        "Updating"
    );

    let ctx = settings.day_context(templates);
    let reports = run_days(&mut doc, &mut archive, &days, &ctx);
    stamp(&mut archive, &settings.archive, clock.now);

    let outcome = FileOutcome {
        path: path.to_path_buf(),
        archive_path,
        days: reports,
        written: !settings.simulate,
        document: doc.render(),
        archive: archive.render(),
    };

    // The document is only written once the archive holds its completed items.
    if !settings.simulate {
        fs::write(&outcome.archive_path, &outcome.archive)
            .map_err(|e| UpdateError::write_failed(&outcome.archive_path, e))?;
        fs::write(path, &outcome.document).map_err(|e| UpdateError::write_failed(path, e))?;
    }

    Ok(outcome)
}

/// Update each file in turn; failures are collected, not propagated.
pub fn run_batch(
    files: &[PathBuf],
    settings: &UpdateSettings,
    templates: Option<&Outline>,
    clock: &Clock,
) -> Vec<FileReport> {
    files
        .iter()
        .map(|path| {
            let result = update_file(path, settings, templates, clock);
            match result {
                Ok(ref outcome) => info!(
                    path = %path.display(),
                    days = outcome.days.len(),
                    archived = outcome.archived(),
                    "Updated"
                ),
                Err(ref e) => warn!(
                    path = %path.display(),
                    error_code = ?e.code,
                    error = %e,
                    "Update skipped"
                ),
            }
            FileReport {
                path: path.clone(),
                result,
            }
        })
        .collect()
}
