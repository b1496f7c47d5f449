//! Replaying missed days.
//!
//! The archive carries a "last updated" marker. A catch-up run replays the full
//! daily pipeline (awareness cleanup, archiving, rollover) once for every day
//! since that marker, so rules anchored to specific weekdays or month days are
//! never skipped when a run is late. Each day sees the cumulative effect of the
//! days before it.

use crate::archive::archive_done;
use crate::config::ArchiveConfig;
use crate::dates::missed_days;
use crate::outline::{NodeKind, Outline, PathSegment};
use crate::rollover::{RolloverContext, RolloverReport, roll_day};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::info;

/// Format of the marker value, e.g. `@updated(2024-01-05 07:30)`.
pub const MARKER_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Inputs shared by every simulated day of one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayContext<'a> {
    pub rollover: RolloverContext<'a>,
    /// Tags cleared at the start of each day.
    pub awareness_tags: &'a [String],
}

/// Result of one simulated day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayReport {
    pub day: NaiveDate,
    pub archived: usize,
    #[serde(skip)]
    pub rollover: RolloverReport,
}

/// Run the full pipeline for one effective day.
pub fn run_day(
    doc: &mut Outline,
    archive: &mut Outline,
    day: NaiveDate,
    ctx: &DayContext<'_>,
) -> DayReport {
    for tag in ctx.awareness_tags {
        for id in doc.tagged(tag) {
            doc.drop_tag(id, tag);
        }
    }
    let archived = archive_done(doc, archive, day);
    let rollover = roll_day(doc, day, &ctx.rollover);
    info!(day = %day, archived, promoted = rollover.promoted, "Processed day");
    DayReport {
        day,
        archived,
        rollover,
    }
}

/// Run [`run_day`] for each day in order, against the same pair of outlines.
pub fn run_days(
    doc: &mut Outline,
    archive: &mut Outline,
    days: &[NaiveDate],
    ctx: &DayContext<'_>,
) -> Vec<DayReport> {
    let mut reports = Vec::with_capacity(days.len());
    for day in days {
        reports.push(run_day(doc, archive, *day, ctx));
    }
    reports
}

/// Replay every day after `last` up to and including `today`.
pub fn catch_up(
    doc: &mut Outline,
    archive: &mut Outline,
    last: NaiveDate,
    today: NaiveDate,
    ctx: &DayContext<'_>,
) -> Vec<DayReport> {
    let days = missed_days(last, today);
    if days.is_empty() {
        info!(last = %last, today = %today, "Already up to date");
    }
    run_days(doc, archive, &days, ctx)
}

fn marker_path(config: &ArchiveConfig) -> [PathSegment; 1] {
    [PathSegment::new(NodeKind::Project, config.header.clone())]
}

/// Parse a marker value. A bare date is accepted as well as the full timestamp.
pub fn parse_marker(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, MARKER_FORMAT)
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

/// The date the archive was last stamped, if the marker is present and readable.
pub fn last_updated(archive: &Outline, config: &ArchiveConfig) -> Option<NaiveDate> {
    let header = archive.find_path(&marker_path(config))?;
    archive
        .tag_value(header, &config.marker_tag)
        .and_then(parse_marker)
}

/// Record `now` as the archive's last update, replacing any previous marker.
pub fn stamp(archive: &mut Outline, config: &ArchiveConfig, now: NaiveDateTime) {
    let header = match archive.find_path(&marker_path(config)) {
        Some(existing) => existing,
        None => archive.insert_root(0, NodeKind::Project, &config.header),
    };
    let value = now.format(MARKER_FORMAT).to_string();
    archive.add_tag(header, &config.marker_tag, Some(&value));
}
