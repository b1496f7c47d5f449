//! Moving completed items into the archive outline.

use crate::dates::WEEKDAYS;
use crate::outline::{NodeId, Outline};
use crate::rollover::{NEXTWEEK, TODAY, TOMORROW, WEEKEND};
use chrono::NaiveDate;
use tracing::debug;

pub const DONE: &str = "done";
/// Space-separated list of dates a task (identified by its path) was archived on.
pub const ARCHIVED: &str = "archived";

/// Date format used in `@archived(...)`.
pub const ARCHIVE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Tags that would pull an archived item back into a rollover.
pub fn scheduling_tags() -> impl Iterator<Item = &'static str> {
    [TODAY, TOMORROW, WEEKEND, NEXTWEEK]
        .into_iter()
        .chain(WEEKDAYS)
}

/// Move every `@done` subtree from `doc` into `archive`.
///
/// Each completed item loses its scheduling tags, is merged into the archive at
/// the same path of titles, gets `day` recorded in its `@archived` tag, and is
/// then removed from `doc`. Returns the number of items archived.
pub fn archive_done(doc: &mut Outline, archive: &mut Outline, day: NaiveDate) -> usize {
    let stamp = day.format(ARCHIVE_DATE_FORMAT).to_string();
    let mut count = 0;

    for id in doc.tagged(DONE) {
        // Already gone with a completed ancestor.
        if !doc.is_attached(id) {
            continue;
        }

        for member in doc.subtree(id) {
            for tag in scheduling_tags() {
                doc.drop_tag(member, tag);
            }
        }

        // Read the existing record before the merge copies live tags over it.
        let previous = archive_record(archive, doc, id);

        let Some(target) = archive.merge_from(doc, id) else {
            continue;
        };

        let history = match previous {
            Some(dates) if dates.split_whitespace().any(|d| d == stamp) => dates,
            Some(dates) if !dates.trim().is_empty() => format!("{} {}", dates.trim(), stamp),
            _ => stamp.clone(),
        };
        archive.add_tag(target, ARCHIVED, Some(&history));

        debug!(
            item = %doc.node(id).title(),
            archived = %history,
            "Archived completed item"
        );
        doc.delete(id);
        count += 1;
    }

    count
}

/// Current `@archived` value of the archive node at the same path as `id`, if any.
fn archive_record(archive: &Outline, doc: &Outline, id: NodeId) -> Option<String> {
    let existing = archive.find_path(&doc.path(id))?;
    let node = archive.node(existing);
    node.has_tag(ARCHIVED)
        .then(|| node.tag_value(ARCHIVED).unwrap_or_default().to_string())
}
