//! Tag rollover for a single effective day.
//!
//! The live outline uses tags as a scheduling vocabulary. [`roll_day`] applies
//! the daily rule set in a fixed order; later rules may re-promote items that
//! earlier rules touched, so the order is part of the contract.
//!
//! Recurring templates live in a separate, read-only outline. A template
//! subtree is merged into the live outline at the same path of titles whenever
//! its trigger tag fires.

use crate::dates::{month_name, weekday_name};
use crate::outline::Outline;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tracing::debug;

pub const TODAY: &str = "today";
pub const TOMORROW: &str = "tomorrow";
/// Common misspelling accepted as `tomorrow`.
pub const TOMORROW_MISSPELLED: &str = "tomorow";
pub const WEEKEND: &str = "weekend";
pub const NEXTWEEK: &str = "nextweek";
pub const DAILY: &str = "daily";
pub const WEEKLY: &str = "weekly";
pub const MONTHLY: &str = "monthly";
pub const NEXTMONTH: &str = "nextmonth";

/// Tags whose integer value counts down one per day.
pub const COUNTDOWN_TAGS: [&str; 2] = ["indays", "snooze"];

/// Prefixes that defer a weekday tag to the following week (`nextfriday`, `nfriday`).
const DEFERRAL_PREFIXES: [&str; 2] = ["next", "n"];

/// Behaviour switches for one rollover pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RolloverOptions {
    /// Resolve the next day's weekday items now, tagging them `tomorrow`.
    pub carry_tomorrow: bool,
}

/// What a pass changed, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RolloverReport {
    /// Nodes that gained `today`.
    pub promoted: usize,
    /// Nodes that gained `tomorrow`.
    pub deferred: usize,
    /// Template subtrees merged into the live outline.
    pub merged: usize,
    /// Countdown values decremented in place.
    pub decayed: usize,
}

/// Everything a rollover pass reads besides the live outline.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolloverContext<'a> {
    pub templates: Option<&'a Outline>,
    pub options: RolloverOptions,
}

struct Pass<'a, 'b> {
    doc: &'a mut Outline,
    templates: Option<&'b Outline>,
    report: RolloverReport,
}

impl Pass<'_, '_> {
    /// Swap `tag` for `to` on every node carrying it.
    fn convert(&mut self, tag: &str, to: &str) -> usize {
        let mut count = 0;
        for id in self.doc.tagged(tag) {
            if self.doc.retag(id, tag, to) {
                count += 1;
            }
        }
        match to {
            TODAY => self.report.promoted += count,
            TOMORROW => self.report.deferred += count,
            _ => {}
        }
        count
    }

    fn promote(&mut self, tag: &str) -> usize {
        self.convert(tag, TODAY)
    }

    /// Merge every template subtree tagged `tag` into the live outline.
    fn merge_templates(&mut self, tag: &str) -> usize {
        let Some(templates) = self.templates else {
            return 0;
        };
        let mut count = 0;
        for id in templates.tagged(tag) {
            if self.doc.merge_from(templates, id).is_some() {
                count += 1;
            }
        }
        self.report.merged += count;
        count
    }

    fn decay_countdowns(&mut self) {
        for tag in COUNTDOWN_TAGS {
            for id in self.doc.tagged(tag) {
                let remaining = match self.doc.tag_value(id, tag) {
                    None => 0,
                    Some(raw) => match raw.trim().parse::<i64>() {
                        Ok(v) => v,
                        // Free-form annotation; leave it alone.
                        Err(_) => continue,
                    },
                };
                if remaining > 2 {
                    let next = (remaining - 1).to_string();
                    self.doc.add_tag(id, tag, Some(&next));
                    self.report.decayed += 1;
                } else if remaining == 2 {
                    self.doc.drop_tag(id, tag);
                    self.doc.add_tag(id, TOMORROW, None);
                    self.report.deferred += 1;
                } else {
                    self.doc.drop_tag(id, tag);
                    self.doc.add_tag(id, TODAY, None);
                    self.report.promoted += 1;
                }
            }
        }
    }

    /// Monday: `@nextweek(thursday)` becomes `@thursday`, a bare `@nextweek` becomes `@today`.
    fn resolve_nextweek(&mut self) {
        for id in self.doc.tagged(NEXTWEEK) {
            let target = self
                .doc
                .tag_value(id, NEXTWEEK)
                .and_then(crate::dates::parse_weekday);
            self.doc.drop_tag(id, NEXTWEEK);
            match target {
                Some(day) => self.doc.add_tag(id, weekday_name(day), None),
                None => {
                    self.doc.add_tag(id, TODAY, None);
                    self.report.promoted += 1;
                }
            }
        }
    }
}

/// Apply one day's rollover rules to `doc`.
///
/// Only tags change and template subtrees are inserted; nothing is deleted.
pub fn roll_day(doc: &mut Outline, day: NaiveDate, ctx: &RolloverContext<'_>) -> RolloverReport {
    let weekday = weekday_name(day.weekday());
    let mut pass = Pass {
        doc,
        templates: ctx.templates,
        report: RolloverReport::default(),
    };

    // 1. Yesterday's `tomorrow` is today.
    pass.promote(TOMORROW);
    pass.promote(TOMORROW_MISSPELLED);

    // 2. Recurring items for this weekday.
    pass.merge_templates(weekday);

    // 3. Countdowns.
    pass.decay_countdowns();

    // 4. Pull the next day's weekday items forward to `tomorrow`.
    if ctx.options.carry_tomorrow {
        let next = weekday_name((day + Duration::days(1)).weekday());
        pass.merge_templates(next);
        pass.convert(next, TOMORROW);
    }

    // 5. Daily items.
    pass.merge_templates(DAILY);
    pass.promote(DAILY);

    // 6. The weekend starts on Saturday.
    if day.weekday() == Weekday::Sat {
        pass.promote(WEEKEND);
    }

    // 7. The week starts on Monday.
    if day.weekday() == Weekday::Mon {
        pass.resolve_nextweek();
        pass.merge_templates(WEEKLY);
        pass.promote(WEEKLY);
    }

    // 8. The month starts on the 1st.
    if day.day() == 1 {
        let month = month_name(day);
        pass.merge_templates(MONTHLY);
        pass.promote(MONTHLY);
        pass.promote(NEXTMONTH);
        pass.merge_templates(&month);
        pass.promote(&month);
    }

    // 9. Today's weekday, then last week's deferrals arrive as plain weekday tags.
    pass.promote(weekday);
    for prefix in DEFERRAL_PREFIXES {
        pass.convert(&format!("{prefix}{weekday}"), weekday);
    }

    let report = pass.report;
    debug!(
        day = %day,
        weekday,
        promoted = report.promoted,
        deferred = report.deferred,
        merged = report.merged,
        decayed = report.decayed,
        "Rolled over"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2024-01-02 is a Tuesday.
    const TUESDAY: (i32, u32, u32) = (2024, 1, 2);

    fn roll(text: &str, day: NaiveDate) -> String {
        let mut doc = Outline::parse(text);
        roll_day(&mut doc, day, &RolloverContext::default());
        doc.render()
    }

    fn tuesday() -> NaiveDate {
        date(TUESDAY.0, TUESDAY.1, TUESDAY.2)
    }

    #[test]
    fn tomorrow_and_misspelling_become_today() {
        let out = roll("- a @tomorrow\n- b @tomorow\n", tuesday());
        assert_eq!(out, "- a @today\n- b @today\n");
    }

    #[test]
    fn weekday_tag_waits_for_its_day() {
        let out = roll("- a @monday\n- b @tuesday\n", tuesday());
        assert_eq!(out, "- a @monday\n- b @today\n");
    }

    #[test]
    fn countdown_decays_in_stages() {
        let out = roll(
            "- a @indays(5)\n- b @snooze(2)\n- c @indays(1)\n- d @indays\n- e @snooze(later)\n- f @indays(-3)\n",
            tuesday(),
        );
        assert_eq!(
            out,
            "- a @indays(4)\n- b @tomorrow\n- c @today\n- d @today\n- e @snooze(later)\n- f @today\n"
        );
    }

    #[test]
    fn weekend_only_on_saturday() {
        assert_eq!(roll("- a @weekend\n", date(2024, 1, 5)), "- a @weekend\n");
        assert_eq!(roll("- a @weekend\n", date(2024, 1, 6)), "- a @today\n");
    }

    #[test]
    fn nextweek_resolves_on_monday() {
        let monday = date(2024, 1, 8);
        let out = roll("- a @nextweek\n- b @nextweek(thursday)\n- c @nextweek(monday)\n", monday);
        assert_eq!(out, "- a @today\n- b @thursday\n- c @today\n");
        assert_eq!(roll("- a @nextweek\n", tuesday()), "- a @nextweek\n");
    }

    #[test]
    fn deferred_weekday_becomes_plain_weekday() {
        let out = roll("- a @nexttuesday\n- b @ntuesday\n- c @nfriday\n", tuesday());
        assert_eq!(out, "- a @tuesday\n- b @tuesday\n- c @nfriday\n");
    }

    #[test]
    fn nextmonth_promotes_on_the_first() {
        assert_eq!(roll("- a @nextmonth\n", date(2024, 2, 1)), "- a @today\n");
        assert_eq!(roll("- a @nextmonth\n", date(2024, 2, 2)), "- a @nextmonth\n");
        assert_eq!(roll("- a @february\n", date(2024, 2, 1)), "- a @today\n");
        assert_eq!(roll("- a @march\n", date(2024, 2, 1)), "- a @march\n");
    }

    #[test]
    fn templates_merge_for_weekday_and_daily() {
        let templates = Outline::parse(
            "Routine:\n\t- water plants @tuesday\n\t- stretch @daily\n\t- gym @monday\n",
        );
        let mut doc = Outline::parse("Routine:\n\t- read\n");
        let ctx = RolloverContext {
            templates: Some(&templates),
            options: RolloverOptions::default(),
        };
        let report = roll_day(&mut doc, tuesday(), &ctx);
        assert_eq!(
            doc.render(),
            "Routine:\n\t- read\n\t- water plants @today\n\t- stretch @today\n"
        );
        assert_eq!(report.merged, 2);
        assert_eq!(report.promoted, 2);
        // The template itself is untouched.
        assert_eq!(templates.tagged("daily").len(), 1);
    }

    #[test]
    fn carry_tomorrow_pulls_next_weekday() {
        let templates = Outline::parse("- bins out @wednesday\n");
        let mut doc = Outline::parse("- call plumber @wednesday\n");
        let ctx = RolloverContext {
            templates: Some(&templates),
            options: RolloverOptions {
                carry_tomorrow: true,
            },
        };
        let report = roll_day(&mut doc, tuesday(), &ctx);
        assert_eq!(
            doc.render(),
            "- call plumber @tomorrow\n- bins out @tomorrow\n"
        );
        assert_eq!(report.deferred, 2);
    }

    #[test]
    fn monthly_template_only_on_first() {
        let templates = Outline::parse("- pay rent @monthly\n");
        let ctx = RolloverContext {
            templates: Some(&templates),
            options: RolloverOptions::default(),
        };
        let mut doc = Outline::new();
        roll_day(&mut doc, date(2024, 3, 2), &ctx);
        assert!(doc.is_empty());
        roll_day(&mut doc, date(2024, 4, 1), &ctx);
        assert_eq!(doc.render(), "- pay rent @today\n");
    }
}
