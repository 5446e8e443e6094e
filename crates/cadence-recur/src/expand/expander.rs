use std::collections::VecDeque;
use std::iter::FusedIterator;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::expand::window::DateWindow;
use crate::rule::{Frequency, RecurrenceRule};

/// Lazy sequence of facility-local dates produced by a rule inside a window.
///
/// Dates come out strictly increasing. The sequence is finite even for
/// unbounded rules because it stops at the window end. Calling [`expand`]
/// again restarts it.
#[derive(Debug, Clone)]
pub struct Expansion<'a> {
    rule: &'a RecurrenceRule,
    window: DateWindow,
    /// Index of the next period (day, week or month) to generate.
    period: u32,
    pending: VecDeque<NaiveDate>,
    /// Candidates seen since the rule start, for `COUNT`.
    seen: u32,
    finished: bool,
}

/// ## Summary
/// Expands `rule` to the dates it produces inside `window`.
///
/// `COUNT` is applied from the rule start, so occurrences before the window
/// still use up the count. `UNTIL` is inclusive. A rule starting on or after
/// the window end yields nothing.
#[must_use]
pub fn expand(rule: &RecurrenceRule, window: DateWindow) -> Expansion<'_> {
    let finished = window.is_empty() || rule.start_date() >= window.end();
    // Without a count nothing before the window matters, so skip ahead.
    let period = if finished || rule.count().is_some() {
        0
    } else {
        first_period_touching(rule, window.start())
    };

    tracing::trace!(
        rule = %rule,
        window_start = %window.start(),
        window_end = %window.end(),
        period,
        "Expanding recurrence rule"
    );

    Expansion {
        rule,
        window,
        period,
        pending: VecDeque::new(),
        seen: 0,
        finished,
    }
}

impl Expansion<'_> {
    fn finish(&mut self) -> Option<NaiveDate> {
        self.finished = true;
        self.pending.clear();
        None
    }

    /// Queues the candidates of the current period. Returns false once the
    /// walk has moved past the window or the until date.
    fn refill(&mut self) -> bool {
        let Some(period_start) = period_start(self.rule, self.period) else {
            return false;
        };
        if period_start >= self.window.end()
            || self.rule.until().is_some_and(|until| period_start > until)
        {
            return false;
        }
        push_candidates(self.rule, self.period, &mut self.pending);
        match self.period.checked_add(1) {
            Some(next) => {
                self.period = next;
                true
            }
            None => false,
        }
    }
}

impl Iterator for Expansion<'_> {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }
            let Some(date) = self.pending.pop_front() else {
                if !self.refill() {
                    return self.finish();
                }
                continue;
            };

            if self.rule.until().is_some_and(|until| date > until) {
                return self.finish();
            }
            if self.rule.count().is_some_and(|count| self.seen >= count) {
                return self.finish();
            }
            self.seen += 1;

            if date >= self.window.end() {
                return self.finish();
            }
            if date >= self.window.start() {
                return Some(date);
            }
        }
    }
}

impl FusedIterator for Expansion<'_> {}

/// First date of the given period, used to decide when to stop walking.
fn period_start(rule: &RecurrenceRule, period: u32) -> Option<NaiveDate> {
    let start = rule.start_date();
    let step = period.checked_mul(u32::from(rule.interval()))?;
    match rule.frequency() {
        Frequency::Daily => start.checked_add_days(Days::new(u64::from(step))),
        Frequency::Weekly => week_start(start).checked_add_days(Days::new(u64::from(step) * 7)),
        Frequency::Monthly => start
            .with_day(1)?
            .checked_add_months(Months::new(step)),
    }
}

fn push_candidates(rule: &RecurrenceRule, period: u32, out: &mut VecDeque<NaiveDate>) {
    let Some(anchor) = period_start(rule, period) else {
        return;
    };
    let start = rule.start_date();
    match rule.frequency() {
        Frequency::Daily => {
            if rule.by_weekday().is_empty() || rule.by_weekday().contains(&anchor.weekday()) {
                out.push_back(anchor);
            }
        }
        Frequency::Weekly => {
            out.extend(
                rule.by_weekday()
                    .iter()
                    .filter_map(|day| {
                        anchor.checked_add_days(Days::new(u64::from(day.num_days_from_monday())))
                    })
                    .filter(|date| *date >= start),
            );
        }
        // Months without the start's day of month are skipped.
        Frequency::Monthly => {
            if let Some(date) = anchor.with_day(start.day()) {
                out.push_back(date);
            }
        }
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).first_day()
}

/// Index of the first period that can contain a date on or after `from`.
fn first_period_touching(rule: &RecurrenceRule, from: NaiveDate) -> u32 {
    let start = rule.start_date();
    if from <= start {
        return 0;
    }
    let interval = i64::from(rule.interval());
    let elapsed = match rule.frequency() {
        // Daily periods are single dates, so round up.
        Frequency::Daily => {
            let days = u64::try_from((from - start).num_days()).unwrap_or(0);
            let periods = days.div_ceil(u64::from(rule.interval()));
            return u32::try_from(periods).unwrap_or(u32::MAX);
        }
        Frequency::Weekly => (week_start(from) - week_start(start)).num_days() / 7,
        Frequency::Monthly => {
            let months = |date: NaiveDate| i64::from(date.year()) * 12 + i64::from(date.month0());
            months(from) - months(start)
        }
    };
    to_period(elapsed / interval)
}

fn to_period(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
