// Shared recurrence cases checked against the `rrule` crate.
//
// Included by the expander unit tests and the workspace integration tests.
// The including module must have `DateWindow`, `Frequency`,
// `RecurrenceRule`, `RuleSpec` and `parse_rule` in scope.

use chrono::{NaiveDate, Weekday};

pub struct RuleCase {
    pub name: &'static str,
    pub rule: RecurrenceRule,
    pub window: DateWindow,
    pub timezone: chrono_tz::Tz,
    /// Exact dates for the cases worth pinning down by hand.
    pub expected: Option<Vec<NaiveDate>>,
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[expect(clippy::too_many_arguments)]
fn case(
    name: &'static str,
    frequency: Frequency,
    interval: u16,
    by_weekday: Vec<Weekday>,
    start: NaiveDate,
    count: Option<u32>,
    until: Option<NaiveDate>,
    window: (NaiveDate, NaiveDate),
) -> RuleCase {
    let rule = RecurrenceRule::new(RuleSpec {
        frequency,
        interval,
        by_weekday,
        start: start.and_hms_opt(10, 0, 0).expect("valid time"),
        count,
        until,
    })
    .expect("case rule is valid");
    RuleCase {
        name,
        rule,
        window: DateWindow::new(window.0, window.1).expect("case window is valid"),
        timezone: chrono_tz::America::Chicago,
        expected: None,
    }
}

/// A case read from the persisted text form, in the Chicago zone.
fn text_case(name: &'static str, text: &str, window: (NaiveDate, NaiveDate)) -> RuleCase {
    let timezone = chrono_tz::America::Chicago;
    RuleCase {
        name,
        rule: parse_rule(text, timezone).expect("case text is valid"),
        window: DateWindow::new(window.0, window.1).expect("case window is valid"),
        timezone,
        expected: None,
    }
}

#[expect(clippy::too_many_lines)]
pub fn cases() -> Vec<RuleCase> {
    use Weekday::{Fri, Mon, Sat, Thu, Tue, Wed};

    let mut cases = vec![
        case(
            "weekly_mon_wed_september",
            Frequency::Weekly,
            1,
            vec![Mon, Wed],
            ymd(2024, 9, 2),
            None,
            None,
            (ymd(2024, 9, 1), ymd(2024, 10, 1)),
        ),
        case(
            "weekly_count_before_window",
            Frequency::Weekly,
            1,
            vec![Tue, Thu],
            ymd(2024, 8, 1),
            Some(10),
            None,
            (ymd(2024, 8, 20), ymd(2024, 10, 1)),
        ),
        case(
            "biweekly_across_year_boundary",
            Frequency::Weekly,
            2,
            vec![Fri],
            ymd(2024, 11, 8),
            None,
            None,
            (ymd(2024, 12, 15), ymd(2025, 2, 1)),
        ),
        case(
            "weekly_until_inclusive",
            Frequency::Weekly,
            1,
            vec![Mon, Wed, Fri],
            ymd(2024, 9, 2),
            None,
            Some(ymd(2024, 9, 20)),
            (ymd(2024, 9, 1), ymd(2024, 10, 1)),
        ),
        case(
            "daily_plain",
            Frequency::Daily,
            1,
            vec![],
            ymd(2024, 2, 20),
            None,
            None,
            (ymd(2024, 2, 25), ymd(2024, 3, 5)),
        ),
        case(
            "daily_every_third_day_filtered",
            Frequency::Daily,
            3,
            vec![Mon, Tue, Wed, Thu, Fri],
            ymd(2024, 9, 1),
            None,
            None,
            (ymd(2024, 9, 1), ymd(2024, 11, 1)),
        ),
        case(
            "daily_count_inside_window",
            Frequency::Daily,
            2,
            vec![],
            ymd(2024, 9, 10),
            Some(4),
            None,
            (ymd(2024, 9, 1), ymd(2024, 10, 1)),
        ),
        case(
            "monthly_on_the_31st",
            Frequency::Monthly,
            1,
            vec![],
            ymd(2024, 1, 31),
            None,
            None,
            (ymd(2024, 1, 1), ymd(2025, 1, 1)),
        ),
        case(
            "quarterly_with_count",
            Frequency::Monthly,
            3,
            vec![],
            ymd(2024, 1, 15),
            Some(3),
            None,
            (ymd(2024, 1, 1), ymd(2025, 1, 1)),
        ),
        case(
            "weekly_across_fall_back",
            Frequency::Weekly,
            1,
            vec![Sat],
            ymd(2024, 10, 19),
            None,
            None,
            (ymd(2024, 10, 25), ymd(2024, 11, 15)),
        ),
    ];

    cases[0].expected = Some(
        [2, 4, 9, 11, 16, 18, 23, 25, 30]
            .iter()
            .map(|day| ymd(2024, 9, *day))
            .collect(),
    );
    cases[3].expected = Some(
        [2, 4, 6, 9, 11, 13, 16, 18, 20]
            .iter()
            .map(|day| ymd(2024, 9, *day))
            .collect(),
    );

    let september = (ymd(2024, 9, 1), ymd(2024, 10, 1));
    let mut until_before_class = text_case(
        "text_until_earlier_than_class_time",
        "DTSTART;TZID=Local:20240902T100000\nRRULE:FREQ=WEEKLY;BYDAY=MO;UNTIL=20240916T080000",
        september,
    );
    until_before_class.expected = Some(vec![ymd(2024, 9, 2), ymd(2024, 9, 9)]);
    let mut until_at_class = text_case(
        "text_until_utc_at_class_time",
        "DTSTART;TZID=Local:20240902T100000\nRRULE:FREQ=WEEKLY;BYDAY=MO;UNTIL=20240916T150000Z",
        september,
    );
    until_at_class.expected = Some(vec![ymd(2024, 9, 2), ymd(2024, 9, 9), ymd(2024, 9, 16)]);
    cases.push(until_before_class);
    cases.push(until_at_class);
    cases
}

/// Local dates the `rrule` crate produces for the case inside its window.
pub fn rrule_dates(case: &RuleCase) -> Vec<NaiveDate> {
    let set = case
        .rule
        .to_rrule_set(case.timezone)
        .expect("rrule accepts the case");
    set.all(2000)
        .dates
        .into_iter()
        .map(|dt| dt.with_timezone(&case.timezone).date_naive())
        .filter(|date| case.window.contains(*date))
        .filter(|date| case.rule.until().is_none_or(|until| *date <= until))
        .collect()
}

pub fn assert_case(case: &RuleCase, actual: &[NaiveDate]) {
    let oracle = rrule_dates(case);
    assert_eq!(actual, oracle.as_slice(), "case {} disagrees with rrule", case.name);
    if let Some(expected) = &case.expected {
        assert_eq!(actual, expected.as_slice(), "case {}", case.name);
    }
}
