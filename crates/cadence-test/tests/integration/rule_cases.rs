//! Shared recurrence cases, expanded through the public crate API.

use cadence_test::component::recur::parse::parse_rule;
use cadence_test::component::recur::{DateWindow, Frequency, RecurrenceRule, RuleSpec, expand};

include!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../cadence-recur/tests/rule_cases_data/mod.rs"
));

#[test]
fn public_expander_agrees_with_rrule() {
    for case in cases() {
        let actual: Vec<NaiveDate> = expand(&case.rule, case.window).collect();
        assert_case(&case, &actual);
    }
}

#[test]
fn expansion_restarts_from_any_window() {
    for case in cases() {
        let full: Vec<NaiveDate> = expand(&case.rule, case.window).collect();
        let Some(middle) = full.get(full.len() / 2).copied() else {
            continue;
        };
        let tail_window = DateWindow::new(middle, case.window.end()).expect("tail window");
        let tail: Vec<NaiveDate> = expand(&case.rule, tail_window).collect();
        assert_eq!(tail, full[full.len() / 2..], "case {}", case.name);
    }
}
