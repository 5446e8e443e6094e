//! Workspace integration tests driving the HTTP API end to end.

mod calendars;
mod dst;
mod helpers;
mod rule_cases;
mod scenarios;
