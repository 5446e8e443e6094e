//! Recurrence rules for class schedules.
//!
//! ## Module Organization
//!
//! - `rule`: validated rule model (`RecurrenceRule`) and its `rrule` cross-check
//! - `parse`: reader for the persisted `DTSTART`/`RRULE` grammar
//! - `build`: writer for the same grammar
//! - `expand`: date windows, the lazy expander and timezone conversion

pub mod build;
pub mod error;
pub mod expand;
pub mod parse;
pub mod rule;

pub use expand::{DateWindow, Expansion, expand};
pub use rule::{Frequency, RecurrenceRule, RuleSpec};
