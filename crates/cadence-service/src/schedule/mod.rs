//! Occurrence resolution, calendars and schedule writes.

pub mod calendar;
pub mod occurrence;
pub mod resolver;
pub mod write;

pub use resolver::{Occurrence, resolve, resolve_all};
