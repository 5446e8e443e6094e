//! Scheduling and attendance services.
//!
//! Everything here is a function of data fetched through the
//! [`ScheduleGateway`](cadence_db::db::ScheduleGateway) plus explicit
//! per-request configuration. No state is shared between calls.

pub mod attendance;
pub mod context;
pub mod error;
pub mod pagination;
pub mod schedule;
