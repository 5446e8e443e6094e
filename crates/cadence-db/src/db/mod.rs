//! Persistence gateway seam.
//!
//! The scheduling core only talks to storage through [`ScheduleGateway`].
//! Implementations own their timeouts and report failures as [`DbError`](crate::error::DbError).

use std::future::Future;
use std::pin::Pin;

use cadence_recur::DateWindow;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::DbResult;
use crate::model::attendance::{AttendanceRecord, AttendanceUpsert};
use crate::model::facility::{Facility, UserSummary};
use crate::model::schedule::{NewOverride, NewScheduledEvent, Override, ScheduledEvent};

pub mod enums;
pub mod memory;

/// Boxed future returned by every gateway operation.
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = DbResult<T>> + Send + 'a>>;

/// Which events a calendar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarScope {
    /// Every live event at the facility.
    Facility(Uuid),
    /// Events of the classes the user is enrolled in at the facility.
    User { facility_id: Uuid, user_id: Uuid },
}

impl CalendarScope {
    #[must_use]
    pub const fn facility_id(&self) -> Uuid {
        match self {
            Self::Facility(facility_id) | Self::User { facility_id, .. } => *facility_id,
        }
    }
}

/// What an attendance upsert did to the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
    Unchanged,
}

pub trait ScheduleGateway: Send + Sync {
    fn get_facility(&self, facility_id: Uuid) -> GatewayFuture<'_, Facility>;

    /// Facility owning a (not soft-deleted) class.
    fn get_facility_for_class(&self, class_id: Uuid) -> GatewayFuture<'_, Facility>;

    /// Live events visible in `scope`, ordered by id.
    fn get_scheduled_events_for_scope(
        &self,
        scope: CalendarScope,
    ) -> GatewayFuture<'_, Vec<ScheduledEvent>>;

    /// A live event; soft-deleted events are reported as not found.
    fn get_event(&self, event_id: Uuid) -> GatewayFuture<'_, ScheduledEvent>;

    fn create_event(&self, event: NewScheduledEvent) -> GatewayFuture<'_, ScheduledEvent>;

    /// Every override ever recorded for the event, oldest first.
    fn get_overrides_for_event(&self, event_id: Uuid) -> GatewayFuture<'_, Vec<Override>>;

    /// Appends an override. A second forward override on the same event and
    /// date is rejected with `DbError::Conflict`.
    fn create_override(&self, new_override: NewOverride) -> GatewayFuture<'_, Override>;

    /// Attendance records of the event with dates inside `range`.
    fn get_attendance_for_event(
        &self,
        event_id: Uuid,
        range: DateWindow,
    ) -> GatewayFuture<'_, Vec<AttendanceRecord>>;

    /// Inserts or updates the record keyed by (event, user, date).
    fn upsert_attendance(
        &self,
        upsert: AttendanceUpsert,
    ) -> GatewayFuture<'_, (AttendanceRecord, UpsertOutcome)>;

    /// Removes the keyed record. Returns whether one existed.
    fn delete_attendance(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
    ) -> GatewayFuture<'_, bool>;

    /// Display fields for the given users; unknown ids are skipped.
    fn get_users(&self, user_ids: Vec<Uuid>) -> GatewayFuture<'_, Vec<UserSummary>>;

    fn is_enrolled(&self, class_id: Uuid, user_id: Uuid) -> GatewayFuture<'_, bool>;

    fn count_enrolled(&self, class_id: Uuid) -> GatewayFuture<'_, u32>;
}
