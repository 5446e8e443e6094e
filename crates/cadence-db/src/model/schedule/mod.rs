use cadence_recur::RecurrenceRule;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::enums::OverrideScope;

/// One recurring schedule of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub id: uuid::Uuid,
    pub class_id: uuid::Uuid,
    pub rule: RecurrenceRule,
    pub room: String,
    pub duration_minutes: u32,
    /// Set when the owning class is soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScheduledEvent {
    pub class_id: uuid::Uuid,
    pub rule: RecurrenceRule,
    pub room: String,
    pub duration_minutes: u32,
}

/// Replacement values carried by a rescheduling override. Unset fields
/// keep whatever value was in effect before.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Substitution {
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

impl Substitution {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_time.is_none() && self.room.is_none() && self.duration_minutes.is_none()
    }

    /// Layers `self` on top of `base`, keeping base values for unset fields.
    #[must_use]
    pub fn over(&self, base: &Self) -> Self {
        Self {
            start_time: self.start_time.or(base.start_time),
            room: self.room.clone().or_else(|| base.room.clone()),
            duration_minutes: self.duration_minutes.or(base.duration_minutes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverrideKind {
    Cancelled,
    Rescheduled(Substitution),
}

/// Append-only exception to an event's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Override {
    pub id: uuid::Uuid,
    pub event_id: uuid::Uuid,
    pub effective_date: NaiveDate,
    #[serde(flatten)]
    pub kind: OverrideKind,
    pub scope: OverrideScope,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOverride {
    pub event_id: uuid::Uuid,
    pub effective_date: NaiveDate,
    #[serde(flatten)]
    pub kind: OverrideKind,
    pub scope: OverrideScope,
    #[serde(default)]
    pub reason: Option<String>,
}
