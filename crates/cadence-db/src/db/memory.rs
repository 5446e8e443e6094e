//! In-memory gateway used by the binary and by every test.
//!
//! Behaves like a store with unique keys on attendance (event, user, date)
//! and on forward overrides (event, date). Lock acquisition is bounded by
//! the configured timeout, and the store can be switched offline.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use cadence_core::config::GatewayConfig;
use cadence_recur::DateWindow;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::db::enums::OverrideScope;
use crate::db::{CalendarScope, GatewayFuture, ScheduleGateway, UpsertOutcome};
use crate::error::{DbError, DbResult};
use crate::model::attendance::{AttendanceRecord, AttendanceUpsert};
use crate::model::facility::{ClassInfo, Facility, UserSummary};
use crate::model::schedule::{NewOverride, NewScheduledEvent, Override, ScheduledEvent};

type AttendanceKey = (Uuid, Uuid, NaiveDate);

#[derive(Debug, Default)]
struct State {
    facilities: HashMap<Uuid, Facility>,
    classes: HashMap<Uuid, ClassInfo>,
    users: HashMap<Uuid, UserSummary>,
    /// (class, user) pairs.
    enrollments: HashSet<(Uuid, Uuid)>,
    events: BTreeMap<Uuid, ScheduledEvent>,
    overrides: Vec<Override>,
    attendance: BTreeMap<AttendanceKey, AttendanceRecord>,
}

impl State {
    fn live_class(&self, class_id: Uuid) -> DbResult<&ClassInfo> {
        self.classes
            .get(&class_id)
            .filter(|class| class.deleted_at.is_none())
            .ok_or_else(|| DbError::NotFound(format!("class {class_id}")))
    }

    fn facility(&self, facility_id: Uuid) -> DbResult<&Facility> {
        self.facilities
            .get(&facility_id)
            .ok_or_else(|| DbError::NotFound(format!("facility {facility_id}")))
    }
}

/// Reference data loaded into an empty store at startup.
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub facilities: Vec<Facility>,
    #[serde(default)]
    pub classes: Vec<ClassInfo>,
    #[serde(default)]
    pub users: Vec<UserSummary>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Enrollment {
    pub class_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct MemoryGateway {
    state: Arc<RwLock<State>>,
    timeout: Duration,
    available: Arc<AtomicBool>,
}

impl MemoryGateway {
    #[must_use]
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            timeout: Duration::from_millis(config.timeout_ms),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Switches the store on or off. While off, every operation fails with
    /// `DbError::Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
        tracing::warn!(available, "Memory gateway availability changed");
    }

    async fn read(&self) -> DbResult<RwLockReadGuard<'_, State>> {
        self.ensure_available()?;
        tokio::time::timeout(self.timeout, self.state.read())
            .await
            .map_err(|_elapsed| DbError::Timeout)
    }

    async fn write(&self) -> DbResult<RwLockWriteGuard<'_, State>> {
        self.ensure_available()?;
        tokio::time::timeout(self.timeout, self.state.write())
            .await
            .map_err(|_elapsed| DbError::Timeout)
    }

    fn ensure_available(&self) -> DbResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DbError::Unavailable("memory gateway is offline".to_string()))
        }
    }

    /// ## Summary
    /// Stores a facility, replacing any facility with the same id.
    ///
    /// ## Errors
    /// Returns `DbError::Unavailable` or `DbError::Timeout` if the store cannot be locked.
    pub async fn insert_facility(&self, facility: Facility) -> DbResult<()> {
        self.write().await?.facilities.insert(facility.id, facility);
        Ok(())
    }

    /// ## Summary
    /// Stores a class.
    ///
    /// ## Errors
    /// Returns `DbError::NotFound` if the class's facility is unknown.
    pub async fn insert_class(&self, class: ClassInfo) -> DbResult<()> {
        let mut state = self.write().await?;
        state.facility(class.facility_id)?;
        state.classes.insert(class.id, class);
        Ok(())
    }

    /// ## Summary
    /// Stores a user's display fields.
    ///
    /// ## Errors
    /// Returns `DbError::Unavailable` or `DbError::Timeout` if the store cannot be locked.
    pub async fn insert_user(&self, user: UserSummary) -> DbResult<()> {
        self.write().await?.users.insert(user.id, user);
        Ok(())
    }

    /// ## Summary
    /// Enrolls a known user in a live class.
    ///
    /// ## Errors
    /// Returns `DbError::NotFound` if the class or user is unknown.
    pub async fn enroll(&self, class_id: Uuid, user_id: Uuid) -> DbResult<()> {
        let mut state = self.write().await?;
        state.live_class(class_id)?;
        if !state.users.contains_key(&user_id) {
            return Err(DbError::NotFound(format!("user {user_id}")));
        }
        state.enrollments.insert((class_id, user_id));
        Ok(())
    }

    /// ## Summary
    /// Loads seed data. Facilities go in first so classes can reference them,
    /// and enrollments last.
    ///
    /// ## Errors
    /// Returns `DbError::NotFound` if a class or enrollment references an unknown row.
    #[tracing::instrument(skip_all, fields(
        facilities = seed.facilities.len(),
        classes = seed.classes.len(),
        users = seed.users.len(),
    ))]
    pub async fn load_seed(&self, seed: Seed) -> DbResult<()> {
        for facility in seed.facilities {
            self.insert_facility(facility).await?;
        }
        for class in seed.classes {
            self.insert_class(class).await?;
        }
        for user in seed.users {
            self.insert_user(user).await?;
        }
        for enrollment in seed.enrollments {
            self.enroll(enrollment.class_id, enrollment.user_id).await?;
        }
        tracing::info!("Seed data loaded");
        Ok(())
    }

    /// ## Summary
    /// Soft-deletes a class together with its events.
    ///
    /// ## Errors
    /// Returns `DbError::NotFound` if the class is unknown or already deleted.
    pub async fn soft_delete_class(&self, class_id: Uuid) -> DbResult<()> {
        let mut state = self.write().await?;
        state.live_class(class_id)?;
        let now = Utc::now();
        if let Some(class) = state.classes.get_mut(&class_id) {
            class.deleted_at = Some(now);
        }
        for event in state.events.values_mut().filter(|event| event.class_id == class_id) {
            event.deleted_at = Some(now);
        }
        tracing::info!(%class_id, "Class soft-deleted");
        Ok(())
    }
}

impl ScheduleGateway for MemoryGateway {
    #[tracing::instrument(skip(self))]
    fn get_facility(&self, facility_id: Uuid) -> GatewayFuture<'_, Facility> {
        Box::pin(async move { Ok(self.read().await?.facility(facility_id)?.clone()) })
    }

    #[tracing::instrument(skip(self))]
    fn get_facility_for_class(&self, class_id: Uuid) -> GatewayFuture<'_, Facility> {
        Box::pin(async move {
            let state = self.read().await?;
            let class = state.live_class(class_id)?;
            Ok(state.facility(class.facility_id)?.clone())
        })
    }

    #[tracing::instrument(skip(self))]
    fn get_scheduled_events_for_scope(
        &self,
        scope: CalendarScope,
    ) -> GatewayFuture<'_, Vec<ScheduledEvent>> {
        Box::pin(async move {
            let state = self.read().await?;
            state.facility(scope.facility_id())?;

            let visible = |event: &ScheduledEvent| {
                let Some(class) = state.classes.get(&event.class_id) else {
                    return false;
                };
                if event.deleted_at.is_some()
                    || class.deleted_at.is_some()
                    || class.facility_id != scope.facility_id()
                {
                    return false;
                }
                match scope {
                    CalendarScope::Facility(_) => true,
                    CalendarScope::User { user_id, .. } => {
                        state.enrollments.contains(&(class.id, user_id))
                    }
                }
            };

            let events: Vec<ScheduledEvent> =
                state.events.values().filter(|event| visible(event)).cloned().collect();
            tracing::debug!(count = events.len(), "Fetched events for scope");
            Ok(events)
        })
    }

    #[tracing::instrument(skip(self))]
    fn get_event(&self, event_id: Uuid) -> GatewayFuture<'_, ScheduledEvent> {
        Box::pin(async move {
            self.read()
                .await?
                .events
                .get(&event_id)
                .filter(|event| event.deleted_at.is_none())
                .cloned()
                .ok_or_else(|| DbError::NotFound(format!("event {event_id}")))
        })
    }

    #[tracing::instrument(skip(self, event), fields(class_id = %event.class_id))]
    fn create_event(&self, event: NewScheduledEvent) -> GatewayFuture<'_, ScheduledEvent> {
        Box::pin(async move {
            let mut state = self.write().await?;
            state.live_class(event.class_id)?;

            let created = ScheduledEvent {
                id: Uuid::now_v7(),
                class_id: event.class_id,
                rule: event.rule,
                room: event.room,
                duration_minutes: event.duration_minutes,
                deleted_at: None,
            };
            state.events.insert(created.id, created.clone());
            tracing::debug!(event_id = %created.id, "Event stored");
            Ok(created)
        })
    }

    #[tracing::instrument(skip(self))]
    fn get_overrides_for_event(&self, event_id: Uuid) -> GatewayFuture<'_, Vec<Override>> {
        Box::pin(async move {
            let state = self.read().await?;
            Ok(state
                .overrides
                .iter()
                .filter(|entry| entry.event_id == event_id)
                .cloned()
                .collect())
        })
    }

    #[tracing::instrument(
        skip(self, new_override),
        fields(event_id = %new_override.event_id, date = %new_override.effective_date)
    )]
    fn create_override(&self, new_override: NewOverride) -> GatewayFuture<'_, Override> {
        Box::pin(async move {
            let mut state = self.write().await?;
            if !state.events.contains_key(&new_override.event_id) {
                return Err(DbError::NotFound(format!("event {}", new_override.event_id)));
            }
            let duplicate_forward = new_override.scope == OverrideScope::Forward
                && state.overrides.iter().any(|existing| {
                    existing.event_id == new_override.event_id
                        && existing.effective_date == new_override.effective_date
                        && existing.scope == OverrideScope::Forward
                });
            if duplicate_forward {
                return Err(DbError::Conflict(format!(
                    "forward override already exists for event {} on {}",
                    new_override.event_id, new_override.effective_date
                )));
            }

            let stored = Override {
                id: Uuid::now_v7(),
                event_id: new_override.event_id,
                effective_date: new_override.effective_date,
                kind: new_override.kind,
                scope: new_override.scope,
                reason: new_override.reason,
                created_at: Utc::now(),
            };
            state.overrides.push(stored.clone());
            Ok(stored)
        })
    }

    #[tracing::instrument(skip(self))]
    fn get_attendance_for_event(
        &self,
        event_id: Uuid,
        range: DateWindow,
    ) -> GatewayFuture<'_, Vec<AttendanceRecord>> {
        Box::pin(async move {
            let state = self.read().await?;
            Ok(state
                .attendance
                .values()
                .filter(|record| record.event_id == event_id && range.contains(record.date))
                .cloned()
                .collect())
        })
    }

    #[tracing::instrument(
        skip(self, upsert),
        fields(event_id = %upsert.event_id, user_id = %upsert.user_id, date = %upsert.date)
    )]
    fn upsert_attendance(
        &self,
        upsert: AttendanceUpsert,
    ) -> GatewayFuture<'_, (AttendanceRecord, UpsertOutcome)> {
        Box::pin(async move {
            let mut state = self.write().await?;
            let key = upsert.key();

            if let Some(existing) = state.attendance.get_mut(&key) {
                if existing.matches(&upsert) {
                    return Ok((existing.clone(), UpsertOutcome::Unchanged));
                }
                existing.status = upsert.status;
                existing.note = upsert.note;
                existing.check_in_at = upsert.check_in_at;
                existing.check_out_at = upsert.check_out_at;
                existing.minutes_attended = upsert.minutes_attended;
                existing.scheduled_minutes = upsert.scheduled_minutes;
                return Ok((existing.clone(), UpsertOutcome::Updated));
            }

            let record = AttendanceRecord {
                id: Uuid::now_v7(),
                event_id: upsert.event_id,
                user_id: upsert.user_id,
                date: upsert.date,
                status: upsert.status,
                note: upsert.note,
                check_in_at: upsert.check_in_at,
                check_out_at: upsert.check_out_at,
                minutes_attended: upsert.minutes_attended,
                scheduled_minutes: upsert.scheduled_minutes,
            };
            state.attendance.insert(key, record.clone());
            Ok((record, UpsertOutcome::Created))
        })
    }

    #[tracing::instrument(skip(self))]
    fn delete_attendance(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
    ) -> GatewayFuture<'_, bool> {
        Box::pin(async move {
            let removed = self
                .write()
                .await?
                .attendance
                .remove(&(event_id, user_id, date))
                .is_some();
            Ok(removed)
        })
    }

    #[tracing::instrument(skip(self, user_ids), fields(count = user_ids.len()))]
    fn get_users(&self, user_ids: Vec<Uuid>) -> GatewayFuture<'_, Vec<UserSummary>> {
        Box::pin(async move {
            let state = self.read().await?;
            Ok(user_ids
                .iter()
                .filter_map(|id| state.users.get(id).cloned())
                .collect())
        })
    }

    #[tracing::instrument(skip(self))]
    fn is_enrolled(&self, class_id: Uuid, user_id: Uuid) -> GatewayFuture<'_, bool> {
        Box::pin(async move { Ok(self.read().await?.enrollments.contains(&(class_id, user_id))) })
    }

    #[tracing::instrument(skip(self))]
    fn count_enrolled(&self, class_id: Uuid) -> GatewayFuture<'_, u32> {
        Box::pin(async move {
            let state = self.read().await?;
            let count = state
                .enrollments
                .iter()
                .filter(|(enrolled_class, _)| *enrolled_class == class_id)
                .count();
            Ok(u32::try_from(count).unwrap_or(u32::MAX))
        })
    }
}
