use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::db::enums::AttendanceStatus;

/// Attendance of one user at one occurrence, keyed by (event, user, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: uuid::Uuid,
    pub event_id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub note: Option<String>,
    #[serde(with = "hh_mm")]
    pub check_in_at: Option<NaiveTime>,
    #[serde(with = "hh_mm")]
    pub check_out_at: Option<NaiveTime>,
    pub minutes_attended: Option<u32>,
    pub scheduled_minutes: Option<u32>,
}

impl AttendanceRecord {
    /// Returns true when `upsert` would leave this record as it is.
    #[must_use]
    pub fn matches(&self, upsert: &AttendanceUpsert) -> bool {
        self.status == upsert.status
            && self.note == upsert.note
            && self.check_in_at == upsert.check_in_at
            && self.check_out_at == upsert.check_out_at
            && self.minutes_attended == upsert.minutes_attended
            && self.scheduled_minutes == upsert.scheduled_minutes
    }
}

/// Write model for an attendance upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceUpsert {
    pub event_id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub note: Option<String>,
    pub check_in_at: Option<NaiveTime>,
    pub check_out_at: Option<NaiveTime>,
    pub minutes_attended: Option<u32>,
    pub scheduled_minutes: Option<u32>,
}

impl AttendanceUpsert {
    #[must_use]
    pub const fn key(&self) -> (uuid::Uuid, uuid::Uuid, NaiveDate) {
        (self.event_id, self.user_id, self.date)
    }
}

/// `HH:MM` wire form for optional wall-clock times.
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    #[expect(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_some(&time.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| NaiveTime::parse_from_str(&text, FORMAT).map_err(serde::de::Error::custom))
            .transpose()
    }
}
