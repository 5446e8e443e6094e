use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Facility {
    pub id: uuid::Uuid,
    pub name: String,
    /// Timezone identifier as configured; may be a Windows or vendor-prefixed id.
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassInfo {
    pub id: uuid::Uuid,
    pub facility_id: uuid::Uuid,
    pub name: String,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Display fields joined into attendance listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: uuid::Uuid,
    pub name_first: String,
    pub name_last: String,
    pub doc_id: Option<String>,
}
