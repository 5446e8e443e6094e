#![expect(clippy::expect_used, reason = "test fixtures fail loudly")]
//! Test helpers for integration tests.
//!
//! Every test builds its own service over a fresh in-memory gateway, so
//! tests run in parallel without sharing state.

use std::sync::Arc;

use cadence_test::app::{ConfigHandler, GatewayHandler, api};
use cadence_test::component::config::{GatewayConfig, Settings};
use cadence_test::component::db::memory::MemoryGateway;
use cadence_test::component::model::facility::{ClassInfo, Facility, UserSummary};
use chrono::NaiveDate;
use salvo::http::StatusCode;
use salvo::prelude::*;
use salvo::test::{ResponseExt, TestClient};
use serde_json::{Value, json};
use uuid::Uuid;

const ORIGIN: &str = "http://127.0.0.1:5800";

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// A running service plus the reference rows seeded into its gateway.
pub struct TestApp {
    pub service: Service,
    pub gateway: MemoryGateway,
    pub facility_id: Uuid,
    pub class_id: Uuid,
    pub user_id: Uuid,
}

/// Status and decoded JSON body (`Value::Null` when the body is empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// Asserts that the response status matches the expected code.
    #[must_use]
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status, expected,
            "Expected status {expected} but got {} with body {}",
            self.status, self.body
        );
        self
    }
}

impl TestApp {
    /// Service over a facility in `timezone` with one class and one
    /// enrolled user.
    pub async fn new(timezone: &str) -> Self {
        let gateway = MemoryGateway::new(&GatewayConfig {
            timeout_ms: 500,
            seed_path: None,
        });
        let facility_id = Uuid::new_v4();
        gateway
            .insert_facility(Facility {
                id: facility_id,
                name: "North Unit".to_string(),
                timezone: timezone.to_string(),
            })
            .await
            .expect("facility");

        let mut app = Self {
            service: service_for(&gateway),
            gateway,
            facility_id,
            class_id: Uuid::nil(),
            user_id: Uuid::nil(),
        };
        app.class_id = app.add_class(facility_id, "Algebra I").await;
        app.user_id = app.add_user("Avery", "Quinn").await;
        app.enroll(app.class_id, app.user_id).await;
        app
    }

    pub async fn add_facility(&self, name: &str, timezone: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.gateway
            .insert_facility(Facility {
                id,
                name: name.to_string(),
                timezone: timezone.to_string(),
            })
            .await
            .expect("facility");
        id
    }

    pub async fn add_class(&self, facility_id: Uuid, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.gateway
            .insert_class(ClassInfo {
                id,
                facility_id,
                name: name.to_string(),
                deleted_at: None,
            })
            .await
            .expect("class");
        id
    }

    pub async fn add_user(&self, first: &str, last: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.gateway
            .insert_user(UserSummary {
                id,
                name_first: first.to_string(),
                name_last: last.to_string(),
                doc_id: Some(format!("D-{}", &id.simple().to_string()[..6])),
            })
            .await
            .expect("user");
        id
    }

    pub async fn enroll(&self, class_id: Uuid, user_id: Uuid) {
        self.gateway.enroll(class_id, user_id).await.expect("enrollment");
    }

    /// Creates a weekly Mon/Wed 10:00 event starting 2024-09-02 in room A1.
    pub async fn create_mon_wed_event(&self, class_id: Uuid) -> Uuid {
        let body = json!({
            "rule": {
                "frequency": "weekly",
                "interval": 1,
                "by_weekday": ["Mon", "Wed"],
                "start": "2024-09-02T10:00:00",
            },
            "room": "A1",
            "duration_minutes": 60,
        });
        self.create_event(class_id, &body).await
    }

    pub async fn create_event(&self, class_id: Uuid, body: &Value) -> Uuid {
        let resp = self
            .post(&format!("/api/classes/{class_id}/events"), body)
            .await
            .assert_status(StatusCode::CREATED);
        resp.body["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("created event id")
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        finish(TestClient::get(format!("{ORIGIN}{path}")).send(&self.service).await).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        finish(
            TestClient::post(format!("{ORIGIN}{path}"))
                .json(body)
                .send(&self.service)
                .await,
        )
        .await
    }

    pub async fn put(&self, path: &str, body: &Value) -> TestResponse {
        finish(
            TestClient::put(format!("{ORIGIN}{path}"))
                .json(body)
                .send(&self.service)
                .await,
        )
        .await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        finish(TestClient::delete(format!("{ORIGIN}{path}")).send(&self.service).await).await
    }

    /// Dates (`YYYY-MM-DD`) of the event's live occurrences in September 2024.
    pub async fn september_dates(&self, event_id: Uuid) -> Vec<String> {
        let resp = self
            .get(&format!("/api/events/{event_id}/dates?year=2024&month=9"))
            .await
            .assert_status(StatusCode::OK);
        resp.body
            .as_array()
            .expect("date list")
            .iter()
            .filter_map(|entry| entry["date"].as_str().map(str::to_string))
            .collect()
    }
}

fn service_for(gateway: &MemoryGateway) -> Service {
    let router = Router::new()
        .hoop(GatewayHandler {
            gateway: Arc::new(gateway.clone()),
        })
        .hoop(ConfigHandler::new(Settings::default()))
        .push(api::routes());
    Service::new(router)
}

async fn finish(mut response: Response) -> TestResponse {
    let status = response
        .status_code
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let raw = response.take_string().await.unwrap_or_default();
    let body = if raw.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&raw).unwrap_or(Value::String(raw))
    };
    TestResponse { status, body }
}

/// Occurrences of every day in a calendar response, flattened.
pub fn calendar_occurrences(calendar: &Value) -> Vec<&Value> {
    calendar["days"]
        .as_array()
        .expect("calendar days")
        .iter()
        .flat_map(|day| day["occurrences"].as_array().into_iter().flatten())
        .collect()
}
