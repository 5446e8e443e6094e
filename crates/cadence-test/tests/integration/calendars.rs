//! Calendar scopes and presentation options.

use salvo::http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, calendar_occurrences};

#[test_log::test(tokio::test)]
async fn user_calendar_only_shows_enrolled_classes() {
    let app = TestApp::new("America/Chicago").await;
    let other_class = app.add_class(app.facility_id, "Welding").await;
    let enrolled_event = app.create_mon_wed_event(app.class_id).await;
    app.create_mon_wed_event(other_class).await;

    let facility = app
        .get(&format!(
            "/api/facilities/{}/calendar?year=2024&month=9",
            app.facility_id
        ))
        .await
        .assert_status(StatusCode::OK)
        .body;
    assert_eq!(calendar_occurrences(&facility).len(), 18);

    let user = app
        .get(&format!(
            "/api/facilities/{}/users/{}/calendar?year=2024&month=9",
            app.facility_id, app.user_id
        ))
        .await
        .assert_status(StatusCode::OK)
        .body;
    let occurrences = calendar_occurrences(&user);
    assert_eq!(occurrences.len(), 9);
    assert!(
        occurrences
            .iter()
            .all(|occurrence| occurrence["event_id"] == enrolled_event.to_string())
    );
}

#[test_log::test(tokio::test)]
async fn cancelled_occurrences_are_flagged_on_request() {
    let app = TestApp::new("America/Chicago").await;
    let event_id = app.create_mon_wed_event(app.class_id).await;
    app.put(
        &format!("/api/events/{event_id}/overrides"),
        &json!({
            "effective_date": "2024-09-18",
            "kind": "cancelled",
            "scope": "single_occurrence",
        }),
    )
    .await
    .assert_status(StatusCode::CREATED);

    let path = format!(
        "/api/facilities/{}/calendar?start=2024-09-16&end=2024-09-23",
        app.facility_id
    );
    let hidden = app.get(&path).await.assert_status(StatusCode::OK).body;
    assert_eq!(calendar_occurrences(&hidden).len(), 1);
    assert_eq!(hidden["days"].as_array().map(Vec::len), Some(7));

    let shown = app
        .get(&format!("{path}&include_cancelled=true"))
        .await
        .assert_status(StatusCode::OK)
        .body;
    let occurrences = calendar_occurrences(&shown);
    assert_eq!(occurrences.len(), 2);
    assert_eq!(occurrences[1]["date"], "2024-09-18");
    assert_eq!(occurrences[1]["is_cancelled"], true);
}

#[test_log::test(tokio::test)]
async fn same_day_occurrences_can_be_ordered_by_room() {
    let app = TestApp::new("America/Chicago").await;
    let second_class = app.add_class(app.facility_id, "Reading").await;
    app.create_event(
        app.class_id,
        &json!({
            "rule": { "frequency": "daily", "start": "2024-09-02T08:00:00" },
            "room": "Z9",
            "duration_minutes": 30,
        }),
    )
    .await;
    app.create_event(
        second_class,
        &json!({
            "rule": { "frequency": "daily", "start": "2024-09-02T13:00:00" },
            "room": "C3",
            "duration_minutes": 30,
        }),
    )
    .await;

    let path = format!(
        "/api/facilities/{}/calendar?start=2024-09-02&end=2024-09-03",
        app.facility_id
    );
    let by_time = app.get(&path).await.assert_status(StatusCode::OK).body;
    let rooms: Vec<_> = calendar_occurrences(&by_time)
        .iter()
        .map(|occurrence| occurrence["room"].clone())
        .collect();
    assert_eq!(rooms, [json!("Z9"), json!("C3")]);

    let by_room = app
        .get(&format!("{path}&order=by_room"))
        .await
        .assert_status(StatusCode::OK)
        .body;
    let rooms: Vec<_> = calendar_occurrences(&by_room)
        .iter()
        .map(|occurrence| occurrence["room"].clone())
        .collect();
    assert_eq!(rooms, [json!("C3"), json!("Z9")]);
}

#[test_log::test(tokio::test)]
async fn several_facilities_are_built_together() {
    let app = TestApp::new("America/Chicago").await;
    let west = app.add_facility("West Unit", "America/Los_Angeles").await;
    let west_class = app.add_class(west, "Carpentry").await;
    app.create_mon_wed_event(app.class_id).await;
    app.create_mon_wed_event(west_class).await;

    let calendars = app
        .get(&format!(
            "/api/facilities/calendars?ids={},{west}&year=2024&month=9",
            app.facility_id
        ))
        .await
        .assert_status(StatusCode::OK)
        .body;
    let calendars = calendars.as_array().expect("calendar list");
    assert_eq!(calendars.len(), 2);
    assert_eq!(calendars[0]["timezone"], "America/Chicago");
    assert_eq!(calendars[1]["timezone"], "America/Los_Angeles");
    assert_eq!(calendar_occurrences(&calendars[1]).len(), 9);
}

#[test_log::test(tokio::test)]
async fn unknown_facility_is_not_found() {
    let app = TestApp::new("America/Chicago").await;
    app.get(&format!(
        "/api/facilities/{}/calendar?year=2024&month=9",
        uuid::Uuid::new_v4()
    ))
    .await
    .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn offline_gateway_surfaces_as_unavailable() {
    let app = TestApp::new("America/Chicago").await;
    app.gateway.set_available(false);
    app.get(&format!(
        "/api/facilities/{}/calendar?year=2024&month=9",
        app.facility_id
    ))
    .await
    .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}
