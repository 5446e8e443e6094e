//! Weekly Mon/Wed event walked through cancellation, a forward room change
//! and the attendance lifecycle.

use salvo::http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, calendar_occurrences};

const CHICAGO: &str = "America/Chicago";

#[test_log::test(tokio::test)]
async fn weekly_event_expands_over_september() {
    let app = TestApp::new(CHICAGO).await;
    let event_id = app.create_mon_wed_event(app.class_id).await;

    let dates = app.september_dates(event_id).await;
    assert_eq!(
        dates,
        [
            "2024-09-02",
            "2024-09-04",
            "2024-09-09",
            "2024-09-11",
            "2024-09-16",
            "2024-09-18",
            "2024-09-23",
            "2024-09-25",
            "2024-09-30"
        ]
    );
}

#[test_log::test(tokio::test)]
async fn single_cancellation_removes_one_date() {
    let app = TestApp::new(CHICAGO).await;
    let event_id = app.create_mon_wed_event(app.class_id).await;

    app.put(
        &format!("/api/events/{event_id}/overrides"),
        &json!({
            "effective_date": "2024-09-09",
            "kind": "cancelled",
            "scope": "single_occurrence",
            "reason": "Facility lockdown",
        }),
    )
    .await
    .assert_status(StatusCode::CREATED);

    let dates = app.september_dates(event_id).await;
    assert_eq!(dates.len(), 8);
    assert!(!dates.contains(&"2024-09-09".to_string()));
    assert!(dates.contains(&"2024-09-11".to_string()));
}

#[test_log::test(tokio::test)]
async fn forward_room_change_applies_from_effective_date() {
    let app = TestApp::new(CHICAGO).await;
    let event_id = app.create_mon_wed_event(app.class_id).await;

    app.put(
        &format!("/api/events/{event_id}/overrides"),
        &json!({
            "effective_date": "2024-09-16",
            "kind": "rescheduled",
            "room": "B12",
            "scope": "forward",
        }),
    )
    .await
    .assert_status(StatusCode::CREATED);

    let calendar = app
        .get(&format!(
            "/api/facilities/{}/calendar?year=2024&month=9",
            app.facility_id
        ))
        .await
        .assert_status(StatusCode::OK)
        .body;

    let occurrences = calendar_occurrences(&calendar);
    assert_eq!(occurrences.len(), 9);
    for occurrence in occurrences {
        let date = occurrence["date"].as_str().expect("date");
        let expected = if date >= "2024-09-16" { "B12" } else { "A1" };
        assert_eq!(occurrence["room"], expected, "room on {date}");
    }
}

#[test_log::test(tokio::test)]
async fn attendance_on_cancelled_date_is_rejected() {
    let app = TestApp::new(CHICAGO).await;
    let event_id = app.create_mon_wed_event(app.class_id).await;

    app.put(
        &format!("/api/events/{event_id}/overrides"),
        &json!({
            "effective_date": "2024-09-09",
            "kind": "cancelled",
            "scope": "single_occurrence",
        }),
    )
    .await
    .assert_status(StatusCode::CREATED);

    let resp = app
        .post(
            &format!("/api/events/{event_id}/attendance"),
            &json!({
                "user_id": app.user_id,
                "date": "2024-09-09",
                "status": "present",
            }),
        )
        .await
        .assert_status(StatusCode::NOT_FOUND);
    assert!(
        resp.body["error"]
            .as_str()
            .is_some_and(|error| error.contains("no live occurrence"))
    );

    let listed = app
        .get(&format!("/api/events/{event_id}/attendance"))
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(listed.body["meta"]["total"], 0);
}

#[test_log::test(tokio::test)]
async fn logged_then_deleted_attendance_is_gone() {
    let app = TestApp::new(CHICAGO).await;
    let event_id = app.create_mon_wed_event(app.class_id).await;

    let logged = app
        .post(
            &format!("/api/events/{event_id}/attendance"),
            &json!({
                "user_id": app.user_id,
                "date": "2024-09-11",
                "check_in_at": "10:05",
                "check_out_at": "10:50",
                "note": "left early",
            }),
        )
        .await
        .assert_status(StatusCode::CREATED);
    assert_eq!(logged.body["record"]["minutes_attended"], 45);
    assert_eq!(logged.body["record"]["scheduled_minutes"], 60);

    let listed = app
        .get(&format!("/api/events/{event_id}/attendance?date=2024-09-11"))
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(listed.body["meta"]["total"], 1);
    assert_eq!(listed.body["items"][0]["name_last"], "Quinn");

    app.delete(&format!(
        "/api/events/{event_id}/attendance/{}?date=2024-09-11",
        app.user_id
    ))
    .await
    .assert_status(StatusCode::NO_CONTENT);

    let listed = app
        .get(&format!("/api/events/{event_id}/attendance?date=2024-09-11"))
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(listed.body["meta"]["total"], 0);
    assert!(listed.body["items"].as_array().is_some_and(Vec::is_empty));
}

#[test_log::test(tokio::test)]
async fn instances_carry_their_attendance_newest_first() {
    let app = TestApp::new(CHICAGO).await;
    let event_id = app.create_mon_wed_event(app.class_id).await;

    for date in ["2024-09-02", "2024-09-04"] {
        app.post(
            &format!("/api/events/{event_id}/attendance"),
            &json!({ "user_id": app.user_id, "date": date, "status": "present" }),
        )
        .await
        .assert_status(StatusCode::CREATED);
    }

    let page = app
        .get(&format!(
            "/api/events/{event_id}/instances?year=2024&month=9&per_page=3"
        ))
        .await
        .assert_status(StatusCode::OK)
        .body;
    assert_eq!(page["meta"]["total"], 9);
    assert_eq!(page["meta"]["last_page"], 3);
    assert_eq!(page["items"][0]["date"], "2024-09-30");

    let last = app
        .get(&format!(
            "/api/events/{event_id}/instances?year=2024&month=9&per_page=3&page=3"
        ))
        .await
        .assert_status(StatusCode::OK)
        .body;
    assert_eq!(last["items"][2]["date"], "2024-09-02");
    assert_eq!(last["items"][2]["attendance"][0]["status"], "present");
    assert_eq!(last["items"][2]["class_time"], "10:00-11:00");
}

#[test_log::test(tokio::test)]
async fn attendance_rate_counts_present_and_partial() {
    let app = TestApp::new(CHICAGO).await;
    let event_id = app.create_mon_wed_event(app.class_id).await;
    let second = app.add_user("Blair", "Rowe").await;
    let third = app.add_user("Casey", "Stone").await;
    app.enroll(app.class_id, second).await;
    app.enroll(app.class_id, third).await;

    for (user_id, status) in [
        (app.user_id, "present"),
        (second, "partial"),
        (third, "absent_unexcused"),
    ] {
        app.post(
            &format!("/api/events/{event_id}/attendance"),
            &json!({ "user_id": user_id, "date": "2024-09-16", "status": status }),
        )
        .await
        .assert_status(StatusCode::CREATED);
    }

    let rate = app
        .get(&format!(
            "/api/events/{event_id}/attendance/rate?date=2024-09-16"
        ))
        .await
        .assert_status(StatusCode::OK)
        .body;
    assert_eq!(rate["enrolled"], 3);
    assert_eq!(rate["attended"], 2);
    let percent = rate["attendance_rate"].as_f64().expect("rate");
    assert!((percent - 66.666).abs() < 0.01);
}

#[test_log::test(tokio::test)]
async fn unenrolled_user_cannot_be_logged() {
    let app = TestApp::new(CHICAGO).await;
    let event_id = app.create_mon_wed_event(app.class_id).await;
    let outsider = app.add_user("Drew", "Vance").await;

    app.post(
        &format!("/api/events/{event_id}/attendance"),
        &json!({ "user_id": outsider, "date": "2024-09-02", "status": "present" }),
    )
    .await
    .assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn text_rule_is_accepted_on_creation() {
    let app = TestApp::new(CHICAGO).await;
    let event_id = app
        .create_event(
            app.class_id,
            &json!({
                "rrule": "DTSTART;TZID=Local:20240902T100000\nRRULE:FREQ=WEEKLY;INTERVAL=1;BYDAY=MO,WE;COUNT=4",
                "room": "A1",
                "duration_minutes": 45,
            }),
        )
        .await;

    let dates = app.september_dates(event_id).await;
    assert_eq!(
        dates,
        ["2024-09-02", "2024-09-04", "2024-09-09", "2024-09-11"]
    );
}
