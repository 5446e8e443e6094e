//! Wall-clock stability across daylight-saving transitions.

use cadence_test::component::config::Settings;
use cadence_test::component::db::CalendarScope;
use cadence_test::component::recur::DateWindow;
use cadence_test::component::schedule::calendar::{ViewOptions, build_calendar};
use chrono::Timelike;
use salvo::http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, calendar_occurrences, ymd};

#[test_log::test(tokio::test)]
async fn weekly_class_keeps_local_time_through_fall_back() {
    let app = TestApp::new("America/Chicago").await;
    app.create_event(
        app.class_id,
        &json!({
            "rule": {
                "frequency": "weekly",
                "by_weekday": ["Mon"],
                "start": "2024-10-21T10:00:00",
            },
            "room": "Gym",
            "duration_minutes": 90,
        }),
    )
    .await;

    let calendar = app
        .get(&format!(
            "/api/facilities/{}/calendar?start=2024-10-28&end=2024-11-05",
            app.facility_id
        ))
        .await
        .assert_status(StatusCode::OK)
        .body;
    let occurrences = calendar_occurrences(&calendar);
    assert_eq!(occurrences.len(), 2);
    for occurrence in occurrences {
        assert_eq!(occurrence["start_time"], "10:00:00");
    }

    let window = DateWindow::new(ymd(2024, 10, 28), ymd(2024, 11, 5)).expect("window");
    let built = build_calendar(
        &app.gateway,
        CalendarScope::Facility(app.facility_id),
        window,
        ViewOptions::default(),
        &Settings::default().schedule,
    )
    .await
    .expect("calendar");
    let tz = chrono_tz::America::Chicago;
    let utc_hours: Vec<u32> = built
        .occurrences()
        .map(|occurrence| occurrence.start_instant(tz).expect("instant").hour())
        .collect();
    assert_eq!(utc_hours, [15, 16]);
}

#[test_log::test(tokio::test)]
async fn occurrence_inside_spring_gap_moves_forward() {
    let app = TestApp::new("America/Chicago").await;
    app.create_event(
        app.class_id,
        &json!({
            "rule": { "frequency": "daily", "start": "2024-03-09T02:30:00" },
            "room": "Chapel",
            "duration_minutes": 30,
        }),
    )
    .await;

    let window = DateWindow::new(ymd(2024, 3, 9), ymd(2024, 3, 12)).expect("window");
    let built = build_calendar(
        &app.gateway,
        CalendarScope::Facility(app.facility_id),
        window,
        ViewOptions::default(),
        &Settings::default().schedule,
    )
    .await
    .expect("calendar");
    let tz = chrono_tz::America::Chicago;

    let dates: Vec<_> = built.occurrences().map(|occurrence| occurrence.date).collect();
    assert_eq!(dates, [ymd(2024, 3, 9), ymd(2024, 3, 10), ymd(2024, 3, 11)]);

    let instants: Vec<String> = built
        .occurrences()
        .map(|occurrence| {
            occurrence
                .start_instant(tz)
                .expect("instant")
                .format("%H:%M")
                .to_string()
        })
        .collect();
    assert_eq!(instants, ["08:30", "08:30", "07:30"]);
}
