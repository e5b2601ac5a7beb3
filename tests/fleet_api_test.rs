mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn fleet_crud_round_trip() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/fleets",
            Some(json!({
                "vehicle_number": "VH-100",
                "vehicle_type": "Box Truck",
                "capacity": 2500
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["vehicle_number"], "VH-100");
    assert_eq!(body["data"]["status"], "Available");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .request("GET", &format!("/api/v1/fleets/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["capacity"], 2500);

    let (status, body) = app
        .request(
            "PATCH",
            &format!("/api/v1/fleets/{}", id),
            Some(json!({"status": "maintenance", "capacity": 3000})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Maintenance");
    assert_eq!(body["data"]["capacity"], 3000);

    let (status, body) = app
        .request("GET", "/api/v1/fleets?status=maintenance", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"].as_i64(), Some(id));

    let (status, _) = app
        .request("DELETE", &format!("/api/v1/fleets/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .request("GET", &format!("/api/v1/fleets/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn unknown_vehicle_status_is_rejected() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/fleets",
            Some(json!({
                "vehicle_number": "VH-200",
                "vehicle_type": "Van",
                "capacity": 800,
                "status": "parked"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid vehicle status 'parked'. Must be one of: Available, In Use, Maintenance, Out of Service"
    );
}

#[tokio::test]
async fn capacity_must_be_positive() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/fleets",
            Some(json!({
                "vehicle_number": "VH-300",
                "vehicle_type": "Van",
                "capacity": 0
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn listing_clamps_page_size() {
    let app = TestApp::spawn().await;

    for i in 0..3 {
        let (status, _) = app
            .request(
                "POST",
                "/api/v1/fleets",
                Some(json!({
                    "vehicle_number": format!("VH-{}", 400 + i),
                    "vehicle_type": "Van",
                    "capacity": 500
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .request("GET", "/api/v1/fleets?page=1&limit=2", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["total_pages"], 2);

    let (status, body) = app
        .request("GET", "/api/v1/fleets?page=2&limit=2", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
}
