mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;
use logistics_api::entities::vehicle::VehicleStatus;

#[tokio::test]
async fn auto_assignment_picks_the_largest_available_vehicle() {
    let app = TestApp::spawn().await;

    app.seed_vehicle("VH-1", 1000, VehicleStatus::Available).await;
    let big = app.seed_vehicle("VH-2", 5000, VehicleStatus::Available).await;
    // Larger capacity but not Available, so never a candidate.
    app.seed_vehicle("VH-3", 9000, VehicleStatus::InUse).await;
    let driver = app.seed_driver("Dana", None).await;
    let customer = app.seed_customer("dana.customer@example.com").await;
    let order = app.seed_order(customer.id, "Pending").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shipments/auto-assign",
            Some(json!({"order_id": order.id})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["message"],
        "Shipment created with automatic vehicle assignment"
    );

    let data = &body["data"];
    assert_eq!(data["assigned_vehicle"]["id"].as_i64(), Some(big.id));
    assert_eq!(data["assigned_vehicle"]["status"], "In Use");
    assert_eq!(data["assigned_driver"]["id"].as_i64(), Some(driver.id));
    assert_eq!(
        data["assigned_driver"]["assigned_vehicle_id"].as_i64(),
        Some(big.id)
    );
    assert_eq!(data["shipment"]["order_id"].as_i64(), Some(order.id));
    assert_eq!(data["shipment"]["vehicle_id"].as_i64(), Some(big.id));
    assert_eq!(data["shipment"]["driver_id"].as_i64(), Some(driver.id));
    assert_eq!(data["shipment"]["status"], "Pending");
    assert!(data["shipment"]["tracking_number"]
        .as_str()
        .unwrap()
        .starts_with("TRK-"));
}

#[tokio::test]
async fn auto_assignment_prefers_drivers_bound_to_the_selected_vehicle_or_unassigned() {
    let app = TestApp::spawn().await;

    let busy = app.seed_vehicle("VH-10", 9000, VehicleStatus::InUse).await;
    let available = app
        .seed_vehicle("VH-11", 4000, VehicleStatus::Available)
        .await;
    // Bound to a vehicle outside the available set, so ineligible.
    app.seed_driver("Alex", Some(busy.id)).await;
    let bound = app.seed_driver("Blake", Some(available.id)).await;
    let customer = app.seed_customer("blake.customer@example.com").await;
    let order = app.seed_order(customer.id, "Pending").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shipments/auto-assign",
            Some(json!({"order_id": order.id})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["data"]["assigned_driver"]["id"].as_i64(),
        Some(bound.id)
    );
}

#[tokio::test]
async fn auto_assignment_without_any_eligible_driver_still_creates_the_shipment() {
    let app = TestApp::spawn().await;

    let busy = app.seed_vehicle("VH-20", 9000, VehicleStatus::InUse).await;
    app.seed_vehicle("VH-21", 4000, VehicleStatus::Available).await;
    app.seed_driver("Casey", Some(busy.id)).await;
    let customer = app.seed_customer("casey.customer@example.com").await;
    let order = app.seed_order(customer.id, "Pending").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shipments/auto-assign",
            Some(json!({"order_id": order.id})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["assigned_driver"].is_null());
    assert!(body["data"]["shipment"]["driver_id"].is_null());
}

#[tokio::test]
async fn auto_assignment_for_missing_order_is_404() {
    let app = TestApp::spawn().await;
    app.seed_vehicle("VH-30", 4000, VehicleStatus::Available).await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shipments/auto-assign",
            Some(json!({"order_id": 9999})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn auto_assignment_with_no_available_vehicles_is_400_and_writes_nothing() {
    let app = TestApp::spawn().await;

    app.seed_vehicle("VH-40", 4000, VehicleStatus::Maintenance).await;
    let customer = app.seed_customer("no.fleet@example.com").await;
    let order = app.seed_order(customer.id, "Pending").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shipments/auto-assign",
            Some(json!({"order_id": order.id})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No available vehicles found");

    let (status, body) = app.request("GET", "/api/v1/shipments", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn deleting_a_shipment_releases_the_vehicle_and_driver() {
    let app = TestApp::spawn().await;

    let vehicle = app
        .seed_vehicle("VH-50", 4000, VehicleStatus::Available)
        .await;
    let driver = app.seed_driver("Drew", None).await;
    let customer = app.seed_customer("drew.customer@example.com").await;
    let order = app.seed_order(customer.id, "Pending").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shipments/auto-assign",
            Some(json!({"order_id": order.id})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let shipment_id = body["data"]["shipment"]["id"].as_i64().unwrap();

    let (status, _) = app
        .request("DELETE", &format!("/api/v1/shipments/{}", shipment_id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app
        .request("GET", &format!("/api/v1/fleets/{}", vehicle.id), None)
        .await;
    assert_eq!(body["data"]["status"], "Available");

    let (_, body) = app
        .request("GET", &format!("/api/v1/drivers/{}", driver.id), None)
        .await;
    assert!(body["data"]["assigned_vehicle_id"].is_null());

    let (status, _) = app
        .request("GET", &format!("/api/v1/shipments/{}", shipment_id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn available_listings_reflect_fleet_state() {
    let app = TestApp::spawn().await;

    app.seed_vehicle("VH-60", 1000, VehicleStatus::Available).await;
    app.seed_vehicle("VH-61", 7000, VehicleStatus::Available).await;
    app.seed_vehicle("VH-62", 9000, VehicleStatus::OutOfService).await;
    app.seed_driver("Zoe", None).await;
    app.seed_driver("Ari", None).await;

    let (status, body) = app
        .request("GET", "/api/v1/shipments/available-vehicles", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let vehicles = body["data"].as_array().unwrap();
    assert_eq!(vehicles.len(), 2);
    // Largest capacity first.
    assert_eq!(vehicles[0]["vehicle_number"], "VH-61");
    assert_eq!(vehicles[1]["vehicle_number"], "VH-60");

    let (status, body) = app
        .request("GET", "/api/v1/shipments/available-drivers", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let drivers = body["data"].as_array().unwrap();
    assert_eq!(drivers.len(), 2);
    // Name order.
    assert_eq!(drivers[0]["name"], "Ari");
    assert_eq!(drivers[1]["name"], "Zoe");
}

#[tokio::test]
async fn duplicate_tracking_numbers_fail_the_second_write() {
    let app = TestApp::spawn().await;
    let customer = app.seed_customer("collision@example.com").await;
    let order = app.seed_order(customer.id, "Pending").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shipments",
            Some(json!({"order_id": order.id, "tracking_number": "TRK-1234-5"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let first_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shipments",
            Some(json!({"order_id": order.id, "tracking_number": "TRK-1234-5"})),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
    assert_eq!(body["message"], "An internal error occurred");

    // The first row is untouched and remains the only one.
    let (status, body) = app.request("GET", "/api/v1/shipments", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"].as_i64(), Some(first_id));
    assert_eq!(body["data"]["items"][0]["tracking_number"], "TRK-1234-5");
}

#[tokio::test]
async fn deleting_a_vehicleless_shipment_leaves_the_fleet_alone() {
    let app = TestApp::spawn().await;

    let bystander = app.seed_vehicle("VH-70", 4000, VehicleStatus::InUse).await;
    let customer = app.seed_customer("vehicleless@example.com").await;
    let order = app.seed_order(customer.id, "Pending").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shipments",
            Some(json!({"order_id": order.id})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["vehicle_id"].is_null());
    let shipment_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = app
        .request("DELETE", &format!("/api/v1/shipments/{}", shipment_id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app
        .request("GET", &format!("/api/v1/fleets/{}", bystander.id), None)
        .await;
    assert_eq!(body["data"]["status"], "In Use");
}

#[tokio::test]
async fn manual_shipment_rejects_dangling_references() {
    let app = TestApp::spawn().await;
    let customer = app.seed_customer("manual@example.com").await;
    let order = app.seed_order(customer.id, "Pending").await;

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/shipments",
            Some(json!({"order_id": order.id, "vehicle_id": 555})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shipments",
            Some(json!({"order_id": order.id, "tracking_number": "TRK-EXPLICIT-1"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["tracking_number"], "TRK-EXPLICIT-1");
    assert_eq!(body["data"]["status"], "Pending");
}
