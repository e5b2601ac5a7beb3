mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn ungated_update_applies_immediately() {
    let app = TestApp::spawn().await;
    let customer = app.seed_customer("flow.one@example.com").await;
    let order = app.seed_order(customer.id, "Pending").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/statusUpdates",
            Some(json!({
                "order_id": order.id,
                "stakeholder_type": "customer",
                "stakeholder_id": customer.id,
                "new_status": "Processing"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["requires_approval"], false);
    assert_eq!(body["data"]["approval_status"], "Pending");

    let (_, body) = app
        .request("GET", &format!("/api/v1/orders/{}", order.id), None)
        .await;
    assert_eq!(body["data"]["status"], "Processing");
}

#[tokio::test]
async fn gated_update_waits_for_an_approval_decision() {
    let app = TestApp::spawn().await;
    let customer = app.seed_customer("flow.two@example.com").await;
    let order = app.seed_order(customer.id, "Pending").await;
    let admin_id = app.default_admin_id().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/statusUpdates",
            Some(json!({
                "order_id": order.id,
                "stakeholder_type": "customer",
                "stakeholder_id": customer.id,
                "new_status": "Shipped",
                "requires_approval": true
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let update_id = body["data"]["id"].as_i64().unwrap();

    // Target untouched until an admin decides.
    let (_, body) = app
        .request("GET", &format!("/api/v1/orders/{}", order.id), None)
        .await;
    assert_eq!(body["data"]["status"], "Pending");

    let (_, body) = app
        .request("GET", "/api/v1/statusUpdates/pending-approvals", None)
        .await;
    let pending: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert!(pending.contains(&update_id));

    let (status, body) = app
        .request(
            "PATCH",
            &format!("/api/v1/statusUpdates/{}/approve", update_id),
            Some(json!({"is_approved": true, "admin_id": admin_id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["approval_status"], "Approved");
    assert_eq!(body["data"]["approved_by"].as_i64(), Some(admin_id));
    assert!(body["data"]["approved_at"].is_string());

    let (_, body) = app
        .request("GET", &format!("/api/v1/orders/{}", order.id), None)
        .await;
    assert_eq!(body["data"]["status"], "Shipped");

    let (_, body) = app
        .request("GET", "/api/v1/statusUpdates/pending-approvals", None)
        .await;
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|u| u["id"].as_i64() != Some(update_id)));

    // A second decision on the same update is rejected.
    let (status, body) = app
        .request(
            "PATCH",
            &format!("/api/v1/statusUpdates/{}/approve", update_id),
            Some(json!({"is_approved": false, "admin_id": admin_id})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "This status update has already been processed"
    );
}

#[tokio::test]
async fn rejection_leaves_the_target_untouched() {
    let app = TestApp::spawn().await;
    let customer = app.seed_customer("flow.three@example.com").await;
    let order = app.seed_order(customer.id, "Pending").await;
    let admin_id = app.default_admin_id().await;

    let (_, body) = app
        .request(
            "POST",
            "/api/v1/statusUpdates",
            Some(json!({
                "order_id": order.id,
                "stakeholder_type": "customer",
                "stakeholder_id": customer.id,
                "new_status": "Delivered",
                "requires_approval": true
            })),
        )
        .await;
    let update_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .request(
            "PATCH",
            &format!("/api/v1/statusUpdates/{}/approve", update_id),
            Some(json!({"is_approved": false, "admin_id": admin_id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["approval_status"], "Rejected");

    let (_, body) = app
        .request("GET", &format!("/api/v1/orders/{}", order.id), None)
        .await;
    assert_eq!(body["data"]["status"], "Pending");
}

#[tokio::test]
async fn deciding_an_ungated_update_is_rejected() {
    let app = TestApp::spawn().await;
    let customer = app.seed_customer("flow.four@example.com").await;
    let order = app.seed_order(customer.id, "Pending").await;
    let admin_id = app.default_admin_id().await;

    let (_, body) = app
        .request(
            "POST",
            "/api/v1/statusUpdates",
            Some(json!({
                "order_id": order.id,
                "stakeholder_type": "customer",
                "stakeholder_id": customer.id,
                "new_status": "Processing"
            })),
        )
        .await;
    let update_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .request(
            "PATCH",
            &format!("/api/v1/statusUpdates/{}/approve", update_id),
            Some(json!({"is_approved": true, "admin_id": admin_id})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "This status update does not require approval"
    );
}

#[tokio::test]
async fn mandatory_fields_and_stakeholders_are_validated() {
    let app = TestApp::spawn().await;
    let customer = app.seed_customer("flow.five@example.com").await;
    let order = app.seed_order(customer.id, "Pending").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/statusUpdates",
            Some(json!({
                "order_id": order.id,
                "stakeholder_type": "customer",
                "stakeholder_id": customer.id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "stakeholder_type, stakeholder_id, and new_status are required"
    );

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/statusUpdates",
            Some(json!({
                "order_id": order.id,
                "stakeholder_type": "robot",
                "stakeholder_id": customer.id,
                "new_status": "Processing"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid stakeholder_type. Must be one of: customer, supplier, driver, admin"
    );

    // Well-formed but pointing at a customer that does not exist.
    let (status, _) = app
        .request(
            "POST",
            "/api/v1/statusUpdates",
            Some(json!({
                "order_id": order.id,
                "stakeholder_type": "customer",
                "stakeholder_id": 4242,
                "new_status": "Processing"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            "PATCH",
            "/api/v1/statusUpdates/1/approve",
            Some(json!({"admin_id": 1})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "is_approved must be a boolean value");
}

#[tokio::test]
async fn cancellation_request_is_gated_and_applies_on_approval() {
    let app = TestApp::spawn().await;
    let customer = app.seed_customer("flow.six@example.com").await;
    let order = app.seed_order(customer.id, "Processing").await;
    let admin_id = app.default_admin_id().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/statusUpdates/cancel",
            Some(json!({
                "order_id": order.id,
                "customer_id": customer.id,
                "cancellation_reason": "Changed my mind"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Cancellation request submitted successfully");
    let data = &body["data"];
    assert_eq!(data["new_status"], "Cancellation Requested");
    assert_eq!(data["previous_status"], "Processing");
    assert_eq!(data["is_cancellation_request"], true);
    assert_eq!(data["requires_approval"], true);
    assert_eq!(data["cancellation_reason"], "Changed my mind");
    assert_eq!(data["update_reason"], "Customer requested cancellation");
    let update_id = data["id"].as_i64().unwrap();

    // Order untouched until approved.
    let (_, body) = app
        .request("GET", &format!("/api/v1/orders/{}", order.id), None)
        .await;
    assert_eq!(body["data"]["status"], "Processing");

    let (status, _) = app
        .request(
            "PATCH",
            &format!("/api/v1/statusUpdates/{}/approve", update_id),
            Some(json!({"is_approved": true, "admin_id": admin_id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .request("GET", &format!("/api/v1/orders/{}", order.id), None)
        .await;
    assert_eq!(body["data"]["status"], "Cancellation Requested");
}

#[tokio::test]
async fn cancellation_requires_a_target_and_a_reason() {
    let app = TestApp::spawn().await;
    let customer = app.seed_customer("flow.seven@example.com").await;
    let order = app.seed_order(customer.id, "Pending").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/statusUpdates/cancel",
            Some(json!({"order_id": order.id, "customer_id": customer.id})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "customer_id and cancellation_reason are required"
    );

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/statusUpdates/cancel",
            Some(json!({
                "customer_id": customer.id,
                "cancellation_reason": "No target named"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "A cancellation request must name an order_id or a shipment_id"
    );

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/statusUpdates/cancel",
            Some(json!({
                "order_id": 9999,
                "customer_id": customer.id,
                "cancellation_reason": "Dangling order"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn updates_are_listed_per_target() {
    let app = TestApp::spawn().await;
    let customer = app.seed_customer("flow.eight@example.com").await;
    let order = app.seed_order(customer.id, "Pending").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shipments",
            Some(json!({"order_id": order.id})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let shipment_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/statusUpdates",
            Some(json!({
                "order_id": order.id,
                "stakeholder_type": "customer",
                "stakeholder_id": customer.id,
                "new_status": "Processing"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/statusUpdates",
            Some(json!({
                "shipment_id": shipment_id,
                "stakeholder_type": "customer",
                "stakeholder_id": customer.id,
                "new_status": "In Transit"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = app
        .request(
            "GET",
            &format!("/api/v1/statusUpdates/order/{}", order.id),
            None,
        )
        .await;
    let for_order = body["data"].as_array().unwrap();
    assert_eq!(for_order.len(), 1);
    assert_eq!(for_order[0]["new_status"], "Processing");

    let (_, body) = app
        .request(
            "GET",
            &format!("/api/v1/statusUpdates/shipment/{}", shipment_id),
            None,
        )
        .await;
    let for_shipment = body["data"].as_array().unwrap();
    assert_eq!(for_shipment.len(), 1);
    assert_eq!(for_shipment[0]["new_status"], "In Transit");

    let (_, body) = app
        .request("GET", &format!("/api/v1/shipments/{}", shipment_id), None)
        .await;
    assert_eq!(body["data"]["status"], "In Transit");

    let (_, body) = app.request("GET", "/api/v1/statusUpdates", None).await;
    assert_eq!(body["data"]["total"], 2);
}
