use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::coordination::domain::{Priority, RequestStatus};
use crate::coordination::repository::DirectoryStore;
use crate::coordination::{coordination_router, CoordinationService};

fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn submit_route_reports_assigned_priority() {
    let store = Arc::new(MemoryStore::default());
    let response = router_with(store.clone())
        .oneshot(json_request(
            "POST",
            "/api/emergency-requests",
            json!({
                "requester_name": "Asha",
                "description": "Urgent: gas leak in the building",
                "latitude": "28.61",
                "longitude": 77.2,
            }),
            None,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["priority_assigned"], "high");
    assert_eq!(body["message"], "Emergency request submitted successfully");
    assert_eq!(body["data"]["latitude"], 28.61);
    assert_eq!(body["data"]["status"], "open");
}

#[tokio::test]
async fn submit_route_rejects_missing_description() {
    let response = router_with(Arc::new(MemoryStore::default()))
        .oneshot(json_request(
            "POST",
            "/api/emergency-requests",
            json!({ "requester_name": "Asha" }),
            None,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Requester name and description are required");
}

#[tokio::test]
async fn submit_route_rejects_unknown_priority() {
    let response = router_with(Arc::new(MemoryStore::default()))
        .oneshot(json_request(
            "POST",
            "/api/emergency-requests",
            json!({
                "requester_name": "Asha",
                "description": "Need water",
                "priority": "extreme",
            }),
            None,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(
        body["error"],
        "Invalid priority. Must be one of: low, medium, high"
    );
}

#[tokio::test]
async fn match_route_echoes_request_info() {
    let store = Arc::new(MemoryStore::default());
    let transport = store.with_category("Transportation");
    store.with_volunteer(volunteer("Ravi", "Driving, Transportation", "flexible"));
    let mut request = emergency("Ride to dialysis", Some(transport.id));
    request.priority = Priority::Medium;
    let request = store.with_request(request);

    let response = router_with(store)
        .oneshot(get(&format!("/api/volunteers/match/{}", request.id)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Ravi");
    assert_eq!(body["data"][0]["match_score"], 25);
    assert_eq!(body["data"][0]["matching_skills"], "Transportation, Driving");
    assert_eq!(body["request_info"]["id"], request.id.as_str());
    assert_eq!(body["request_info"]["priority"], "medium");
    assert_eq!(
        body["request_info"]["required_skills"],
        "Transportation, Driving"
    );
}

#[tokio::test]
async fn match_route_returns_not_found_for_unknown_request() {
    let response = router_with(Arc::new(MemoryStore::default()))
        .oneshot(get("/api/volunteers/match/unknown"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "Emergency request not found");
}

#[tokio::test]
async fn operator_routes_require_bearer_token() {
    let store = Arc::new(MemoryStore::default());
    let request = store.with_request(emergency("Roof leak", None));
    let uri = format!("/api/emergency-requests/{}/status", request.id);

    let response = router_with(store.clone())
        .oneshot(json_request("PUT", &uri, json!({ "status": "resolved" }), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router_with(store.clone())
        .oneshot(json_request(
            "PUT",
            &uri,
            json!({ "status": "resolved" }),
            Some("forged"),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router_with(store.clone())
        .oneshot(json_request(
            "PUT",
            &uri,
            json!({ "status": "resolved", "notes": "Patched" }),
            Some(OPERATOR_TOKEN),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let stored = store.request(&request.id).expect("fetch").expect("present");
    assert_eq!(stored.status, RequestStatus::Resolved);
    assert_eq!(stored.notes.as_deref(), Some("Patched"));
}

#[tokio::test]
async fn assign_route_rejects_inactive_volunteer() {
    let store = Arc::new(MemoryStore::default());
    let mut off_duty = volunteer("Off Duty", "", "");
    off_duty.status = crate::coordination::domain::VolunteerStatus::Inactive;
    let off_duty = store.with_volunteer(off_duty);
    let request = store.with_request(emergency("Needs insulin", None));

    let response = router_with(store)
        .oneshot(json_request(
            "PUT",
            &format!("/api/emergency-requests/{}/assign", request.id),
            json!({ "volunteer_id": off_duty.id }),
            Some(OPERATOR_TOKEN),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "Volunteer not found or inactive");
}

#[tokio::test]
async fn resource_search_applies_filters() {
    let store = Arc::new(MemoryStore::default());
    let health = store.with_category("Healthcare");
    let mut clinic = resource("Sunrise Clinic", Some(health.id.clone()));
    clinic.latitude = Some(28.6315);
    clinic.longitude = Some(77.2167);
    store.with_resource(clinic);
    let mut kitchen = resource("Community Kitchen", None);
    kitchen.latitude = Some(28.7);
    kitchen.longitude = Some(77.3);
    store.with_resource(kitchen);

    let response = router_with(store.clone())
        .oneshot(get("/api/resources?search=clinic"))
        .await
        .expect("response");
    let body = read_json_body(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["category_name"], "Healthcare");
    assert_eq!(body["filters"]["search"], "clinic");

    let response = router_with(store)
        .oneshot(get("/api/resources?lat=28.63&lng=77.21&radius=2"))
        .await
        .expect("response");
    let body = read_json_body(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Sunrise Clinic");
}

#[tokio::test]
async fn volunteer_listing_validates_status() {
    let store = Arc::new(MemoryStore::default());
    store.with_volunteer(volunteer("Meera", "First Aid", "Weekends"));
    let mut busy = volunteer("Ravi", "Driving", "Weekends");
    busy.status = crate::coordination::domain::VolunteerStatus::Busy;
    store.with_volunteer(busy);

    let response = router_with(store.clone())
        .oneshot(get("/api/volunteers"))
        .await
        .expect("response");
    let body = read_json_body(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Meera");

    let response = router_with(store.clone())
        .oneshot(get("/api/volunteers?status=busy"))
        .await
        .expect("response");
    let body = read_json_body(response).await;
    assert_eq!(body["data"][0]["name"], "Ravi");

    let response = router_with(store)
        .oneshot(get("/api/volunteers?status=sleeping"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn store_failures_hide_internal_details() {
    let service = Arc::new(CoordinationService::new(
        Arc::new(UnavailableStore),
        Arc::new(OfflineEvents),
    ));
    let response = coordination_router(service, operator_gate())
        .oneshot(get("/api/emergency-requests/stats"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "Failed to fetch statistics");
}

#[tokio::test]
async fn duplicate_registration_is_a_bad_request() {
    let store = Arc::new(MemoryStore::default());
    let payload = json!({ "name": "Meera", "email": "meera@relief.test", "skills": "First Aid" });

    let response = router_with(store.clone())
        .oneshot(json_request("POST", "/api/volunteers/register", payload.clone(), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router_with(store)
        .oneshot(json_request("POST", "/api/volunteers/register", payload, None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "Email already registered");
}
