use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    deserialize_optional_id, deserialize_optional_number, AssignmentRequest, AvailabilityUpdate,
    CapacityUpdate, CategoryId, EmergencyRequestSubmission, RequestId, ResourceId,
    ResourceSubmission, ResourceUpdate, StatusChange, VolunteerId, VolunteerRegistration,
    VolunteerStatus, VolunteerUpdate,
};
use super::intake::{parse_volunteer_status, IntakeViolation};
use super::repository::{DirectoryStore, EventPublisher, ResourceFilter, VolunteerFilter};
use super::service::{CoordinationError, CoordinationService};
use crate::auth::{AuthGate, CurrentUser};
use crate::envelope::{self, failure, success};

/// Router state: the coordination service plus the gate guarding write routes.
pub struct DirectoryState<S, P> {
    pub service: Arc<CoordinationService<S, P>>,
    pub gate: AuthGate,
}

impl<S, P> Clone for DirectoryState<S, P> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            gate: self.gate.clone(),
        }
    }
}

impl<S, P> FromRef<DirectoryState<S, P>> for AuthGate {
    fn from_ref(state: &DirectoryState<S, P>) -> Self {
        state.gate.clone()
    }
}

/// Router builder exposing the directory, request queue and volunteer endpoints.
pub fn coordination_router<S, P>(service: Arc<CoordinationService<S, P>>, gate: AuthGate) -> Router
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    Router::new()
        .route("/api/categories", get(list_categories::<S, P>))
        .route("/api/categories/:id", get(category_details::<S, P>))
        .route(
            "/api/categories/:id/resources",
            get(category_resources::<S, P>),
        )
        .route("/api/categories/:id/requests", get(category_requests::<S, P>))
        .route(
            "/api/resources",
            get(search_resources::<S, P>).post(create_resource::<S, P>),
        )
        .route(
            "/api/resources/:id",
            get(resource_details::<S, P>)
                .put(update_resource::<S, P>)
                .delete(retire_resource::<S, P>),
        )
        .route(
            "/api/resources/:id/update-availability",
            post(update_resource_capacity::<S, P>),
        )
        .route(
            "/api/emergency-requests",
            get(request_queue::<S, P>).post(submit_request::<S, P>),
        )
        .route("/api/emergency-requests/stats", get(statistics::<S, P>))
        .route(
            "/api/emergency-requests/:id",
            get(request_details::<S, P>).delete(delete_request::<S, P>),
        )
        .route(
            "/api/emergency-requests/:id/status",
            put(update_request_status::<S, P>),
        )
        .route(
            "/api/emergency-requests/:id/assign",
            put(assign_volunteer::<S, P>),
        )
        .route("/api/volunteers", get(list_volunteers::<S, P>))
        .route(
            "/api/volunteers/register",
            post(register_volunteer::<S, P>),
        )
        .route(
            "/api/volunteers/match/:request_id",
            get(match_volunteers::<S, P>),
        )
        .route(
            "/api/volunteers/:id",
            get(volunteer_details::<S, P>)
                .put(update_volunteer::<S, P>)
                .delete(retire_volunteer::<S, P>),
        )
        .route(
            "/api/volunteers/:id/status",
            put(set_volunteer_status::<S, P>),
        )
        .route(
            "/api/volunteers/:id/assignments",
            get(volunteer_assignments::<S, P>),
        )
        .route(
            "/api/volunteers/:id/availability",
            post(update_volunteer_availability::<S, P>),
        )
        .with_state(DirectoryState { service, gate })
}

type Directory<S, P> = State<DirectoryState<S, P>>;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResourceQuery {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    category: Option<CategoryId>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    lng: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    radius: Option<f64>,
}

impl From<ResourceQuery> for ResourceFilter {
    fn from(query: ResourceQuery) -> Self {
        ResourceFilter {
            category_id: query.category,
            search: query.search.filter(|text| !text.trim().is_empty()),
            latitude: query.lat,
            longitude: query.lng,
            radius: query.radius,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VolunteerQuery {
    #[serde(default)]
    skills: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl VolunteerQuery {
    /// Status defaults to `active` when omitted or blank.
    fn into_filter(self) -> Result<VolunteerFilter, IntakeViolation> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => VolunteerStatus::Active,
            Some(raw) => parse_volunteer_status(raw)?,
        };
        Ok(VolunteerFilter {
            skills: self.skills.filter(|text| !text.trim().is_empty()),
            location: self.location.filter(|text| !text.trim().is_empty()),
            status: Some(status),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VolunteerStatusChange {
    #[serde(default)]
    status: Option<String>,
}

/// Map service failures to envelopes; store failures report `context` instead of internals.
fn rejection(error: CoordinationError, context: &'static str) -> Response {
    match error {
        CoordinationError::Intake(violation) => {
            failure(StatusCode::BAD_REQUEST, violation.to_string())
        }
        CoordinationError::VolunteerUnavailable => {
            failure(StatusCode::BAD_REQUEST, error.to_string())
        }
        CoordinationError::NotFound(_) => failure(StatusCode::NOT_FOUND, error.to_string()),
        CoordinationError::Store(store) => {
            tracing::error!(error = %store, context, "directory store failure");
            failure(StatusCode::INTERNAL_SERVER_ERROR, context)
        }
    }
}

macro_rules! respond {
    ($result:expr, $context:literal, |$value:ident| $body:expr) => {
        match $result {
            Ok($value) => $body,
            Err(error) => rejection(error, $context),
        }
    };
}

fn data_payload<T: serde::Serialize>(status: StatusCode, data: &T, extra: serde_json::Value) -> Response {
    let data = match envelope::to_value(data) {
        Ok(data) => data,
        Err(response) => return response,
    };
    let mut fields = json!({ "data": data });
    if let (Some(target), serde_json::Value::Object(extra)) = (fields.as_object_mut(), extra) {
        target.extend(extra);
    }
    success(status, fields)
}

fn listing<T: serde::Serialize>(items: &[T], extra: serde_json::Value) -> Response {
    let mut fields = json!({ "count": items.len() });
    if let (Some(target), serde_json::Value::Object(extra)) = (fields.as_object_mut(), extra) {
        target.extend(extra);
    }
    data_payload(StatusCode::OK, &items, fields)
}

fn message(text: &'static str) -> Response {
    success(StatusCode::OK, json!({ "message": text }))
}

pub(crate) async fn list_categories<S, P>(State(state): Directory<S, P>) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    respond!(state.service.categories(), "Failed to fetch categories", |categories| {
        listing(&categories, json!({}))
    })
}

pub(crate) async fn category_details<S, P>(
    State(state): Directory<S, P>,
    Path(id): Path<String>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = CategoryId(id);
    respond!(
        state.service.category_overview(&id),
        "Failed to fetch category",
        |overview| data_payload(StatusCode::OK, &overview, json!({}))
    )
}

pub(crate) async fn category_resources<S, P>(
    State(state): Directory<S, P>,
    Path(id): Path<String>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = CategoryId(id);
    respond!(
        state.service.category_resources(&id),
        "Failed to fetch category resources",
        |found| {
            let (category, resources) = found;
            listing(&resources, json!({ "category": category }))
        }
    )
}

pub(crate) async fn category_requests<S, P>(
    State(state): Directory<S, P>,
    Path(id): Path<String>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = CategoryId(id);
    respond!(
        state.service.category_requests(&id),
        "Failed to fetch category requests",
        |found| {
            let (category, requests) = found;
            listing(&requests, json!({ "category": category }))
        }
    )
}

pub(crate) async fn search_resources<S, P>(
    State(state): Directory<S, P>,
    Query(query): Query<ResourceQuery>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let filter = ResourceFilter::from(query);
    respond!(
        state.service.search_resources(&filter),
        "Failed to fetch resources",
        |resources| listing(&resources, json!({ "filters": filter }))
    )
}

pub(crate) async fn resource_details<S, P>(
    State(state): Directory<S, P>,
    Path(id): Path<String>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = ResourceId(id);
    respond!(
        state.service.resource_details(&id),
        "Failed to fetch resource",
        |details| data_payload(StatusCode::OK, &details, json!({}))
    )
}

pub(crate) async fn create_resource<S, P>(
    _operator: CurrentUser,
    State(state): Directory<S, P>,
    Json(submission): Json<ResourceSubmission>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    respond!(
        state.service.create_resource(submission),
        "Failed to create resource",
        |resource| data_payload(
            StatusCode::CREATED,
            &resource,
            json!({ "message": "Resource created successfully" })
        )
    )
}

pub(crate) async fn update_resource<S, P>(
    _operator: CurrentUser,
    State(state): Directory<S, P>,
    Path(id): Path<String>,
    Json(update): Json<ResourceUpdate>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = ResourceId(id);
    respond!(
        state.service.update_resource(&id, update),
        "Failed to update resource",
        |resource| data_payload(
            StatusCode::OK,
            &resource,
            json!({ "message": "Resource updated successfully" })
        )
    )
}

pub(crate) async fn retire_resource<S, P>(
    _operator: CurrentUser,
    State(state): Directory<S, P>,
    Path(id): Path<String>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = ResourceId(id);
    respond!(
        state.service.retire_resource(&id),
        "Failed to delete resource",
        |_resource| message("Resource deleted successfully")
    )
}

pub(crate) async fn update_resource_capacity<S, P>(
    _operator: CurrentUser,
    State(state): Directory<S, P>,
    Path(id): Path<String>,
    Json(update): Json<CapacityUpdate>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = ResourceId(id);
    respond!(
        state.service.update_resource_capacity(&id, update),
        "Failed to update resource availability",
        |resource| data_payload(
            StatusCode::OK,
            &resource,
            json!({ "message": "Resource availability updated successfully" })
        )
    )
}

pub(crate) async fn request_queue<S, P>(State(state): Directory<S, P>) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    respond!(
        state.service.request_queue(),
        "Failed to fetch emergency requests",
        |queue| listing(&queue, json!({}))
    )
}

pub(crate) async fn statistics<S, P>(State(state): Directory<S, P>) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    respond!(
        state.service.statistics(),
        "Failed to fetch statistics",
        |stats| data_payload(StatusCode::OK, &stats, json!({}))
    )
}

pub(crate) async fn request_details<S, P>(
    State(state): Directory<S, P>,
    Path(id): Path<String>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = RequestId(id);
    respond!(
        state.service.request_details(&id),
        "Failed to fetch emergency request",
        |details| data_payload(StatusCode::OK, &details, json!({}))
    )
}

pub(crate) async fn submit_request<S, P>(
    State(state): Directory<S, P>,
    Json(submission): Json<EmergencyRequestSubmission>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    respond!(
        state.service.submit_request(submission),
        "Failed to submit emergency request",
        |submitted| data_payload(
            StatusCode::CREATED,
            &submitted.request,
            json!({
                "message": "Emergency request submitted successfully",
                "priority_assigned": submitted.priority_assigned(),
            })
        )
    )
}

pub(crate) async fn update_request_status<S, P>(
    _operator: CurrentUser,
    State(state): Directory<S, P>,
    Path(id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = RequestId(id);
    respond!(
        state.service.update_request_status(&id, change),
        "Failed to update request status",
        |request| data_payload(
            StatusCode::OK,
            &request,
            json!({ "message": "Request status updated successfully" })
        )
    )
}

pub(crate) async fn assign_volunteer<S, P>(
    _operator: CurrentUser,
    State(state): Directory<S, P>,
    Path(id): Path<String>,
    Json(assignment): Json<AssignmentRequest>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = RequestId(id);
    respond!(
        state.service.assign_volunteer(&id, assignment.volunteer_id),
        "Failed to assign volunteer",
        |request| data_payload(
            StatusCode::OK,
            &request,
            json!({ "message": "Volunteer assigned successfully" })
        )
    )
}

pub(crate) async fn delete_request<S, P>(
    _operator: CurrentUser,
    State(state): Directory<S, P>,
    Path(id): Path<String>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = RequestId(id);
    respond!(
        state.service.delete_request(&id),
        "Failed to delete emergency request",
        |_deleted| message("Emergency request deleted successfully")
    )
}

pub(crate) async fn list_volunteers<S, P>(
    State(state): Directory<S, P>,
    Query(query): Query<VolunteerQuery>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let filter = match query.into_filter() {
        Ok(filter) => filter,
        Err(violation) => return failure(StatusCode::BAD_REQUEST, violation.to_string()),
    };
    respond!(
        state.service.volunteers(&filter),
        "Failed to fetch volunteers",
        |volunteers| listing(&volunteers, json!({ "filters": filter }))
    )
}

pub(crate) async fn volunteer_details<S, P>(
    State(state): Directory<S, P>,
    Path(id): Path<String>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = VolunteerId(id);
    respond!(
        state.service.volunteer(&id),
        "Failed to fetch volunteer",
        |volunteer| data_payload(StatusCode::OK, &volunteer, json!({}))
    )
}

pub(crate) async fn register_volunteer<S, P>(
    State(state): Directory<S, P>,
    Json(registration): Json<VolunteerRegistration>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    respond!(
        state.service.register_volunteer(registration),
        "Failed to register volunteer",
        |volunteer| data_payload(
            StatusCode::CREATED,
            &volunteer,
            json!({ "message": "Volunteer registered successfully" })
        )
    )
}

pub(crate) async fn update_volunteer<S, P>(
    _operator: CurrentUser,
    State(state): Directory<S, P>,
    Path(id): Path<String>,
    Json(update): Json<VolunteerUpdate>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = VolunteerId(id);
    respond!(
        state.service.update_volunteer(&id, update),
        "Failed to update volunteer",
        |volunteer| data_payload(
            StatusCode::OK,
            &volunteer,
            json!({ "message": "Volunteer updated successfully" })
        )
    )
}

pub(crate) async fn set_volunteer_status<S, P>(
    _operator: CurrentUser,
    State(state): Directory<S, P>,
    Path(id): Path<String>,
    Json(change): Json<VolunteerStatusChange>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = VolunteerId(id);
    respond!(
        state.service.set_volunteer_status(&id, change.status.as_deref()),
        "Failed to update volunteer status",
        |volunteer| data_payload(
            StatusCode::OK,
            &volunteer,
            json!({ "message": "Volunteer status updated successfully" })
        )
    )
}

pub(crate) async fn volunteer_assignments<S, P>(
    State(state): Directory<S, P>,
    Path(id): Path<String>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = VolunteerId(id);
    respond!(
        state.service.volunteer_assignments(&id),
        "Failed to fetch assignments",
        |assignments| listing(&assignments, json!({}))
    )
}

pub(crate) async fn update_volunteer_availability<S, P>(
    State(state): Directory<S, P>,
    Path(id): Path<String>,
    Json(update): Json<AvailabilityUpdate>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = VolunteerId(id);
    respond!(
        state.service.update_volunteer_availability(&id, update),
        "Failed to update availability",
        |volunteer| data_payload(
            StatusCode::OK,
            &volunteer,
            json!({ "message": "Volunteer availability updated successfully" })
        )
    )
}

pub(crate) async fn match_volunteers<S, P>(
    State(state): Directory<S, P>,
    Path(request_id): Path<String>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let request_id = RequestId(request_id);
    respond!(
        state.service.match_volunteers(&request_id),
        "Failed to match volunteers",
        |report| listing(&report.matches, json!({ "request_info": report.request_info }))
    )
}

pub(crate) async fn retire_volunteer<S, P>(
    _operator: CurrentUser,
    State(state): Directory<S, P>,
    Path(id): Path<String>,
) -> Response
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    let id = VolunteerId(id);
    respond!(
        state.service.retire_volunteer(&id),
        "Failed to remove volunteer",
        |_volunteer| message("Volunteer removed successfully")
    )
}
