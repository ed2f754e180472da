use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{Duration, Utc};
use serde_json::Value;

use crate::auth::{AuthError, AuthGate, AuthenticatedUser, Authenticator, UserId, UserRole};
use crate::coordination::domain::{
    Category, CategoryBadge, CategoryId, DirectoryStats, EmergencyRequest,
    EmergencyRequestSubmission, Priority, RequestId, RequestListing, RequestStatus, Resource,
    ResourceId, ResourceListing, ResourceStatus, Volunteer, VolunteerId, VolunteerRegistration,
    VolunteerStatus,
};
use crate::coordination::repository::{
    DashboardEvent, DirectoryStore, EventPublisher, PublishError, RequestScope, ResourceFilter,
    StoreError, VolunteerFilter,
};
use crate::coordination::{coordination_router, CoordinationService};

pub(super) const OPERATOR_TOKEN: &str = "operator-token";

pub(super) fn category(name: &str) -> Category {
    let now = Utc::now();
    Category {
        id: CategoryId::generate(),
        name: name.to_string(),
        description: None,
        icon: None,
        color: None,
        created_at: now,
        updated_at: now,
    }
}

pub(super) fn volunteer(name: &str, skills: &str, availability: &str) -> Volunteer {
    let now = Utc::now();
    Volunteer {
        id: VolunteerId::generate(),
        name: name.to_string(),
        email: format!("{}@relief.test", name.to_lowercase().replace(' ', ".")),
        phone: None,
        skills: skills.to_string(),
        availability: availability.to_string(),
        location: None,
        latitude: None,
        longitude: None,
        status: VolunteerStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

pub(super) fn located(mut volunteer: Volunteer, latitude: f64, longitude: f64) -> Volunteer {
    volunteer.latitude = Some(latitude);
    volunteer.longitude = Some(longitude);
    volunteer
}

pub(super) fn emergency(description: &str, category_id: Option<CategoryId>) -> EmergencyRequest {
    let now = Utc::now();
    EmergencyRequest {
        id: RequestId::generate(),
        requester_name: "Asha".to_string(),
        requester_phone: Some("+91-9000000000".to_string()),
        requester_email: None,
        description: description.to_string(),
        category_id,
        location: None,
        latitude: None,
        longitude: None,
        priority: Priority::Medium,
        status: RequestStatus::Open,
        assigned_volunteer_id: None,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

pub(super) fn resource(name: &str, category_id: Option<CategoryId>) -> Resource {
    let now = Utc::now();
    Resource {
        id: ResourceId::generate(),
        name: name.to_string(),
        description: None,
        category_id,
        address: "12 Ring Road".to_string(),
        latitude: None,
        longitude: None,
        phone: None,
        email: None,
        website: None,
        operating_hours: None,
        capacity: Some(40),
        current_availability: Some(12),
        status: ResourceStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

pub(super) fn submission(description: &str) -> EmergencyRequestSubmission {
    EmergencyRequestSubmission {
        requester_name: Some("Asha".to_string()),
        requester_phone: Some("+91-9000000000".to_string()),
        description: Some(description.to_string()),
        ..EmergencyRequestSubmission::default()
    }
}

pub(super) fn registration(name: &str, email: &str) -> VolunteerRegistration {
    VolunteerRegistration {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        skills: Some("First Aid".to_string()),
        availability: Some("Weekends".to_string()),
        ..VolunteerRegistration::default()
    }
}

pub(super) fn build_service() -> (
    CoordinationService<MemoryStore, MemoryEvents>,
    Arc<MemoryStore>,
    Arc<MemoryEvents>,
) {
    let store = Arc::new(MemoryStore::default());
    let events = Arc::new(MemoryEvents::default());
    let service = CoordinationService::new(store.clone(), events.clone());
    (service, store, events)
}

pub(super) fn router_with(store: Arc<MemoryStore>) -> axum::Router {
    let service = Arc::new(CoordinationService::new(
        store,
        Arc::new(MemoryEvents::default()),
    ));
    coordination_router(service, operator_gate())
}

pub(super) fn operator_gate() -> AuthGate {
    AuthGate::new(Arc::new(StaticOperator))
}

/// Accepts exactly [`OPERATOR_TOKEN`].
pub(super) struct StaticOperator;

impl Authenticator for StaticOperator {
    fn authenticate(&self, token: Option<&str>) -> Result<AuthenticatedUser, AuthError> {
        match token {
            None => Err(AuthError::MissingToken),
            Some(OPERATOR_TOKEN) => Ok(AuthenticatedUser {
                id: UserId("operator-1".to_string()),
                email: "ops@community.gov.in".to_string(),
                name: "Duty Officer".to_string(),
                role: UserRole::Supervisor,
            }),
            Some(_) => Err(AuthError::InvalidToken),
        }
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[derive(Default)]
pub(super) struct MemoryStore {
    pub(super) categories: Mutex<Vec<Category>>,
    pub(super) resources: Mutex<Vec<Resource>>,
    pub(super) requests: Mutex<Vec<EmergencyRequest>>,
    pub(super) volunteers: Mutex<Vec<Volunteer>>,
}

impl MemoryStore {
    pub(super) fn with_category(&self, name: &str) -> Category {
        self.insert_category(category(name)).expect("insert category")
    }

    pub(super) fn with_volunteer(&self, volunteer: Volunteer) -> Volunteer {
        self.insert_volunteer(volunteer).expect("insert volunteer")
    }

    pub(super) fn with_request(&self, request: EmergencyRequest) -> EmergencyRequest {
        self.insert_request(request).expect("insert request")
    }

    pub(super) fn with_resource(&self, resource: Resource) -> Resource {
        self.insert_resource(resource).expect("insert resource")
    }

    fn badge(&self, id: Option<&CategoryId>) -> CategoryBadge {
        let categories = self.categories.lock().expect("categories mutex poisoned");
        id.and_then(|id| categories.iter().find(|category| &category.id == id))
            .map(|category| CategoryBadge {
                category_name: Some(category.name.clone()),
                category_icon: category.icon.clone(),
                category_color: category.color.clone(),
            })
            .unwrap_or_default()
    }
}

fn contains_ignoring_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase()))
}

fn replace<T: Clone>(
    records: &Mutex<Vec<T>>,
    record: &T,
    same: impl Fn(&T) -> bool,
) -> Result<(), StoreError> {
    let mut guard = records.lock().expect("store mutex poisoned");
    match guard.iter_mut().find(|existing| same(existing)) {
        Some(existing) => {
            *existing = record.clone();
            Ok(())
        }
        None => Err(StoreError::NotFound),
    }
}

impl DirectoryStore for MemoryStore {
    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.categories.lock().expect("categories mutex poisoned").clone())
    }

    fn category(&self, id: &CategoryId) -> Result<Option<Category>, StoreError> {
        let guard = self.categories.lock().expect("categories mutex poisoned");
        Ok(guard.iter().find(|category| &category.id == id).cloned())
    }

    fn insert_category(&self, category: Category) -> Result<Category, StoreError> {
        let mut guard = self.categories.lock().expect("categories mutex poisoned");
        guard.push(category.clone());
        Ok(category)
    }

    fn resources(&self, filter: &ResourceFilter) -> Result<Vec<ResourceListing>, StoreError> {
        let matching: Vec<Resource> = {
            let guard = self.resources.lock().expect("resources mutex poisoned");
            guard
                .iter()
                .rev()
                .filter(|resource| resource.status == ResourceStatus::Active)
                .filter(|resource| {
                    filter
                        .category_id
                        .as_ref()
                        .map_or(true, |id| resource.category_id.as_ref() == Some(id))
                })
                .filter(|resource| {
                    filter.search.as_deref().map_or(true, |search| {
                        contains_ignoring_case(Some(&resource.name), search)
                            || contains_ignoring_case(resource.description.as_deref(), search)
                    })
                })
                .filter(|resource| match filter.proximity_bounds() {
                    Some((latitude, longitude, degrees_squared)) => {
                        match (resource.latitude, resource.longitude) {
                            (Some(lat), Some(lng)) => {
                                (lat - latitude).powi(2) + (lng - longitude).powi(2)
                                    <= degrees_squared
                            }
                            _ => false,
                        }
                    }
                    None => true,
                })
                .cloned()
                .collect()
        };

        Ok(matching
            .into_iter()
            .map(|resource| ResourceListing {
                category: self.badge(resource.category_id.as_ref()),
                resource,
            })
            .collect())
    }

    fn resource(&self, id: &ResourceId) -> Result<Option<Resource>, StoreError> {
        let guard = self.resources.lock().expect("resources mutex poisoned");
        Ok(guard.iter().find(|resource| &resource.id == id).cloned())
    }

    fn insert_resource(&self, resource: Resource) -> Result<Resource, StoreError> {
        let mut guard = self.resources.lock().expect("resources mutex poisoned");
        guard.push(resource.clone());
        Ok(resource)
    }

    fn update_resource(&self, resource: &Resource) -> Result<(), StoreError> {
        replace(&self.resources, resource, |existing| existing.id == resource.id)
    }

    fn request_queue(&self) -> Result<Vec<RequestListing>, StoreError> {
        let requests = self.requests.lock().expect("requests mutex poisoned").clone();
        let volunteers = self.volunteers.lock().expect("volunteers mutex poisoned").clone();
        Ok(requests
            .into_iter()
            .rev()
            .map(|request| {
                let assigned = request.assigned_volunteer_id.as_ref().and_then(|id| {
                    volunteers.iter().find(|volunteer| &volunteer.id == id)
                });
                RequestListing {
                    category: self.badge(request.category_id.as_ref()),
                    volunteer_name: assigned.map(|volunteer| volunteer.name.clone()),
                    volunteer_phone: assigned.and_then(|volunteer| volunteer.phone.clone()),
                    request,
                }
            })
            .collect())
    }

    fn requests(&self, scope: &RequestScope) -> Result<Vec<EmergencyRequest>, StoreError> {
        let guard = self.requests.lock().expect("requests mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .filter(|request| match scope {
                RequestScope::Category(id) => request.category_id.as_ref() == Some(id),
                RequestScope::AssignedTo(id) => request.assigned_volunteer_id.as_ref() == Some(id),
            })
            .cloned()
            .collect())
    }

    fn request(&self, id: &RequestId) -> Result<Option<EmergencyRequest>, StoreError> {
        let guard = self.requests.lock().expect("requests mutex poisoned");
        Ok(guard.iter().find(|request| &request.id == id).cloned())
    }

    fn insert_request(&self, request: EmergencyRequest) -> Result<EmergencyRequest, StoreError> {
        let mut guard = self.requests.lock().expect("requests mutex poisoned");
        guard.push(request.clone());
        Ok(request)
    }

    fn update_request(&self, request: &EmergencyRequest) -> Result<(), StoreError> {
        replace(&self.requests, request, |existing| existing.id == request.id)
    }

    fn delete_request(&self, id: &RequestId) -> Result<(), StoreError> {
        let mut guard = self.requests.lock().expect("requests mutex poisoned");
        let before = guard.len();
        guard.retain(|request| &request.id != id);
        if guard.len() == before {
            Err(StoreError::NotFound)
        } else {
            Ok(())
        }
    }

    fn volunteers(&self, filter: &VolunteerFilter) -> Result<Vec<Volunteer>, StoreError> {
        let guard = self.volunteers.lock().expect("volunteers mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .filter(|volunteer| filter.status.map_or(true, |status| volunteer.status == status))
            .filter(|volunteer| {
                filter
                    .skills
                    .as_deref()
                    .map_or(true, |skills| contains_ignoring_case(Some(&volunteer.skills), skills))
            })
            .filter(|volunteer| {
                filter.location.as_deref().map_or(true, |location| {
                    contains_ignoring_case(volunteer.location.as_deref(), location)
                })
            })
            .cloned()
            .collect())
    }

    fn volunteer(&self, id: &VolunteerId) -> Result<Option<Volunteer>, StoreError> {
        let guard = self.volunteers.lock().expect("volunteers mutex poisoned");
        Ok(guard.iter().find(|volunteer| &volunteer.id == id).cloned())
    }

    fn volunteer_by_email(&self, email: &str) -> Result<Option<Volunteer>, StoreError> {
        let guard = self.volunteers.lock().expect("volunteers mutex poisoned");
        Ok(guard.iter().find(|volunteer| volunteer.email == email).cloned())
    }

    fn insert_volunteer(&self, volunteer: Volunteer) -> Result<Volunteer, StoreError> {
        let mut guard = self.volunteers.lock().expect("volunteers mutex poisoned");
        if guard.iter().any(|existing| existing.email == volunteer.email) {
            return Err(StoreError::Conflict);
        }
        guard.push(volunteer.clone());
        Ok(volunteer)
    }

    fn update_volunteer(&self, volunteer: &Volunteer) -> Result<(), StoreError> {
        replace(&self.volunteers, volunteer, |existing| existing.id == volunteer.id)
    }

    fn statistics(&self) -> Result<DirectoryStats, StoreError> {
        let resources = self.resources.lock().expect("resources mutex poisoned");
        let requests = self.requests.lock().expect("requests mutex poisoned");
        let volunteers = self.volunteers.lock().expect("volunteers mutex poisoned");
        Ok(DirectoryStats {
            total_resources: resources
                .iter()
                .filter(|resource| resource.status == ResourceStatus::Active)
                .count() as u64,
            total_requests: requests
                .iter()
                .filter(|request| request.status != RequestStatus::Closed)
                .count() as u64,
            total_volunteers: volunteers.iter().filter(|volunteer| volunteer.is_active()).count()
                as u64,
            high_priority_requests: requests
                .iter()
                .filter(|request| {
                    request.priority == Priority::High && request.status == RequestStatus::Open
                })
                .count() as u64,
        })
    }
}

#[derive(Default)]
pub(super) struct MemoryEvents {
    events: Mutex<Vec<DashboardEvent>>,
}

impl MemoryEvents {
    pub(super) fn events(&self) -> Vec<DashboardEvent> {
        self.events.lock().expect("events mutex poisoned").clone()
    }
}

impl EventPublisher for MemoryEvents {
    fn publish(&self, event: DashboardEvent) -> Result<(), PublishError> {
        self.events.lock().expect("events mutex poisoned").push(event);
        Ok(())
    }
}

/// Publisher whose transport is always down.
pub(super) struct OfflineEvents;

impl EventPublisher for OfflineEvents {
    fn publish(&self, _event: DashboardEvent) -> Result<(), PublishError> {
        Err(PublishError::Transport("socket closed".to_string()))
    }
}

/// Store that fails every call, for 500 paths.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("database offline".to_string()))
}

impl DirectoryStore for UnavailableStore {
    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        offline()
    }
    fn category(&self, _id: &CategoryId) -> Result<Option<Category>, StoreError> {
        offline()
    }
    fn insert_category(&self, _category: Category) -> Result<Category, StoreError> {
        offline()
    }
    fn resources(&self, _filter: &ResourceFilter) -> Result<Vec<ResourceListing>, StoreError> {
        offline()
    }
    fn resource(&self, _id: &ResourceId) -> Result<Option<Resource>, StoreError> {
        offline()
    }
    fn insert_resource(&self, _resource: Resource) -> Result<Resource, StoreError> {
        offline()
    }
    fn update_resource(&self, _resource: &Resource) -> Result<(), StoreError> {
        offline()
    }
    fn request_queue(&self) -> Result<Vec<RequestListing>, StoreError> {
        offline()
    }
    fn requests(&self, _scope: &RequestScope) -> Result<Vec<EmergencyRequest>, StoreError> {
        offline()
    }
    fn request(&self, _id: &RequestId) -> Result<Option<EmergencyRequest>, StoreError> {
        offline()
    }
    fn insert_request(&self, _request: EmergencyRequest) -> Result<EmergencyRequest, StoreError> {
        offline()
    }
    fn update_request(&self, _request: &EmergencyRequest) -> Result<(), StoreError> {
        offline()
    }
    fn delete_request(&self, _id: &RequestId) -> Result<(), StoreError> {
        offline()
    }
    fn volunteers(&self, _filter: &VolunteerFilter) -> Result<Vec<Volunteer>, StoreError> {
        offline()
    }
    fn volunteer(&self, _id: &VolunteerId) -> Result<Option<Volunteer>, StoreError> {
        offline()
    }
    fn volunteer_by_email(&self, _email: &str) -> Result<Option<Volunteer>, StoreError> {
        offline()
    }
    fn insert_volunteer(&self, _volunteer: Volunteer) -> Result<Volunteer, StoreError> {
        offline()
    }
    fn update_volunteer(&self, _volunteer: &Volunteer) -> Result<(), StoreError> {
        offline()
    }
    fn statistics(&self) -> Result<DirectoryStats, StoreError> {
        offline()
    }
}

/// Shift a record's creation time so ordering tests do not depend on clock resolution.
pub(super) fn aged(mut request: EmergencyRequest, minutes: i64) -> EmergencyRequest {
    request.created_at -= Duration::minutes(minutes);
    request.updated_at = request.created_at;
    request
}
