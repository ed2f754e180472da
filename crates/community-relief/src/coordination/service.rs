use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use super::domain::{
    AvailabilityUpdate, CapacityUpdate, Category, CategoryId, DirectoryStats, EmergencyRequest,
    EmergencyRequestSubmission, MatchResult, Priority, RequestId, RequestListing, RequestStatus,
    Resource, ResourceId, ResourceListing, ResourceStatus, ResourceSubmission, ResourceUpdate,
    StatusChange, Volunteer, VolunteerId, VolunteerRegistration, VolunteerStatus, VolunteerUpdate,
};
use super::intake::{parse_volunteer_status, IntakeGuard, IntakeViolation, PriorityOrigin};
use super::matching::{RequiredSkills, VolunteerMatcher};
use super::repository::{
    Audience, DashboardEvent, DashboardEventKind, DirectoryStore, EventPublisher, RequestScope,
    ResourceFilter, StoreError, VolunteerFilter,
};

/// Service composing the store, intake guard, matcher, and live-update publisher.
pub struct CoordinationService<S, P> {
    store: Arc<S>,
    events: Arc<P>,
    guard: IntakeGuard,
    matcher: VolunteerMatcher,
}

/// Category with directory counters.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOverview {
    #[serde(flatten)]
    pub category: Category,
    pub stats: CategoryStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub resources: usize,
    pub requests: usize,
    pub active_requests: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceDetails {
    #[serde(flatten)]
    pub resource: Resource,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestDetails {
    #[serde(flatten)]
    pub request: EmergencyRequest,
    pub category: Option<Category>,
    pub assigned_volunteer: Option<Volunteer>,
}

/// Outcome of a request submission, including the priority that was stored.
#[derive(Debug, Clone)]
pub struct SubmittedRequest {
    pub request: EmergencyRequest,
    pub category_name: Option<String>,
    pub priority_origin: PriorityOrigin,
}

impl SubmittedRequest {
    pub fn priority_assigned(&self) -> Priority {
        self.request.priority
    }
}

/// Request summary echoed alongside ranked volunteers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRequestInfo {
    pub id: RequestId,
    pub description: String,
    pub priority: Priority,
    pub required_skills: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub matches: Vec<MatchResult>,
    pub request_info: MatchRequestInfo,
}

/// Record families used in not-found messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Category,
    Resource,
    EmergencyRequest,
    Volunteer,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Entity::Category => "Category",
            Entity::Resource => "Resource",
            Entity::EmergencyRequest => "Emergency request",
            Entity::Volunteer => "Volunteer",
        };
        f.write_str(label)
    }
}

impl<S, P> CoordinationService<S, P>
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
{
    pub fn new(store: Arc<S>, events: Arc<P>) -> Self {
        Self::with_matcher(store, events, VolunteerMatcher::default())
    }

    pub fn with_matcher(store: Arc<S>, events: Arc<P>, matcher: VolunteerMatcher) -> Self {
        Self {
            store,
            events,
            guard: IntakeGuard,
            matcher,
        }
    }

    pub fn categories(&self) -> Result<Vec<Category>, CoordinationError> {
        Ok(self.store.categories()?)
    }

    pub fn category_overview(
        &self,
        id: &CategoryId,
    ) -> Result<CategoryOverview, CoordinationError> {
        let category = self.require_category(id)?;
        let resources = self.store.resources(&ResourceFilter {
            category_id: Some(id.clone()),
            ..ResourceFilter::default()
        })?;
        let requests = self.store.requests(&RequestScope::Category(id.clone()))?;

        let stats = CategoryStats {
            resources: resources.len(),
            requests: requests.len(),
            active_requests: requests
                .iter()
                .filter(|request| request.status.is_active())
                .count(),
        };

        Ok(CategoryOverview { category, stats })
    }

    pub fn category_resources(
        &self,
        id: &CategoryId,
    ) -> Result<(Category, Vec<ResourceListing>), CoordinationError> {
        let category = self.require_category(id)?;
        let resources = self.store.resources(&ResourceFilter {
            category_id: Some(id.clone()),
            ..ResourceFilter::default()
        })?;
        Ok((category, resources))
    }

    pub fn category_requests(
        &self,
        id: &CategoryId,
    ) -> Result<(Category, Vec<EmergencyRequest>), CoordinationError> {
        let category = self.require_category(id)?;
        let requests = self.store.requests(&RequestScope::Category(id.clone()))?;
        Ok((category, requests))
    }

    pub fn search_resources(
        &self,
        filter: &ResourceFilter,
    ) -> Result<Vec<ResourceListing>, CoordinationError> {
        Ok(self.store.resources(filter)?)
    }

    pub fn resource_details(&self, id: &ResourceId) -> Result<ResourceDetails, CoordinationError> {
        let resource = self.require_resource(id)?;
        let category = self.lookup_category(resource.category_id.as_ref())?;
        Ok(ResourceDetails { resource, category })
    }

    pub fn create_resource(
        &self,
        submission: ResourceSubmission,
    ) -> Result<Resource, CoordinationError> {
        let resource = self.guard.resource(submission, Utc::now())?;
        let stored = self.store.insert_resource(resource)?;
        info!(resource_id = %stored.id, name = %stored.name, "resource listed");
        Ok(stored)
    }

    pub fn update_resource(
        &self,
        id: &ResourceId,
        update: ResourceUpdate,
    ) -> Result<Resource, CoordinationError> {
        let mut resource = self.require_resource(id)?;
        self.guard.apply_resource_update(&mut resource, update)?;
        resource.updated_at = Utc::now();
        self.save_resource(&resource)?;
        Ok(resource)
    }

    /// Soft delete: the listing is kept but hidden from searches.
    pub fn retire_resource(&self, id: &ResourceId) -> Result<Resource, CoordinationError> {
        let mut resource = self.require_resource(id)?;
        resource.status = ResourceStatus::Inactive;
        resource.updated_at = Utc::now();
        self.save_resource(&resource)?;
        Ok(resource)
    }

    pub fn update_resource_capacity(
        &self,
        id: &ResourceId,
        update: CapacityUpdate,
    ) -> Result<Resource, CoordinationError> {
        let current_availability = update
            .current_availability
            .ok_or(IntakeViolation::MissingCurrentAvailability)?;

        let mut resource = self.require_resource(id)?;
        resource.current_availability = Some(current_availability);
        resource.updated_at = Utc::now();
        self.save_resource(&resource)?;

        self.notify(
            DashboardEventKind::ResourceUpdated,
            Audience::Everyone,
            json!({
                "id": resource.id,
                "current_availability": current_availability,
                "resource": resource,
            }),
        );

        Ok(resource)
    }

    /// Dashboard queue: most urgent first, newest first within a priority.
    pub fn request_queue(&self) -> Result<Vec<RequestListing>, CoordinationError> {
        let mut queue = self.store.request_queue()?;
        queue.sort_by(|left, right| {
            left.request
                .priority
                .rank()
                .cmp(&right.request.priority.rank())
                .then_with(|| right.request.created_at.cmp(&left.request.created_at))
        });
        Ok(queue)
    }

    pub fn statistics(&self) -> Result<DirectoryStats, CoordinationError> {
        Ok(self.store.statistics()?)
    }

    pub fn request_details(&self, id: &RequestId) -> Result<RequestDetails, CoordinationError> {
        let request = self.require_request(id)?;
        let category = self.lookup_category(request.category_id.as_ref())?;
        let assigned_volunteer = match request.assigned_volunteer_id.as_ref() {
            Some(volunteer_id) => self.store.volunteer(volunteer_id)?,
            None => None,
        };
        Ok(RequestDetails {
            request,
            category,
            assigned_volunteer,
        })
    }

    /// Store a new emergency request and alert admin dashboards.
    pub fn submit_request(
        &self,
        submission: EmergencyRequestSubmission,
    ) -> Result<SubmittedRequest, CoordinationError> {
        let category = self.lookup_category(submission.category_id.as_ref())?;
        let (request, priority_origin) =
            self.guard
                .emergency_request(submission, category.as_ref(), Utc::now())?;

        let stored = self.store.insert_request(request)?;
        let category_name = category.map(|category| category.name);

        info!(
            request_id = %stored.id,
            priority = %stored.priority,
            origin = ?priority_origin,
            "emergency request submitted"
        );

        let mut payload = serde_json::to_value(&stored)
            .map_err(|error| StoreError::Corrupt(error.to_string()))?;
        if let Some(object) = payload.as_object_mut() {
            object.insert(
                "category_name".to_string(),
                json!(category_name.clone().unwrap_or_default()),
            );
        }
        self.notify(DashboardEventKind::NewEmergency, Audience::Admins, payload);

        Ok(SubmittedRequest {
            request: stored,
            category_name,
            priority_origin,
        })
    }

    pub fn update_request_status(
        &self,
        id: &RequestId,
        change: StatusChange,
    ) -> Result<EmergencyRequest, CoordinationError> {
        let mut request = self.require_request(id)?;
        self.guard.apply_status_change(&mut request, change)?;
        request.updated_at = Utc::now();
        self.save_request(&request)?;

        info!(request_id = %request.id, status = %request.status, "request status updated");
        self.notify(
            DashboardEventKind::RequestStatusUpdated,
            Audience::Everyone,
            json!({
                "id": request.id,
                "status": request.status,
                "request": request,
            }),
        );

        Ok(request)
    }

    /// Assign an active volunteer and move the request in progress.
    pub fn assign_volunteer(
        &self,
        id: &RequestId,
        volunteer_id: Option<VolunteerId>,
    ) -> Result<EmergencyRequest, CoordinationError> {
        let volunteer_id = volunteer_id.ok_or(IntakeViolation::MissingVolunteerId)?;
        let volunteer = self
            .store
            .volunteer(&volunteer_id)?
            .filter(Volunteer::is_active)
            .ok_or(CoordinationError::VolunteerUnavailable)?;

        let mut request = self.require_request(id)?;
        request.assigned_volunteer_id = Some(volunteer.id.clone());
        request.status = RequestStatus::InProgress;
        request.updated_at = Utc::now();
        self.save_request(&request)?;

        info!(request_id = %request.id, volunteer_id = %volunteer.id, "volunteer assigned");
        self.notify(
            DashboardEventKind::RequestAssigned,
            Audience::Volunteer(volunteer.id.clone()),
            json!({
                "request": request,
                "volunteer": volunteer,
            }),
        );

        Ok(request)
    }

    pub fn delete_request(&self, id: &RequestId) -> Result<(), CoordinationError> {
        match self.store.delete_request(id) {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => Err(CoordinationError::NotFound(Entity::EmergencyRequest)),
            Err(other) => Err(other.into()),
        }
    }

    pub fn volunteers(&self, filter: &VolunteerFilter) -> Result<Vec<Volunteer>, CoordinationError> {
        Ok(self.store.volunteers(filter)?)
    }

    pub fn volunteer(&self, id: &VolunteerId) -> Result<Volunteer, CoordinationError> {
        self.require_volunteer(id)
    }

    pub fn register_volunteer(
        &self,
        registration: VolunteerRegistration,
    ) -> Result<Volunteer, CoordinationError> {
        let volunteer = self.guard.volunteer(registration, Utc::now())?;
        if self.store.volunteer_by_email(&volunteer.email)?.is_some() {
            return Err(IntakeViolation::EmailAlreadyRegistered.into());
        }

        let stored = match self.store.insert_volunteer(volunteer) {
            Ok(stored) => stored,
            Err(StoreError::Conflict) => return Err(IntakeViolation::EmailAlreadyRegistered.into()),
            Err(other) => return Err(other.into()),
        };
        info!(volunteer_id = %stored.id, "volunteer registered");
        Ok(stored)
    }

    pub fn update_volunteer(
        &self,
        id: &VolunteerId,
        update: VolunteerUpdate,
    ) -> Result<Volunteer, CoordinationError> {
        let mut volunteer = self.require_volunteer(id)?;
        self.guard.apply_volunteer_update(&mut volunteer, update)?;
        volunteer.updated_at = Utc::now();
        self.save_volunteer(&volunteer)?;
        Ok(volunteer)
    }

    pub fn set_volunteer_status(
        &self,
        id: &VolunteerId,
        status: Option<&str>,
    ) -> Result<Volunteer, CoordinationError> {
        let status = parse_volunteer_status(status.unwrap_or_default())?;
        let mut volunteer = self.require_volunteer(id)?;
        volunteer.status = status;
        volunteer.updated_at = Utc::now();
        self.save_volunteer(&volunteer)?;
        Ok(volunteer)
    }

    pub fn update_volunteer_availability(
        &self,
        id: &VolunteerId,
        update: AvailabilityUpdate,
    ) -> Result<Volunteer, CoordinationError> {
        let mut volunteer = self.require_volunteer(id)?;
        self.guard.apply_availability(&mut volunteer, update)?;
        volunteer.updated_at = Utc::now();
        self.save_volunteer(&volunteer)?;
        Ok(volunteer)
    }

    pub fn volunteer_assignments(
        &self,
        id: &VolunteerId,
    ) -> Result<Vec<EmergencyRequest>, CoordinationError> {
        let volunteer = self.require_volunteer(id)?;
        Ok(self.store.requests(&RequestScope::AssignedTo(volunteer.id))?)
    }

    /// Soft delete: the volunteer goes inactive and drops out of matching.
    pub fn retire_volunteer(&self, id: &VolunteerId) -> Result<Volunteer, CoordinationError> {
        self.set_volunteer_status(id, Some(VolunteerStatus::Inactive.label()))
    }

    /// Rank active volunteers for a stored request.
    pub fn match_volunteers(&self, request_id: &RequestId) -> Result<MatchReport, CoordinationError> {
        let request = self.require_request(request_id)?;
        let category = self.lookup_category(request.category_id.as_ref())?;
        let required = RequiredSkills::for_category(category.as_ref().map(|c| c.name.as_str()));

        let pool = self.store.volunteers(&VolunteerFilter::active())?;
        let matches = self.matcher.rank(&request, &required, &pool);

        info!(
            request_id = %request.id,
            candidates = pool.len(),
            returned = matches.len(),
            required_skills = required.as_str(),
            "volunteers matched"
        );

        Ok(MatchReport {
            matches,
            request_info: MatchRequestInfo {
                id: request.id,
                description: request.description,
                priority: request.priority,
                required_skills: required.as_str().to_string(),
            },
        })
    }

    fn notify(&self, kind: DashboardEventKind, audience: Audience, payload: serde_json::Value) {
        let event = DashboardEvent {
            kind,
            audience,
            payload,
        };
        if let Err(error) = self.events.publish(event) {
            warn!(event = kind.label(), %error, "dashboard event dropped");
        }
    }

    fn lookup_category(
        &self,
        id: Option<&CategoryId>,
    ) -> Result<Option<Category>, CoordinationError> {
        match id {
            Some(id) => Ok(self.store.category(id)?),
            None => Ok(None),
        }
    }

    fn require_category(&self, id: &CategoryId) -> Result<Category, CoordinationError> {
        self.store
            .category(id)?
            .ok_or(CoordinationError::NotFound(Entity::Category))
    }

    fn require_resource(&self, id: &ResourceId) -> Result<Resource, CoordinationError> {
        self.store
            .resource(id)?
            .ok_or(CoordinationError::NotFound(Entity::Resource))
    }

    fn require_request(&self, id: &RequestId) -> Result<EmergencyRequest, CoordinationError> {
        self.store
            .request(id)?
            .ok_or(CoordinationError::NotFound(Entity::EmergencyRequest))
    }

    fn require_volunteer(&self, id: &VolunteerId) -> Result<Volunteer, CoordinationError> {
        self.store
            .volunteer(id)?
            .ok_or(CoordinationError::NotFound(Entity::Volunteer))
    }

    fn save_resource(&self, resource: &Resource) -> Result<(), CoordinationError> {
        self.store
            .update_resource(resource)
            .map_err(|error| not_found_as(error, Entity::Resource))
    }

    fn save_request(&self, request: &EmergencyRequest) -> Result<(), CoordinationError> {
        self.store
            .update_request(request)
            .map_err(|error| not_found_as(error, Entity::EmergencyRequest))
    }

    fn save_volunteer(&self, volunteer: &Volunteer) -> Result<(), CoordinationError> {
        match self.store.update_volunteer(volunteer) {
            Ok(()) => Ok(()),
            Err(StoreError::Conflict) => Err(IntakeViolation::EmailAlreadyRegistered.into()),
            Err(other) => Err(not_found_as(other, Entity::Volunteer)),
        }
    }
}

fn not_found_as(error: StoreError, entity: Entity) -> CoordinationError {
    match error {
        StoreError::NotFound => CoordinationError::NotFound(entity),
        other => CoordinationError::Store(other),
    }
}

/// Error raised by the coordination service.
#[derive(Debug, thiserror::Error)]
pub enum CoordinationError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error("{0} not found")]
    NotFound(Entity),
    #[error("Volunteer not found or inactive")]
    VolunteerUnavailable,
    #[error(transparent)]
    Store(#[from] StoreError),
}
