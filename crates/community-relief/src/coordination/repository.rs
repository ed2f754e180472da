use serde::Serialize;
use serde_json::Value;

use super::domain::{
    Category, CategoryId, DirectoryStats, EmergencyRequest, RequestId, RequestListing, Resource,
    ResourceId, ResourceListing, Volunteer, VolunteerId, VolunteerStatus,
};

/// Directory search constraints. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Search radius in kilometres, approximated as 111 km per coordinate degree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

impl ResourceFilter {
    pub const KM_PER_DEGREE: f64 = 111.0;

    /// Centre and squared degree radius, only when all three geo fields are present.
    pub fn proximity_bounds(&self) -> Option<(f64, f64, f64)> {
        match (self.latitude, self.longitude, self.radius) {
            (Some(latitude), Some(longitude), Some(radius)) => {
                let degrees = radius / Self::KM_PER_DEGREE;
                Some((latitude, longitude, degrees * degrees))
            }
            _ => None,
        }
    }
}

/// Volunteer roster constraints. Skills and location are substring filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VolunteerFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VolunteerStatus>,
}

impl VolunteerFilter {
    pub fn active() -> Self {
        Self {
            status: Some(VolunteerStatus::Active),
            ..Self::default()
        }
    }
}

/// Selects the subset of requests tied to a category or volunteer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestScope {
    Category(CategoryId),
    AssignedTo(VolunteerId),
}

/// Data-access interface handed to the coordination service.
///
/// Update methods return [`StoreError::NotFound`] when the record is missing.
pub trait DirectoryStore: Send + Sync {
    fn categories(&self) -> Result<Vec<Category>, StoreError>;
    fn category(&self, id: &CategoryId) -> Result<Option<Category>, StoreError>;
    fn insert_category(&self, category: Category) -> Result<Category, StoreError>;

    fn resources(&self, filter: &ResourceFilter) -> Result<Vec<ResourceListing>, StoreError>;
    fn resource(&self, id: &ResourceId) -> Result<Option<Resource>, StoreError>;
    fn insert_resource(&self, resource: Resource) -> Result<Resource, StoreError>;
    fn update_resource(&self, resource: &Resource) -> Result<(), StoreError>;

    fn request_queue(&self) -> Result<Vec<RequestListing>, StoreError>;
    fn requests(&self, scope: &RequestScope) -> Result<Vec<EmergencyRequest>, StoreError>;
    fn request(&self, id: &RequestId) -> Result<Option<EmergencyRequest>, StoreError>;
    fn insert_request(&self, request: EmergencyRequest) -> Result<EmergencyRequest, StoreError>;
    fn update_request(&self, request: &EmergencyRequest) -> Result<(), StoreError>;
    fn delete_request(&self, id: &RequestId) -> Result<(), StoreError>;

    fn volunteers(&self, filter: &VolunteerFilter) -> Result<Vec<Volunteer>, StoreError>;
    fn volunteer(&self, id: &VolunteerId) -> Result<Option<Volunteer>, StoreError>;
    fn volunteer_by_email(&self, email: &str) -> Result<Option<Volunteer>, StoreError>;
    fn insert_volunteer(&self, volunteer: Volunteer) -> Result<Volunteer, StoreError>;
    fn update_volunteer(&self, volunteer: &Volunteer) -> Result<(), StoreError>;

    fn statistics(&self) -> Result<DirectoryStats, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Who should receive a dashboard event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    Admins,
    Volunteer(VolunteerId),
}

/// Named events pushed to live dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardEventKind {
    NewEmergency,
    RequestStatusUpdated,
    RequestAssigned,
    ResourceUpdated,
}

impl DashboardEventKind {
    pub fn label(&self) -> &'static str {
        match self {
            DashboardEventKind::NewEmergency => "new-emergency",
            DashboardEventKind::RequestStatusUpdated => "request-status-updated",
            DashboardEventKind::RequestAssigned => "request-assigned",
            DashboardEventKind::ResourceUpdated => "resource-updated",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardEvent {
    pub kind: DashboardEventKind,
    pub audience: Audience,
    pub payload: Value,
}

/// Outbound hook for live updates (in-process hub, message bus, ...).
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: DashboardEvent) -> Result<(), PublishError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("event transport unavailable: {0}")]
    Transport(String),
    #[error("event payload could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
}
