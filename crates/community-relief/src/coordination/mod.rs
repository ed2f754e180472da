//! Emergency request coordination: triage, volunteer matching, and the directory service.
//!
//! Requests arrive through the intake guard, get a priority from the keyword classifier
//! when the submitter did not choose one, and are ranked against the active volunteer pool
//! on demand. Live dashboard updates go through an [`EventPublisher`].

pub mod domain;
pub(crate) mod intake;
pub mod matching;
pub mod repository;
pub mod router;
pub mod service;
pub mod triage;

#[cfg(test)]
mod tests;

pub use domain::{
    AssignmentRequest, AvailabilityUpdate, CapacityUpdate, Category, CategoryId, DirectoryStats,
    EmergencyRequest, EmergencyRequestSubmission, MatchResult, Priority, RequestId,
    RequestListing, RequestStatus, Resource, ResourceId, ResourceListing, ResourceStatus,
    ResourceSubmission, ResourceUpdate, StatusChange, Volunteer, VolunteerId,
    VolunteerRegistration, VolunteerStatus, VolunteerUpdate,
};
pub use intake::{IntakeViolation, PriorityOrigin};
pub use matching::{MatchSignals, RequiredSkills, VolunteerMatcher, DEFAULT_MATCH_LIMIT};
pub use repository::{
    Audience, DashboardEvent, DashboardEventKind, DirectoryStore, EventPublisher, PublishError,
    RequestScope, ResourceFilter, StoreError, VolunteerFilter,
};
pub use router::{coordination_router, DirectoryState};
pub use service::{CoordinationError, CoordinationService, MatchReport};
pub use triage::{classify, TriageRule};
