use chrono::{DateTime, Utc};

use super::domain::{
    AvailabilityUpdate, Category, EmergencyRequest, EmergencyRequestSubmission, Priority,
    RequestId, RequestStatus, Resource, ResourceId, ResourceStatus, ResourceSubmission,
    ResourceUpdate, StatusChange, Volunteer, VolunteerId, VolunteerRegistration, VolunteerStatus,
    VolunteerUpdate,
};
use super::triage::{self, TriageRule};

/// Validation errors raised while turning payloads into records.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("Requester name and description are required")]
    MissingRequestDetails,
    #[error("Invalid priority. Must be one of: {}", Priority::accepted_labels())]
    InvalidPriority,
    #[error("Name and email are required")]
    MissingVolunteerIdentity,
    #[error("Email already registered")]
    EmailAlreadyRegistered,
    #[error("Name and address are required")]
    MissingResourceDetails,
    #[error("Invalid status. Must be one of: {}", RequestStatus::accepted_labels())]
    InvalidRequestStatus,
    #[error("Invalid status. Must be one of: {}", VolunteerStatus::accepted_labels())]
    InvalidVolunteerStatus,
    #[error("Invalid status. Must be one of: {}", ResourceStatus::accepted_labels())]
    InvalidResourceStatus,
    #[error("volunteer_id is required")]
    MissingVolunteerId,
    #[error("Either availability or status must be provided")]
    MissingAvailability,
    #[error("current_availability is required")]
    MissingCurrentAvailability,
}

/// How the stored priority was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityOrigin {
    Supplied,
    Classified(TriageRule),
}

/// Guard responsible for producing validated directory records.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    /// Build a new open request. The classifier runs only when no priority was supplied.
    pub fn emergency_request(
        &self,
        submission: EmergencyRequestSubmission,
        category: Option<&Category>,
        now: DateTime<Utc>,
    ) -> Result<(EmergencyRequest, PriorityOrigin), IntakeViolation> {
        let requester_name = required_text(submission.requester_name);
        let description = required_text(submission.description);
        let (Some(requester_name), Some(description)) = (requester_name, description) else {
            return Err(IntakeViolation::MissingRequestDetails);
        };

        let (priority, origin) = match optional_text(submission.priority) {
            Some(raw) => {
                let priority = raw
                    .to_lowercase()
                    .parse::<Priority>()
                    .map_err(|_| IntakeViolation::InvalidPriority)?;
                (priority, PriorityOrigin::Supplied)
            }
            None => {
                let rule = triage::triage(&description, category.map(|c| c.name.as_str()));
                (rule.priority(), PriorityOrigin::Classified(rule))
            }
        };

        let request = EmergencyRequest {
            id: RequestId::generate(),
            requester_name,
            requester_phone: optional_text(submission.requester_phone),
            requester_email: optional_text(submission.requester_email),
            description,
            category_id: submission.category_id,
            location: optional_text(submission.location),
            latitude: submission.latitude,
            longitude: submission.longitude,
            priority,
            status: RequestStatus::Open,
            assigned_volunteer_id: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        Ok((request, origin))
    }

    pub fn volunteer(
        &self,
        registration: VolunteerRegistration,
        now: DateTime<Utc>,
    ) -> Result<Volunteer, IntakeViolation> {
        let name = required_text(registration.name);
        let email = required_text(registration.email);
        let (Some(name), Some(email)) = (name, email) else {
            return Err(IntakeViolation::MissingVolunteerIdentity);
        };

        Ok(Volunteer {
            id: VolunteerId::generate(),
            name,
            email,
            phone: optional_text(registration.phone),
            skills: registration.skills.unwrap_or_default(),
            availability: registration.availability.unwrap_or_default(),
            location: optional_text(registration.location),
            latitude: registration.latitude,
            longitude: registration.longitude,
            status: VolunteerStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn resource(
        &self,
        submission: ResourceSubmission,
        now: DateTime<Utc>,
    ) -> Result<Resource, IntakeViolation> {
        let name = required_text(submission.name);
        let address = required_text(submission.address);
        let (Some(name), Some(address)) = (name, address) else {
            return Err(IntakeViolation::MissingResourceDetails);
        };

        Ok(Resource {
            id: ResourceId::generate(),
            name,
            description: optional_text(submission.description),
            category_id: submission.category_id,
            address,
            latitude: submission.latitude,
            longitude: submission.longitude,
            phone: optional_text(submission.phone),
            email: optional_text(submission.email),
            website: optional_text(submission.website),
            operating_hours: optional_text(submission.operating_hours),
            capacity: submission.capacity,
            current_availability: submission.current_availability,
            status: ResourceStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update onto `volunteer` in place.
    pub fn apply_volunteer_update(
        &self,
        volunteer: &mut Volunteer,
        update: VolunteerUpdate,
    ) -> Result<(), IntakeViolation> {
        if let Some(status) = update.status.as_deref() {
            volunteer.status = parse_volunteer_status(status)?;
        }
        if let Some(name) = required_text(update.name) {
            volunteer.name = name;
        }
        if let Some(email) = required_text(update.email) {
            volunteer.email = email;
        }
        if update.phone.is_some() {
            volunteer.phone = optional_text(update.phone);
        }
        if let Some(skills) = update.skills {
            volunteer.skills = skills;
        }
        if let Some(availability) = update.availability {
            volunteer.availability = availability;
        }
        if update.location.is_some() {
            volunteer.location = optional_text(update.location);
        }
        if update.latitude.is_some() {
            volunteer.latitude = update.latitude;
        }
        if update.longitude.is_some() {
            volunteer.longitude = update.longitude;
        }
        Ok(())
    }

    pub fn apply_availability(
        &self,
        volunteer: &mut Volunteer,
        update: AvailabilityUpdate,
    ) -> Result<(), IntakeViolation> {
        let availability = required_text(update.availability);
        let status = optional_text(update.status);
        if availability.is_none() && status.is_none() {
            return Err(IntakeViolation::MissingAvailability);
        }

        if let Some(status) = status {
            volunteer.status = parse_volunteer_status(&status)?;
        }
        if let Some(availability) = availability {
            volunteer.availability = availability;
        }
        Ok(())
    }

    /// Apply a partial update onto `resource` in place.
    pub fn apply_resource_update(
        &self,
        resource: &mut Resource,
        update: ResourceUpdate,
    ) -> Result<(), IntakeViolation> {
        if let Some(status) = update.status.as_deref() {
            resource.status = status
                .parse::<ResourceStatus>()
                .map_err(|_| IntakeViolation::InvalidResourceStatus)?;
        }
        if let Some(name) = required_text(update.name) {
            resource.name = name;
        }
        if let Some(address) = required_text(update.address) {
            resource.address = address;
        }
        if update.description.is_some() {
            resource.description = optional_text(update.description);
        }
        if update.category_id.is_some() {
            resource.category_id = update.category_id;
        }
        if update.latitude.is_some() {
            resource.latitude = update.latitude;
        }
        if update.longitude.is_some() {
            resource.longitude = update.longitude;
        }
        if update.phone.is_some() {
            resource.phone = optional_text(update.phone);
        }
        if update.email.is_some() {
            resource.email = optional_text(update.email);
        }
        if update.website.is_some() {
            resource.website = optional_text(update.website);
        }
        if update.operating_hours.is_some() {
            resource.operating_hours = optional_text(update.operating_hours);
        }
        if update.capacity.is_some() {
            resource.capacity = update.capacity;
        }
        if update.current_availability.is_some() {
            resource.current_availability = update.current_availability;
        }
        Ok(())
    }

    /// Validate a status change; assignment and notes only overwrite when present.
    pub fn apply_status_change(
        &self,
        request: &mut EmergencyRequest,
        change: StatusChange,
    ) -> Result<(), IntakeViolation> {
        let status = change
            .status
            .as_deref()
            .ok_or(IntakeViolation::InvalidRequestStatus)?
            .parse::<RequestStatus>()
            .map_err(|_| IntakeViolation::InvalidRequestStatus)?;

        request.status = status;
        if let Some(volunteer_id) = change.assigned_volunteer_id {
            request.assigned_volunteer_id = Some(volunteer_id);
        }
        if let Some(notes) = required_text(change.notes) {
            request.notes = Some(notes);
        }
        Ok(())
    }
}

pub(crate) fn parse_volunteer_status(raw: &str) -> Result<VolunteerStatus, IntakeViolation> {
    raw.parse::<VolunteerStatus>()
        .map_err(|_| IntakeViolation::InvalidVolunteerStatus)
}

fn required_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Keeps caller formatting but drops blank values.
fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
