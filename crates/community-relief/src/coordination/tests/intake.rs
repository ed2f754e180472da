use super::common::*;
use chrono::Utc;

use crate::coordination::domain::{
    AvailabilityUpdate, Priority, RequestStatus, ResourceStatus, ResourceSubmission,
    ResourceUpdate, StatusChange, VolunteerId, VolunteerStatus, VolunteerUpdate,
};
use crate::coordination::intake::{IntakeGuard, IntakeViolation, PriorityOrigin};
use crate::coordination::triage::TriageRule;

#[test]
fn requests_need_a_requester_and_description() {
    let guard = IntakeGuard;
    let mut blank = submission("   ");
    assert_eq!(
        guard.emergency_request(blank.clone(), None, Utc::now()),
        Err(IntakeViolation::MissingRequestDetails)
    );

    blank.description = Some("Need water".to_string());
    blank.requester_name = None;
    assert_eq!(
        guard.emergency_request(blank, None, Utc::now()),
        Err(IntakeViolation::MissingRequestDetails)
    );
}

#[test]
fn missing_priority_is_classified_with_the_category_name() {
    let guard = IntakeGuard;
    let emergency_services = category("Emergency Services");
    let (request, origin) = guard
        .emergency_request(
            submission("Family stranded on the highway"),
            Some(&emergency_services),
            Utc::now(),
        )
        .expect("valid submission");

    assert_eq!(request.priority, Priority::High);
    assert_eq!(origin, PriorityOrigin::Classified(TriageRule::EmergencyCategory));
    assert_eq!(request.status, RequestStatus::Open);
    assert!(request.assigned_volunteer_id.is_none());
}

#[test]
fn supplied_priority_is_never_overridden() {
    let guard = IntakeGuard;
    let mut payload = submission("Fire in the stairwell");
    payload.priority = Some("Low".to_string());

    let (request, origin) = guard
        .emergency_request(payload, None, Utc::now())
        .expect("valid submission");
    assert_eq!(request.priority, Priority::Low);
    assert_eq!(origin, PriorityOrigin::Supplied);
}

#[test]
fn unknown_priority_labels_are_rejected() {
    let mut payload = submission("Need a ride");
    payload.priority = Some("critical".to_string());
    assert_eq!(
        IntakeGuard.emergency_request(payload, None, Utc::now()),
        Err(IntakeViolation::InvalidPriority)
    );
}

#[test]
fn blank_priority_falls_back_to_classification() {
    let mut payload = submission("Question about shelter rules");
    payload.priority = Some("  ".to_string());
    let (request, origin) = IntakeGuard
        .emergency_request(payload, None, Utc::now())
        .expect("valid submission");
    assert_eq!(request.priority, Priority::Low);
    assert!(matches!(origin, PriorityOrigin::Classified(_)));
}

#[test]
fn volunteers_need_name_and_email() {
    let mut payload = registration("Meera", "meera@relief.test");
    payload.email = Some(" ".to_string());
    assert_eq!(
        IntakeGuard.volunteer(payload, Utc::now()),
        Err(IntakeViolation::MissingVolunteerIdentity)
    );

    let volunteer = IntakeGuard
        .volunteer(registration(" Meera ", "meera@relief.test"), Utc::now())
        .expect("valid registration");
    assert_eq!(volunteer.name, "Meera");
    assert_eq!(volunteer.status, VolunteerStatus::Active);
}

#[test]
fn resources_need_name_and_address() {
    let payload = ResourceSubmission {
        name: Some("Night Shelter".to_string()),
        ..ResourceSubmission::default()
    };
    assert_eq!(
        IntakeGuard.resource(payload, Utc::now()),
        Err(IntakeViolation::MissingResourceDetails)
    );
}

#[test]
fn volunteer_updates_only_touch_supplied_fields() {
    let mut record = volunteer("Meera", "First Aid", "Weekends");
    IntakeGuard
        .apply_volunteer_update(
            &mut record,
            VolunteerUpdate {
                availability: Some("Flexible".to_string()),
                ..VolunteerUpdate::default()
            },
        )
        .expect("valid update");

    assert_eq!(record.availability, "Flexible");
    assert_eq!(record.skills, "First Aid");

    let invalid = VolunteerUpdate {
        status: Some("retired".to_string()),
        ..VolunteerUpdate::default()
    };
    assert_eq!(
        IntakeGuard.apply_volunteer_update(&mut record, invalid),
        Err(IntakeViolation::InvalidVolunteerStatus)
    );
}

#[test]
fn availability_updates_need_a_value() {
    let mut record = volunteer("Meera", "First Aid", "Weekends");
    assert_eq!(
        IntakeGuard.apply_availability(&mut record, AvailabilityUpdate::default()),
        Err(IntakeViolation::MissingAvailability)
    );

    IntakeGuard
        .apply_availability(
            &mut record,
            AvailabilityUpdate {
                availability: None,
                status: Some("busy".to_string()),
            },
        )
        .expect("status alone is enough");
    assert_eq!(record.status, VolunteerStatus::Busy);
    assert_eq!(record.availability, "Weekends");
}

#[test]
fn resource_status_must_be_known() {
    let mut record = resource("Food Bank", None);
    let update = ResourceUpdate {
        status: Some("archived".to_string()),
        ..ResourceUpdate::default()
    };
    assert_eq!(
        IntakeGuard.apply_resource_update(&mut record, update),
        Err(IntakeViolation::InvalidResourceStatus)
    );
    assert_eq!(record.status, ResourceStatus::Active);
}

#[test]
fn status_changes_keep_assignment_unless_replaced() {
    let mut request = emergency("Medicine delivery", None);
    let volunteer_id = VolunteerId::from("vol-1");
    request.assigned_volunteer_id = Some(volunteer_id.clone());

    IntakeGuard
        .apply_status_change(
            &mut request,
            StatusChange {
                status: Some("resolved".to_string()),
                assigned_volunteer_id: None,
                notes: Some("Delivered at 4pm".to_string()),
            },
        )
        .expect("valid change");

    assert_eq!(request.status, RequestStatus::Resolved);
    assert_eq!(request.assigned_volunteer_id, Some(volunteer_id));
    assert_eq!(request.notes.as_deref(), Some("Delivered at 4pm"));

    let missing = StatusChange::default();
    assert_eq!(
        IntakeGuard.apply_status_change(&mut request, missing),
        Err(IntakeViolation::InvalidRequestStatus)
    );
}
