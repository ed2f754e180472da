use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

record_id!(
    /// Identifier wrapper for emergency requests.
    RequestId
);
record_id!(
    /// Identifier wrapper for registered volunteers.
    VolunteerId
);
record_id!(
    /// Identifier wrapper for resource categories.
    CategoryId
);
record_id!(
    /// Identifier wrapper for directory resources.
    ResourceId
);

/// Error returned when a stored or submitted label does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {kind} '{value}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Comma separated list of accepted labels, used in validation messages.
            pub fn accepted_labels() -> String {
                Self::ALL
                    .iter()
                    .map(|value| value.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim() {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownLabel {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

labelled_enum!(
    /// Handling urgency attached to an emergency request.
    Priority, "priority", {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);

impl Priority {
    /// Position in dashboard ordering, most urgent first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

labelled_enum!(
    /// Lifecycle of an emergency request.
    RequestStatus, "request status", {
        Open => "open",
        InProgress => "in-progress",
        Resolved => "resolved",
        Closed => "closed",
    }
);

impl RequestStatus {
    /// Requests still awaiting resolution.
    pub fn is_active(&self) -> bool {
        matches!(self, RequestStatus::Open | RequestStatus::InProgress)
    }
}

labelled_enum!(
    /// Volunteer availability state. Only `active` volunteers are matched.
    VolunteerStatus, "volunteer status", {
        Active => "active",
        Inactive => "inactive",
        Busy => "busy",
    }
);

labelled_enum!(
    /// Directory listing state; resources are soft deleted by going inactive.
    ResourceStatus, "resource status", {
        Active => "active",
        Inactive => "inactive",
    }
);

/// Emergency request raised by a community member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyRequest {
    pub id: RequestId,
    pub requester_name: String,
    pub requester_phone: Option<String>,
    pub requester_email: Option<String>,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub priority: Priority,
    pub status: RequestStatus,
    pub assigned_volunteer_id: Option<VolunteerId>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmergencyRequest {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// Registered volunteer. Skills and availability are free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: VolunteerId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub skills: String,
    pub availability: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: VolunteerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Volunteer {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    pub fn is_active(&self) -> bool {
        self.status == VolunteerStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Community resource listed in the directory (clinic, shelter, food bank, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub operating_hours: Option<String>,
    pub capacity: Option<i64>,
    pub current_availability: Option<i64>,
    pub status: ResourceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Volunteer ranked for a specific request. Derived per call, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub volunteer: Volunteer,
    pub match_score: u32,
    pub matching_skills: String,
}

/// Category display fields joined onto listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryBadge {
    pub category_name: Option<String>,
    pub category_icon: Option<String>,
    pub category_color: Option<String>,
}

/// Resource row joined with its category for directory searches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceListing {
    #[serde(flatten)]
    pub resource: Resource,
    #[serde(flatten)]
    pub category: CategoryBadge,
}

/// Request row joined with its category and assigned volunteer for the dashboard queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestListing {
    #[serde(flatten)]
    pub request: EmergencyRequest,
    #[serde(flatten)]
    pub category: CategoryBadge,
    pub volunteer_name: Option<String>,
    pub volunteer_phone: Option<String>,
}

/// Headline counters shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryStats {
    pub total_resources: u64,
    pub total_requests: u64,
    pub total_volunteers: u64,
    pub high_priority_requests: u64,
}

/// Inbound emergency request payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmergencyRequestSubmission {
    #[serde(default)]
    pub requester_name: Option<String>,
    #[serde(default)]
    pub requester_phone: Option<String>,
    #[serde(default)]
    pub requester_email: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub priority: Option<String>,
}

/// Inbound volunteer sign-up payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolunteerRegistration {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub longitude: Option<f64>,
}

/// Partial volunteer update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolunteerUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityUpdate {
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Inbound resource payload for new directory entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSubmission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub operating_hours: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_count")]
    pub capacity: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_count")]
    pub current_availability: Option<i64>,
}

/// Partial resource update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub operating_hours: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_count")]
    pub capacity: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_count")]
    pub current_availability: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapacityUpdate {
    #[serde(default, deserialize_with = "deserialize_optional_count")]
    pub current_availability: Option<i64>,
}

/// Status transition requested by a coordinator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub assigned_volunteer_id: Option<VolunteerId>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRequest {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub volunteer_id: Option<VolunteerId>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
}

impl LenientNumber {
    fn into_f64(self) -> Option<f64> {
        match self {
            LenientNumber::Number(value) => Some(value),
            LenientNumber::Text(raw) => leading_float(&raw),
        }
    }
}

/// Parse the longest decimal prefix of `raw` (sign, digits, fraction, exponent), so form
/// posts like "28.61N" or "1e3" still resolve.
fn leading_float(raw: &str) -> Option<f64> {
    let bytes = raw.trim().as_bytes();
    let digits_from = |mut at: usize| {
        while bytes.get(at).is_some_and(u8::is_ascii_digit) {
            at += 1;
        }
        at
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let integer_end = digits_from(end);
    let mut mantissa_digits = integer_end > end;
    end = integer_end;
    if bytes.get(end) == Some(&b'.') {
        let fraction_end = digits_from(end + 1);
        mantissa_digits |= fraction_end > end + 1;
        end = fraction_end;
    }
    if !mantissa_digits {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let exponent_end = digits_from(exponent);
        if exponent_end > exponent {
            end = exponent_end;
        }
    }

    std::str::from_utf8(&bytes[..end])
        .ok()?
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Accepts numbers or numeric strings. Empty and unparseable values become `None`.
pub(crate) fn deserialize_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LenientNumber>::deserialize(deserializer)?;
    Ok(raw.and_then(LenientNumber::into_f64))
}

/// Like [`deserialize_optional_number`] but truncates to a whole count.
pub(crate) fn deserialize_optional_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = deserialize_optional_number(deserializer)?;
    Ok(raw.map(|value| value.trunc() as i64))
}

/// Treats empty identifier strings as absent.
pub(crate) fn deserialize_optional_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: for<'a> From<&'a str>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(|value| T::from(value.as_str())))
}
