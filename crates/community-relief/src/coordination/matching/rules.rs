use super::skills::RequiredSkills;

pub(crate) const SKILL_POINTS: f64 = 10.0;
pub(crate) const PROXIMITY_CEILING: f64 = 10.0;
pub(crate) const PROXIMITY_DECAY_PER_DEGREE: f64 = 10.0;
pub(crate) const FLEXIBLE_AVAILABILITY_BONUS: f64 = 5.0;

const FLEXIBLE_MARKER: &str = "flexible";

/// Raw sub-scores for one volunteer before rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MatchSignals {
    pub skills: f64,
    pub proximity: f64,
    pub availability: f64,
}

impl MatchSignals {
    pub fn total(&self) -> f64 {
        self.skills + self.proximity + self.availability
    }

    /// Rounded total. Every component is non-negative so the cast never wraps.
    pub fn match_score(&self) -> u32 {
        self.total().max(0.0).round() as u32
    }
}

/// Ten points for every required skill found inside the volunteer's skill text.
pub(crate) fn skill_score(required: &RequiredSkills, volunteer_skills: &str) -> f64 {
    if required.is_empty() || volunteer_skills.is_empty() {
        return 0.0;
    }

    let haystack = volunteer_skills.to_lowercase();
    let matched = required
        .tokens()
        .filter(|skill| haystack.contains(skill.as_str()))
        .count();

    matched as f64 * SKILL_POINTS
}

/// Linear decay over raw coordinate-degree distance, reaching zero at one degree.
pub(crate) fn proximity_score(request: Option<(f64, f64)>, volunteer: Option<(f64, f64)>) -> f64 {
    let (Some((request_lat, request_lng)), Some((volunteer_lat, volunteer_lng))) =
        (request, volunteer)
    else {
        return 0.0;
    };

    let distance = ((request_lat - volunteer_lat).powi(2)
        + (request_lng - volunteer_lng).powi(2))
    .sqrt();

    (PROXIMITY_CEILING - distance * PROXIMITY_DECAY_PER_DEGREE).max(0.0)
}

pub(crate) fn availability_bonus(availability: &str) -> f64 {
    if availability.to_lowercase().contains(FLEXIBLE_MARKER) {
        FLEXIBLE_AVAILABILITY_BONUS
    } else {
        0.0
    }
}
