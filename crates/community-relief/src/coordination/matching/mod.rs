mod rules;
mod skills;

pub use rules::MatchSignals;
pub use skills::RequiredSkills;

use super::domain::{EmergencyRequest, MatchResult, Volunteer};

/// Number of ranked volunteers returned for a request.
pub const DEFAULT_MATCH_LIMIT: usize = 10;

/// Stateless ranker scoring volunteers against an emergency request.
#[derive(Debug, Clone)]
pub struct VolunteerMatcher {
    limit: usize,
}

impl Default for VolunteerMatcher {
    fn default() -> Self {
        Self::with_limit(DEFAULT_MATCH_LIMIT)
    }
}

impl VolunteerMatcher {
    pub fn with_limit(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Score a single volunteer without ranking.
    pub fn signals(
        &self,
        request: &EmergencyRequest,
        required: &RequiredSkills,
        volunteer: &Volunteer,
    ) -> MatchSignals {
        MatchSignals {
            skills: rules::skill_score(required, &volunteer.skills),
            proximity: rules::proximity_score(request.coordinates(), volunteer.coordinates()),
            availability: rules::availability_bonus(&volunteer.availability),
        }
    }

    /// Rank the active volunteers in `pool` for `request`, best first.
    ///
    /// Ties keep pool order. Inactive and busy volunteers are skipped even if the caller
    /// already filtered them out.
    pub fn rank(
        &self,
        request: &EmergencyRequest,
        required: &RequiredSkills,
        pool: &[Volunteer],
    ) -> Vec<MatchResult> {
        let mut ranked: Vec<MatchResult> = pool
            .iter()
            .filter(|volunteer| volunteer.is_active())
            .map(|volunteer| MatchResult {
                volunteer: volunteer.clone(),
                match_score: self.signals(request, required, volunteer).match_score(),
                matching_skills: required.as_str().to_string(),
            })
            .collect();

        // `sort_by` is stable, which keeps equal scores in pool order.
        ranked.sort_by(|left, right| right.match_score.cmp(&left.match_score));
        ranked.truncate(self.limit);
        ranked
    }
}
