//! Keyword triage that assigns a priority to newly submitted emergency requests.
//!
//! Rules are evaluated in a fixed order and the first match wins. Matching is plain
//! substring containment on the lower-cased text, so "fireplace" trips the `fire` keyword.

use super::domain::Priority;

/// Description keywords that escalate a request straight to `high`.
pub const HIGH_PRIORITY_KEYWORDS: &[&str] = &[
    "emergency",
    "urgent",
    "critical",
    "life-threatening",
    "immediate",
    "ambulance",
    "fire",
    "bleeding",
    "unconscious",
    "severe",
    "accident",
];

/// Description keywords that mark a request as informational.
pub const LOW_PRIORITY_KEYWORDS: &[&str] = &[
    "information",
    "question",
    "routine",
    "schedule",
    "appointment",
    "general",
    "inquiry",
    "non-urgent",
];

const EMERGENCY_CATEGORY_MARKER: &str = "emergency";

/// Which rule produced a classification, kept for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageRule {
    HighKeyword(&'static str),
    EmergencyCategory,
    LowKeyword(&'static str),
    Default,
}

impl TriageRule {
    pub fn priority(&self) -> Priority {
        match self {
            TriageRule::HighKeyword(_) | TriageRule::EmergencyCategory => Priority::High,
            TriageRule::LowKeyword(_) => Priority::Low,
            TriageRule::Default => Priority::Medium,
        }
    }
}

/// Classify a request description, optionally informed by its category name.
pub fn classify(description: &str, category_name: Option<&str>) -> Priority {
    triage(description, category_name).priority()
}

/// Same as [`classify`] but reports the rule that fired.
pub fn triage(description: &str, category_name: Option<&str>) -> TriageRule {
    let text = description.to_lowercase();

    if let Some(keyword) = first_keyword(&text, HIGH_PRIORITY_KEYWORDS) {
        return TriageRule::HighKeyword(keyword);
    }

    let emergency_category = category_name
        .map(str::to_lowercase)
        .is_some_and(|name| name.contains(EMERGENCY_CATEGORY_MARKER));
    if emergency_category {
        return TriageRule::EmergencyCategory;
    }

    if let Some(keyword) = first_keyword(&text, LOW_PRIORITY_KEYWORDS) {
        return TriageRule::LowKeyword(keyword);
    }

    TriageRule::Default
}

fn first_keyword(text: &str, keywords: &[&'static str]) -> Option<&'static str> {
    keywords.iter().copied().find(|keyword| text.contains(keyword))
}
