/// Category names with a known skill profile and the skills they call for.
const CATEGORY_SKILLS: &[(&str, &str)] = &[
    ("Healthcare", "First Aid, Medical"),
    ("Transportation", "Transportation, Driving"),
    ("Food Distribution", "Food Service, General Help"),
    ("Emergency Services", "First Aid, Emergency Response"),
    ("Mental Health", "Counseling, Mental Health"),
];

/// Comma separated skill list a request's category calls for.
///
/// Category lookup is an exact, case-sensitive match on the category name. Unknown or missing
/// categories resolve to an empty list, which contributes nothing to skill scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredSkills {
    raw: &'static str,
}

impl RequiredSkills {
    pub fn for_category(category_name: Option<&str>) -> Self {
        let raw = category_name
            .and_then(|name| {
                CATEGORY_SKILLS
                    .iter()
                    .find(|(category, _)| *category == name)
                    .map(|(_, skills)| *skills)
            })
            .unwrap_or("");
        Self { raw }
    }

    /// The verbatim table entry, echoed back to callers as `matching_skills`.
    pub fn as_str(&self) -> &'static str {
        self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Trimmed, lower-cased skill tokens.
    pub fn tokens(&self) -> impl Iterator<Item = String> + '_ {
        self.raw
            .split(',')
            .map(|token| token.trim().to_lowercase())
            .filter(|token| !token.is_empty())
    }

    /// Category names with a skill profile, in table order.
    pub fn known_categories() -> impl Iterator<Item = &'static str> {
        CATEGORY_SKILLS.iter().map(|(category, _)| *category)
    }
}
