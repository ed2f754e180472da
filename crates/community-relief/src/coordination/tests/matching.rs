use super::common::*;
use crate::coordination::matching::{RequiredSkills, VolunteerMatcher, DEFAULT_MATCH_LIMIT};
use crate::coordination::domain::VolunteerStatus;

fn healthcare() -> RequiredSkills {
    RequiredSkills::for_category(Some("Healthcare"))
}

#[test]
fn skills_count_ten_points_each() {
    let matcher = VolunteerMatcher::default();
    let request = emergency("Fall injury", None);
    let medic = volunteer("Meera", "First Aid, Medical, Driving", "Weekdays");
    let driver = volunteer("Ravi", "driving", "Weekdays");

    let ranked = matcher.rank(&request, &healthcare(), &[driver, medic]);
    assert_eq!(ranked[0].volunteer.name, "Meera");
    assert_eq!(ranked[0].match_score, 20);
    assert_eq!(ranked[0].matching_skills, "First Aid, Medical");
    assert_eq!(ranked[1].match_score, 0);
}

#[test]
fn skill_tokens_match_as_substrings() {
    let matcher = VolunteerMatcher::default();
    let request = emergency("Clinic transfer", None);
    let paramedic = volunteer("Kiran", "Paramedical support", "Evenings");

    let signals = matcher.signals(&request, &healthcare(), &paramedic);
    assert_eq!(signals.skills, 10.0);
}

#[test]
fn proximity_decays_linearly_to_zero_at_one_degree() {
    let matcher = VolunteerMatcher::default();
    let mut request = emergency("Flooded basement", None);
    request.latitude = Some(28.6);
    request.longitude = Some(77.2);
    let required = RequiredSkills::for_category(None);

    let same_spot = located(volunteer("A", "", ""), 28.6, 77.2);
    let near = located(volunteer("B", "", ""), 28.6, 77.45);
    let far = located(volunteer("C", "", ""), 30.0, 77.2);

    assert_eq!(matcher.signals(&request, &required, &same_spot).match_score(), 10);
    let near_score = matcher.signals(&request, &required, &near).proximity;
    assert!((near_score - 7.5).abs() < 1e-9, "got {near_score}");
    assert_eq!(matcher.signals(&request, &required, &far).proximity, 0.0);
}

#[test]
fn proximity_needs_coordinates_on_both_sides() {
    let matcher = VolunteerMatcher::default();
    let request = emergency("Water shortage", None);
    let volunteer = located(volunteer("A", "", ""), 28.6, 77.2);

    let signals = matcher.signals(&request, &RequiredSkills::default(), &volunteer);
    assert_eq!(signals.proximity, 0.0);
}

#[test]
fn zero_coordinates_still_count_as_located() {
    let matcher = VolunteerMatcher::default();
    let mut request = emergency("Boat capsized", None);
    request.latitude = Some(0.0);
    request.longitude = Some(0.0);
    let volunteer = located(volunteer("A", "", ""), 0.0, 0.0);

    let signals = matcher.signals(&request, &RequiredSkills::default(), &volunteer);
    assert_eq!(signals.proximity, 10.0);
}

#[test]
fn flexible_availability_earns_a_bonus() {
    let matcher = VolunteerMatcher::default();
    let request = emergency("Deliver medicine", None);
    let flexible = volunteer("A", "", "FLEXIBLE hours");
    let weekends = volunteer("B", "", "Weekends");

    let ranked = matcher.rank(&request, &RequiredSkills::default(), &[weekends, flexible]);
    assert_eq!(ranked[0].volunteer.name, "A");
    assert_eq!(ranked[0].match_score, 5);
}

#[test]
fn scores_are_rounded_totals() {
    let matcher = VolunteerMatcher::default();
    let mut request = emergency("Bleeding", None);
    request.latitude = Some(10.0);
    request.longitude = Some(10.0);
    // 10 - 0.46 * 10 = 5.4, plus 10 for one skill and 5 for flexible.
    let candidate = located(volunteer("A", "first aid", "flexible"), 10.46, 10.0);

    let ranked = matcher.rank(&request, &healthcare(), &[candidate]);
    assert_eq!(ranked[0].match_score, 20);
}

#[test]
fn ties_keep_pool_order() {
    let matcher = VolunteerMatcher::default();
    let request = emergency("Groceries", None);
    let pool = vec![
        volunteer("First", "", ""),
        volunteer("Second", "", ""),
        volunteer("Third", "", ""),
    ];

    let names: Vec<String> = matcher
        .rank(&request, &RequiredSkills::default(), &pool)
        .into_iter()
        .map(|result| result.volunteer.name)
        .collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);
}

#[test]
fn inactive_and_busy_volunteers_are_skipped() {
    let matcher = VolunteerMatcher::default();
    let request = emergency("Ride to hospital", None);
    let mut busy = volunteer("Busy", "First Aid", "flexible");
    busy.status = VolunteerStatus::Busy;
    let mut inactive = volunteer("Inactive", "First Aid", "flexible");
    inactive.status = VolunteerStatus::Inactive;
    let active = volunteer("Active", "", "");

    let ranked = matcher.rank(&request, &healthcare(), &[busy, inactive, active]);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].volunteer.name, "Active");
}

#[test]
fn results_are_truncated_to_the_limit() {
    let request = emergency("Evacuation", None);
    let pool: Vec<_> = (0..15)
        .map(|index| volunteer(&format!("Volunteer {index}"), "", ""))
        .collect();

    let ranked = VolunteerMatcher::default().rank(&request, &RequiredSkills::default(), &pool);
    assert_eq!(ranked.len(), DEFAULT_MATCH_LIMIT);

    let ranked = VolunteerMatcher::with_limit(3).rank(&request, &RequiredSkills::default(), &pool);
    assert_eq!(ranked.len(), 3);
}

#[test]
fn truncation_keeps_the_strongest_candidates_from_the_back_of_the_pool() {
    let request = emergency("Cardiac arrest at the market", None);
    let mut pool: Vec<_> = (0..10)
        .map(|index| volunteer(&format!("Filler {index}"), "Cooking", "Weekends"))
        .collect();
    pool.push(volunteer("Flexible", "Cooking", "Flexible"));
    pool.push(volunteer("Nurse", "Medical", "Weekdays"));
    pool.push(volunteer("Medic", "Medical", "Flexible hours"));
    pool.push(volunteer("Doctor", "First Aid, Medical", "flexible"));

    let ranked = VolunteerMatcher::default().rank(&request, &healthcare(), &pool);
    assert_eq!(ranked.len(), DEFAULT_MATCH_LIMIT);

    let leaders: Vec<_> = ranked
        .iter()
        .take(4)
        .map(|result| (result.volunteer.name.as_str(), result.match_score))
        .collect();
    assert_eq!(
        leaders,
        vec![("Doctor", 25), ("Medic", 15), ("Nurse", 10), ("Flexible", 5)]
    );
    assert!(ranked
        .windows(2)
        .all(|pair| pair[0].match_score >= pair[1].match_score));

    let tail: Vec<_> = ranked[4..]
        .iter()
        .map(|result| result.volunteer.name.clone())
        .collect();
    let expected: Vec<_> = (0..6).map(|index| format!("Filler {index}")).collect();
    assert_eq!(tail, expected);
}

#[test]
fn empty_pool_yields_no_matches() {
    let request = emergency("Anything", None);
    assert!(VolunteerMatcher::default()
        .rank(&request, &healthcare(), &[])
        .is_empty());
}

#[test]
fn ranking_leaves_the_pool_untouched() {
    let request = emergency("Anything", None);
    let pool = vec![volunteer("B", "", ""), volunteer("A", "Medical", "flexible")];
    let snapshot = pool.clone();

    VolunteerMatcher::default().rank(&request, &healthcare(), &pool);
    assert_eq!(pool, snapshot);
}
