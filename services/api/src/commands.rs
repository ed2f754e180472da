use clap::Args;
use community_relief::config::AppConfig;
use community_relief::coordination::triage::{self, TriageRule};
use community_relief::coordination::{CoordinationService, MatchReport, RequestId, VolunteerMatcher};
use community_relief::error::AppError;
use community_relief::events::EventHub;
use community_relief::storage::{load_sample_directory, seed_default_categories};
use std::path::PathBuf;
use std::sync::Arc;

use crate::infra::open_store;

#[derive(Args, Debug)]
pub(crate) struct InitDbArgs {
    /// SQLite database path (defaults to DATABASE_PATH)
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
    /// Also load the sample resources and volunteers
    #[arg(long)]
    pub(crate) sample: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Free-text request description
    #[arg(long)]
    pub(crate) description: String,
    /// Category name the request was filed under
    #[arg(long)]
    pub(crate) category: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// Emergency request identifier
    #[arg(long)]
    pub(crate) request: String,
    /// SQLite database path (defaults to DATABASE_PATH)
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
    /// Maximum number of volunteers to list
    #[arg(long, default_value_t = community_relief::coordination::DEFAULT_MATCH_LIMIT)]
    pub(crate) limit: usize,
}

pub(crate) fn run_init_db(args: InitDbArgs) -> Result<(), AppError> {
    let path = database_path(args.database)?;
    let store = open_store(&path)?;

    let seeded = seed_default_categories(store.as_ref())?;
    println!("Database ready at {}", path.display());
    println!("- default categories written: {seeded}");

    if args.sample {
        let summary = load_sample_directory(store.as_ref())?;
        println!(
            "- sample data: {} categories, {} resources, {} volunteers",
            summary.categories, summary.resources, summary.volunteers
        );
    }

    Ok(())
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let rule = triage::triage(&args.description, args.category.as_deref());
    println!("Priority: {}", rule.priority());
    println!("Reason: {}", describe_rule(rule));
    Ok(())
}

pub(crate) fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let path = database_path(args.database)?;
    let store = open_store(&path)?;
    let service = CoordinationService::with_matcher(
        store,
        Arc::new(EventHub::new()),
        VolunteerMatcher::with_limit(args.limit),
    );

    let report = service.match_volunteers(&RequestId(args.request))?;
    render_match_report(&report);
    Ok(())
}

fn database_path(explicit: Option<PathBuf>) -> Result<PathBuf, AppError> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(AppConfig::load()?.database.path),
    }
}

fn describe_rule(rule: TriageRule) -> String {
    match rule {
        TriageRule::HighKeyword(keyword) => format!("description mentions '{keyword}'"),
        TriageRule::EmergencyCategory => "filed under an emergency category".to_string(),
        TriageRule::LowKeyword(keyword) => format!("informational keyword '{keyword}'"),
        TriageRule::Default => "no rule matched".to_string(),
    }
}

fn render_match_report(report: &MatchReport) {
    let info = &report.request_info;
    println!("Request {} [{}]", info.id, info.priority);
    println!("{}", info.description);
    println!("Required skills: {}", info.required_skills);

    if report.matches.is_empty() {
        println!("\nNo active volunteers available");
        return;
    }

    println!("\nRanked volunteers");
    for (position, candidate) in report.matches.iter().enumerate() {
        let volunteer = &candidate.volunteer;
        println!(
            "{:>2}. {} <{}> score {} | skills: {} | {}",
            position + 1,
            volunteer.name,
            volunteer.email,
            candidate.match_score,
            volunteer.skills,
            volunteer.availability,
        );
    }
}
