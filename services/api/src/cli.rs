use crate::commands::{run_classify, run_init_db, run_match, ClassifyArgs, InitDbArgs, MatchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use community_relief::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "community-relief",
    about = "Community resource directory and emergency request coordination",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Create the database schema and optionally load the sample directory
    InitDb(InitDbArgs),
    /// Print the priority the triage rules assign to a description
    Classify(ClassifyArgs),
    /// Rank active volunteers for a stored emergency request
    Match(MatchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the SQLite database path
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::InitDb(args) => run_init_db(args),
        Command::Classify(args) => run_classify(args),
        Command::Match(args) => run_match(args),
    }
}
