//! quizforge CLI for validating quiz drafts and grading submissions.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(
    name = "quizforge",
    version,
    about = "Quiz authoring validator and grading engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate quiz TOML files against an author's subscription tier
    Validate {
        /// Path to a quiz file or directory
        #[arg(long)]
        quiz: PathBuf,

        /// Author tier: free, pro, premium, admin
        #[arg(long)]
        tier: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a single submission against a quiz
    Evaluate {
        /// Quiz file
        #[arg(long)]
        quiz: PathBuf,

        /// Submission file
        #[arg(long)]
        submission: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Grade many submissions and write a report
    Grade {
        /// Quiz file or directory of published quizzes
        #[arg(long)]
        quizzes: PathBuf,

        /// Submission file or directory
        #[arg(long)]
        submissions: PathBuf,

        /// Max concurrent gradings
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, markdown, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show what each subscription tier may author
    Capabilities {
        /// Show a single tier
        #[arg(long)]
        tier: Option<String>,
    },

    /// Create a starter config, quiz, and submission
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizforge=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { quiz, tier, config } => commands::validate::execute(quiz, tier, config),
        Commands::Evaluate {
            quiz,
            submission,
            format,
        } => commands::evaluate::execute(quiz, submission, format),
        Commands::Grade {
            quizzes,
            submissions,
            parallelism,
            output,
            format,
            config,
        } => commands::grade::execute(quizzes, submissions, parallelism, output, format, config).await,
        Commands::Capabilities { tier } => commands::capabilities::execute(tier),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
