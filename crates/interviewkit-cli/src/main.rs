//! interviewkit CLI: the command-line interview coach.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use interviewkit_core::model::{Level, Role};

mod commands;

#[derive(Parser)]
#[command(name = "interviewkit", version, about = "Voice-driven mock technical interview coach")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a mock interview in the terminal
    Run {
        /// Role: frontend, backend, fullstack, data, ml
        #[arg(long)]
        role: Role,

        /// Level: entry, mid, senior
        #[arg(long)]
        level: Level,

        /// Planned interview length in minutes
        #[arg(long, default_value = "30")]
        duration: u32,

        /// Question bank file or directory (default: built-in questions)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Disable spoken narration
        #[arg(long)]
        no_voice: bool,
    },

    /// Score a single answer without running an interview
    Score {
        /// Role the question belongs to
        #[arg(long)]
        role: Role,

        /// Question ID (e.g. "fe-3")
        #[arg(long)]
        question: String,

        /// The answer text
        #[arg(long)]
        answer: String,

        /// Question bank file or directory (default: built-in questions)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Print the full breakdown as JSON
        #[arg(long)]
        json: bool,
    },

    /// List questions in a bank
    Questions {
        /// Only show questions for this role
        #[arg(long)]
        role: Option<Role>,

        /// Question bank file or directory (default: built-in questions)
        #[arg(long)]
        bank: Option<PathBuf>,
    },

    /// Validate question bank TOML files
    Validate {
        /// Path to bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// Show or reset today's interview count
    Usage {
        /// Forget all recorded interviews
        #[arg(long)]
        reset: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example question bank
    Init,
}

#[tokio::main]
async fn main() {
    let directive = match "interviewkit=info".parse() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: invalid log directive: {e}");
            process::exit(1);
        }
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            role,
            level,
            duration,
            bank,
            config,
            no_voice,
        } => commands::run::execute(role, level, duration, bank, config, no_voice).await,
        Commands::Score {
            role,
            question,
            answer,
            bank,
            json,
        } => commands::score::execute(role, question, answer, bank, json),
        Commands::Questions { role, bank } => commands::questions::execute(role, bank),
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Usage { reset, config } => commands::usage::execute(reset, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
