//! uigen - drive the anonymous work handoff from a terminal
//!
//! Stashes pre-authentication work into a local data directory, then signs in
//! or up and prints where the session lands.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use uigen_session::AuthMethod;

mod commands;

/// uigen - UIGen session handoff
#[derive(Parser, Debug)]
#[command(name = "uigen")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding accounts, projects and the anonymous work cache
    #[arg(long, default_value = ".uigen")]
    data_dir: PathBuf,

    /// Path to session configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Save anonymous work, replacing any previous stash
    Stash {
        /// User message, repeat for a transcript
        #[arg(short, long = "message")]
        messages: Vec<String>,

        /// Generated file as `path=content`
        #[arg(short, long = "file")]
        files: Vec<String>,
    },

    /// Sign in with an existing account
    Signin {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },

    /// Create an account and sign in
    Signup {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },

    /// List projects, most recent first
    #[command(alias = "ls")]
    Projects {
        /// Only projects created by this account
        #[arg(long)]
        owner: Option<String>,
    },

    /// Show the activity line for a tool call
    Tool {
        /// Tool name
        name: String,

        /// Tool arguments as JSON
        #[arg(long)]
        args: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Stash { messages, files } => commands::stash(&cli.data_dir, &messages, &files),
        Commands::Signin { email, password } => {
            commands::authenticate(
                &cli.data_dir,
                cli.config.as_deref(),
                AuthMethod::SignIn,
                &email,
                &password,
            )
            .await
        }
        Commands::Signup { email, password } => {
            commands::authenticate(
                &cli.data_dir,
                cli.config.as_deref(),
                AuthMethod::SignUp,
                &email,
                &password,
            )
            .await
        }
        Commands::Projects { owner } => commands::projects(&cli.data_dir, owner.as_deref()).await,
        Commands::Tool { name, args } => commands::tool(&name, args.as_deref()),
    }
}
