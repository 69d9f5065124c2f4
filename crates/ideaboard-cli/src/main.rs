mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{idea::IdeaSubcommand, notify::NotifySubcommand, sprint::SprintSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ideaboard",
    about = "File-backed kanban board for ideas, sprints, and notifications",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data root (default: ~/.ideaboard)
    #[arg(long, global = true, env = "IDEABOARD_DATA")]
    data_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the board server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "3456")]
        port: u16,

        /// Open the board in a browser after startup
        #[arg(long)]
        open: bool,
    },

    /// Show the kanban board projection
    Board {
        /// Case-insensitive text filter on name, id, and description
        #[arg(long)]
        search: Option<String>,

        /// Exact priority filter: Low, Medium, High
        #[arg(long)]
        priority: Option<String>,

        /// Sprint filter: a sprint id, or "backlog" for unassigned ideas
        #[arg(long)]
        sprint: Option<String>,
    },

    /// Manage ideas
    Idea {
        #[command(subcommand)]
        subcommand: IdeaSubcommand,
    },

    /// Manage sprints
    Sprint {
        #[command(subcommand)]
        subcommand: SprintSubcommand,
    },

    /// Manage the notification log
    Notify {
        #[command(subcommand)]
        subcommand: NotifySubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = resolve_root(cli.data_dir).and_then(|root| match cli.command {
        Commands::Serve { port, open } => cmd::serve::run(&root, port, open),
        Commands::Board {
            search,
            priority,
            sprint,
        } => cmd::board::run(
            &root,
            search.as_deref(),
            priority.as_deref(),
            sprint.as_deref(),
            cli.json,
        ),
        Commands::Idea { subcommand } => cmd::idea::run(&root, subcommand, cli.json),
        Commands::Sprint { subcommand } => cmd::sprint::run(&root, subcommand, cli.json),
        Commands::Notify { subcommand } => cmd::notify::run(&root, subcommand, cli.json),
    });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn resolve_root(flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match flag {
        Some(path) => Ok(path),
        None => Ok(ideaboard_core::paths::default_root()?),
    }
}
