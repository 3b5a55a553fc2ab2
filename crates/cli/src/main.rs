//! portcall CLI — the main entry point.
//!
//! Commands:
//! - `serve`  — Start the HTTP gateway
//! - `ask`    — Send a single message to the assistant
//! - `doctor` — Diagnose provider and backend connectivity

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "portcall",
    about = "portcall — conversational assistant for a port booking system",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send a single message to the assistant and print the reply
    Ask {
        /// The message to send
        message: String,

        /// User id to act as (defaults to the configured identity)
        #[arg(short, long)]
        user: Option<String>,

        /// Chat id whose history should be included
        #[arg(short, long)]
        chat: Option<String>,
    },

    /// Diagnose provider and backend connectivity
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask {
            message,
            user,
            chat,
        } => commands::ask::run(message, user, chat).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
