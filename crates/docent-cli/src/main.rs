mod commands;
mod document;
mod input;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docent::client::DEFAULT_RELAY_URL;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the text extracted from a PDF
    Extract {
        /// Path to the PDF
        path: PathBuf,
    },

    /// Chat about a PDF, or the last one used when no path is given
    Chat {
        /// Path to the PDF
        path: Option<PathBuf>,

        /// Address of the relay server
        #[arg(long, env = "DOCENT_SERVER_URL", default_value = DEFAULT_RELAY_URL)]
        server: String,
    },

    /// Translate a PDF's text into another language
    Translate {
        /// Target language, e.g. "French"
        language: String,

        /// Path to the PDF; the stored document is used when omitted
        path: Option<PathBuf>,

        /// Address of the relay server
        #[arg(long, env = "DOCENT_SERVER_URL", default_value = DEFAULT_RELAY_URL)]
        server: String,
    },

    /// Forget the stored document
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Quiet unless RUST_LOG asks otherwise, the terminal belongs to the chat
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Extract { path } => commands::extract::execute(&path),
        Command::Chat { path, server } => commands::chat::execute(path.as_deref(), &server).await,
        Command::Translate {
            language,
            path,
            server,
        } => commands::translate::execute(&language, path.as_deref(), &server).await,
        Command::Clear => commands::clear::execute(),
    }
}
