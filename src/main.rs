//! docshelf - PDF document storage and metadata API server.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docshelf::config::Settings;
use docshelf::server;

#[derive(Parser)]
#[command(name = "docshelf", version, about = "PDF document storage and metadata API")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, env = "DOCSHELF_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server.
    Serve {
        /// Address to bind to.
        #[arg(long, env = "DOCSHELF_HOST")]
        host: Option<String>,
        /// Port to bind to.
        #[arg(long, env = "DOCSHELF_PORT")]
        port: Option<u16>,
        /// Root directory for the database and blob objects.
        #[arg(long, env = "DOCSHELF_DATA_DIR")]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docshelf=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve {
            host,
            port,
            data_dir,
        } => {
            let mut settings = Settings::load(cli.config.as_deref())?;
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            if let Some(data_dir) = data_dir {
                settings.data_dir = data_dir;
            }
            server::serve(&settings).await
        }
    }
}
