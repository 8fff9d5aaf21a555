pub mod commands;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

#[derive(Parser)]
#[command(name = "playlist-proxy")]
#[command(about = "A caching proxy for playlist extraction")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Bind address, overriding the configured host/port
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Resolve one playlist URL and print the result
    Fetch {
        /// Playlist URL
        url: String,

        /// Print numbered titles instead of JSON
        #[arg(short, long)]
        titles: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        // Initialize logging
        commands::init_logging(self.debug, self.verbose)?;

        match self.command {
            Commands::Serve { bind } => commands::serve(bind, self.config).await,
            Commands::Fetch { url, titles } => commands::fetch(url, titles, self.config).await,
            Commands::Completions { shell } => {
                commands::generate_completions(shell);
                Ok(())
            }
        }
    }
}
