//! nutshell: web front-end for node snapshot logs and customers.
//!
//! The binary is a thin shell over three crates:
//!
//! ```text
//! nutshell-core   entities, query bounds, mapper, form normalizer, config
//! nutshell-store  in-memory and CouchDB document stores, fixture seeding
//! nutshell-web    axum router, handlers, templates
//! ```
//!
//! This crate owns the command line and wires the pieces together: load the
//! config, open the store, optionally seed it, then serve.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use nutshell_core::config::Config;
use nutshell_core::SharedStore;
use nutshell_web::AppState;
use tokio::net::TcpListener;

#[derive(Debug, Parser)]
#[command(name = "nutshell", about = "Browse node snapshot logs and customers")]
pub struct Cli {
    /// Config file (defaults to ~/.config/nutshell/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server (the default).
    Serve {
        /// Port to listen on, overriding `[server] port`.
        #[arg(long)]
        port: Option<u16>,
        /// Fixture file loaded before serving, overriding `[store] seed`.
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// Load a fixture file into the configured store and exit.
    Seed {
        file: PathBuf,
    },
}

/// Run the parsed command line to completion.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("loading config")?;

    match cli.command.unwrap_or(Command::Serve { port: None, seed: None }) {
        Command::Serve { port, seed } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let seed = seed.or_else(|| config.store.seed_path().map(PathBuf::from));

            let store = open_store(&config).await?;
            if let Some(path) = seed {
                seed_store(&store, path).await?;
            }

            let state = AppState::new(store, config.pages.entries_per_page)
                .context("compiling templates")?;
            let addr = config.server.bind_addr();
            let listener = TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding {addr}"))?;
            nutshell_web::serve(listener, state).await?;
        }
        Command::Seed { file } => {
            let store = open_store(&config).await?;
            let count = seed_store(&store, file).await?;
            println!("seeded {count} documents");
        }
    }

    Ok(())
}

async fn open_store(config: &Config) -> anyhow::Result<SharedStore> {
    nutshell_store::open(&config.store)
        .await
        .context("opening document store")
}

async fn seed_store(store: &SharedStore, path: PathBuf) -> anyhow::Result<usize> {
    nutshell_store::seed::seed_from_file(store.as_ref(), &path)
        .await
        .with_context(|| format!("seeding from {}", path.display()))
}
