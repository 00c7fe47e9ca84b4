//! Plushy: inventory catalog for a bean-bag-chair shop.
//!
//! Four record kinds live in one SQLite database: bags, and the categories,
//! fabrics and colors each bag references. A small server-rendered admin site
//! under `/inventory` lists, shows, creates, updates and deletes them.
//!
//! # Architecture
//!
//! - All store access routes through [`core::broker::DbBroker`]: reads on
//!   fresh WAL connections, writes serialized per database and recorded in
//!   `inventory.events.jsonl`.
//! - [`inventory`] holds the per-kind handlers. They are synchronous, take a
//!   [`core::store::Store`], and return plain data or an outcome enum.
//! - [`http`] maps the handlers onto axum routes and renders HTML.
//!
//! # Examples
//!
//! ```bash
//! # Create the data directory and schema
//! plushy init
//!
//! # Load the sample catalog
//! plushy seed
//!
//! # Serve the admin site
//! plushy serve --bind 127.0.0.1:3000
//! ```

pub mod core;
pub mod http;
pub mod inventory;

use crate::core::config::{self, Config};
use crate::core::store::Store;
use crate::core::{db, error, time};
use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(
    name = "plushy",
    version = env!("CARGO_PKG_VERSION"),
    about = "Bean bag chair inventory"
)]
struct Cli {
    /// Path to a plushy.toml. Defaults to ./plushy.toml when present.
    #[clap(long, global = true)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Default)]
struct StoreArgs {
    /// Data directory holding inventory.db.
    #[clap(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the inventory admin site.
    Serve {
        /// Listen address, e.g. 127.0.0.1:3000.
        #[clap(long)]
        bind: Option<String>,
        #[clap(flatten)]
        store: StoreArgs,
    },
    /// Create the data directory and schema.
    Init {
        #[clap(flatten)]
        store: StoreArgs,
    },
    /// Load the embedded sample catalog into an empty store.
    Seed {
        #[clap(flatten)]
        store: StoreArgs,
    },
    /// Print record counts as JSON.
    Summary {
        #[clap(flatten)]
        store: StoreArgs,
    },
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn resolve_store(config: &Config, args: &StoreArgs) -> Store {
    Store::new(
        args.data_dir
            .clone()
            .unwrap_or_else(|| config.store.data_dir.clone()),
    )
}

fn open_store(config: &Config, args: &StoreArgs) -> Result<Store, error::PlushyError> {
    let store = resolve_store(config, args);
    db::initialize_inventory_db(&store)?;
    Ok(store)
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;
    init_tracing(&config);

    match cli.command {
        Command::Serve { bind, store } => {
            let store = open_store(&config, &store)?;
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            serve(store, &bind).await
        }
        Command::Init { store } => {
            let store = open_store(&config, &store)?;
            println!(
                "{} inventory store ready at {}",
                "●".bright_green(),
                store.root().display().to_string().bold()
            );
            Ok(())
        }
        Command::Seed { store } => {
            let store = open_store(&config, &store)?;
            let catalog = inventory::seed::load_seed_catalog()?;
            let report = tokio::task::spawn_blocking(move || {
                inventory::seed::seed_catalog(&store, &catalog)
            })
            .await
            .context("seed worker failed")??;
            println!(
                "{} seeded {} colors, {} fabrics, {} categories, {} bags",
                "●".bright_green(),
                report.colors,
                report.fabrics,
                report.categories,
                report.bags
            );
            Ok(())
        }
        Command::Summary { store } => {
            let store = open_store(&config, &store)?;
            let summary = tokio::task::spawn_blocking(move || inventory::summary(&store))
                .await
                .context("summary worker failed")??;
            let envelope = time::command_envelope(
                "summary",
                "ok",
                serde_json::to_value(summary).context("serialize summary")?,
            );
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            Ok(())
        }
    }
}

async fn serve(store: Store, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, data_dir = %store.root().display(), "plushy listening");
    println!(
        "{} serving inventory on {}",
        "●".bright_green(),
        format!("http://{local}{}", inventory::BASE_PATH).bold()
    );

    let app = http::build_router(http::AppState::new(store));
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("server failed")?;
    tracing::info!("plushy stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
