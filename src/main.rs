//! spawnscope - A Matrix bot announcing Pokemon GO spawns and raids.
//!
//! A MAD scanner posts gyms, spawns and raids to the webhook. Every Matrix room
//! subscribes to them with filters, managed with chat commands whose first word is
//! the command keyword (`filter add spawn 52.52 13.40 500`), and each matching spawn
//! or raid is announced once in the room.
//!
//! # Usage
//!
//! ```bash
//! spawnscope --config config.yaml --data ./spawnscope-data
//! ```
//!
//! See [`config`] for the configuration file. `RUST_LOG` controls the log level
//! (default: `info`).
//!
//! # Architecture
//!
//! - [`poster`] - the engine, owner of all room configs and room states
//! - [`webhook`] - HTTP endpoint feeding the engine
//! - [`matrix`] - Matrix client forwarding chat messages to the engine
//! - [`commands`] - chat command parsing and execution
//! - [`rooms`] - room configs, filters and room states
//! - [`storage`] - persistence of the room configs and states
//! - [`pogo`] - game data, pokedex and fort directory
//!
//! # Stopping
//!
//! A first Ctrl-C saves the room states and stops. A second one quits immediately.

use std::sync::Arc;

use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};
use tokio::sync::watch;

use crate::{
    config::Config,
    matrix::MatrixClient,
    pogo::{GeoDex, Pokedex},
    poster::{IncomingMessage, Poster, PosterHandle, PosterSettings},
    storage::DiskPersister,
    utils::get_path,
};

mod commands;
mod config;
mod matrix;
mod pogo;
mod poster;
mod rooms;
mod storage;
mod utils;
mod webhook;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: String,

    /// Directory holding the Matrix session, room configs and room states
    #[arg(short, long)]
    data: String,
}

#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("starting spawnscope {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load config file: {e}");
            return;
        }
    };

    if let Err(e) = run(config, args).await {
        error!("{e:#}");
    }
}

async fn run(config: Config, args: Args) -> anyhow::Result<()> {
    let pokedex = load_pokedex(config.pokedex.as_deref()).await;
    let geodex = load_geodex(config.geodex.as_deref()).await;

    let matrix_client = MatrixClient::new(
        &config.user_credentials(),
        &get_path(&args.data, "session"),
    )
    .await?;
    let listener = webhook::bind(&config.webhook.bind).await?;

    let (handle, receivers) = poster::channel(config.poster.queue_size);
    let settings = PosterSettings {
        expiry_check_period: config.poster.expiry_check_period(),
        resume_state: config.poster.resume_state,
        admins: config.matrix.admins.clone(),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);

    let mut poster = Poster::new(
        matrix_client.clone(),
        DiskPersister::new(&args.data),
        settings,
    )
    .with_pokedex(pokedex)
    .with_geodex(geodex);
    poster.on_shutdown({
        let shutdown_tx = Arc::clone(&shutdown_tx);
        move || {
            shutdown_tx.send_replace(true);
        }
    });

    tokio::spawn(handle_ctrl_c(handle.clone()));

    let poster_task = async {
        poster.run(receivers).await;
        // A quit skips the shutdown callback
        shutdown_tx.send_replace(true);
    };
    let webhook_task = async {
        let shutdown = wait_shutdown(shutdown_rx.clone());
        if let Err(e) = webhook::serve(listener, handle.clone(), shutdown).await {
            error!("webhook failed: {e:#}");
            handle.stop().await;
        }
    };
    let matrix_task = async {
        let messages = handle.messages.clone();
        let on_message = move |message: IncomingMessage| {
            if let Err(e) = messages.try_send(message) {
                warn!("dropping chat message: {e}");
            }
        };
        tokio::select! {
            result = matrix_client.sync(on_message) => {
                if result.is_err() {
                    handle.stop().await;
                }
            }
            _ = wait_shutdown(shutdown_rx.clone()) => info!("matrix sync stopped"),
        }
    };

    tokio::join!(poster_task, webhook_task, matrix_task);

    info!("spawnscope stopped");
    Ok(())
}

/// First Ctrl-C stops gracefully, the second one quits.
async fn handle_ctrl_c(handle: PosterHandle) {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("can't listen for ctrl-c");
        return;
    }
    info!("ctrl-c received, stopping");
    handle.stop().await;

    if tokio::signal::ctrl_c().await.is_ok() {
        info!("ctrl-c received again, quitting");
        handle.quit().await;
    }
}

async fn wait_shutdown(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stopped| *stopped).await;
}

async fn load_pokedex(path: Option<&str>) -> Option<Pokedex> {
    let path = path?;
    match Pokedex::load(path).await {
        Ok(pokedex) => {
            info!("loaded {} pokemon from {}", pokedex.len(), path);
            Some(pokedex)
        }
        Err(e) => {
            error!("failed to load pokedex {path}: {e:#}");
            None
        }
    }
}

async fn load_geodex(path: Option<&str>) -> Option<GeoDex> {
    let path = path?;
    match GeoDex::load(path).await {
        Ok(geodex) => {
            info!("loaded {} forts from {}", geodex.len(), path);
            Some(geodex)
        }
        Err(e) => {
            error!("failed to load geodex {path}: {e:#}");
            None
        }
    }
}
