//! HTTP endpoint receiving the scanner feed.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /` | Banner |
//! | `POST /webhook/mad` | MAD webhook, forwards gyms, spawns and raids to the poster |

mod mad;

use std::future::Future;

use anyhow::Context;
use axum::{Router, extract::State, http::StatusCode, routing::get, routing::post};
use log::{info, warn};
use tokio::net::TcpListener;

use crate::{
    poster::PosterHandle,
    webhook::mad::{Envelope, FeedEvent, decode_envelope},
};

/// Binds the webhook listener.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn bind(address: &str) -> anyhow::Result<TcpListener> {
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to bind webhook to {address}"))?;
    info!("webhook listening on {}", address);
    Ok(listener)
}

/// Serves the webhook until `shutdown` completes.
///
/// # Errors
///
/// Returns an error if the server fails.
pub async fn serve(
    listener: TcpListener,
    handle: PosterHandle,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    axum::serve(listener, router(handle))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("webhook stopped");
    Ok(())
}

fn router(handle: PosterHandle) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/webhook/mad", post(mad_webhook))
        .with_state(handle)
}

async fn banner() -> &'static str {
    "This is spawnscope.\n"
}

async fn mad_webhook(State(handle): State<PosterHandle>, body: String) -> (StatusCode, &'static str) {
    let envelopes: Vec<Envelope> = match serde_json::from_str(&body) {
        Ok(envelopes) => envelopes,
        Err(e) => {
            warn!("can't decode webhook request: {e}");
            return (StatusCode::BAD_REQUEST, "FAIL\n");
        }
    };

    for envelope in envelopes {
        let forwarded = match decode_envelope(envelope) {
            Some(FeedEvent::Gym(gym)) => handle.gyms.send(gym).await.is_ok(),
            Some(FeedEvent::Spawn(spawn)) => handle.spawns.send(spawn).await.is_ok(),
            Some(FeedEvent::Raid(raid)) => handle.raids.send(raid).await.is_ok(),
            None => true,
        };
        if !forwarded {
            warn!("poster stopped, dropping webhook data");
            break;
        }
    }

    (StatusCode::OK, "OK\n")
}
