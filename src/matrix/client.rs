//! Matrix client wrapper.
//!
//! [`MatrixClient`] logs the bot in, runs the sync loop and implements
//! [`Chatter`] for the poster.

use anyhow::Context;
use log::{error, info, warn};
use matrix_sdk::{
    Client,
    ruma::{OwnedUserId, RoomId, events::room::message::RoomMessageEventContent},
};

use crate::{
    matrix::{UserCredentials, session::MatrixSession, sync::MatrixSync},
    poster::{Chatter, IncomingMessage},
};

const DISPLAY_NAME: &str = "spawnscope";

/// High-level Matrix client for bot messaging operations.
#[derive(Clone)]
pub struct MatrixClient {
    client: Client,
    session: MatrixSession,
}

impl MatrixClient {
    /// Logs in, or restores the session of a previous run from `session_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the session directory is not usable
    /// - the user id is malformed
    /// - the login or the session restore fails
    pub async fn new(
        user_credentials: &UserCredentials,
        session_path: &str,
    ) -> anyhow::Result<Self> {
        info!(
            "setting up matrix client for user {}",
            user_credentials.user_id
        );
        let session = MatrixSession::load(session_path).await?;

        let client = match session.user_session() {
            Some(user_session) => {
                info!("restoring matrix session from disk");
                let client = build_client(user_credentials, &session).await?;
                client
                    .restore_session(user_session.clone())
                    .await
                    .context("failed to restore matrix session")?;
                client
            }
            None => login(user_credentials, &session).await?,
        };

        if let Err(e) = client.account().set_display_name(Some(DISPLAY_NAME)).await {
            warn!("failed to set display name: {e:?}");
        }

        info!("matrix client ready");
        Ok(MatrixClient { client, session })
    }

    /// Runs the sync loop, forwarding text messages to `on_message`.
    pub async fn sync<F>(&self, on_message: F) -> anyhow::Result<()>
    where
        F: Fn(IncomingMessage) + Send + Sync + 'static,
    {
        let result = MatrixSync::new(&self.client, &self.session)
            .sync(on_message)
            .await;
        match &result {
            Ok(()) => info!("matrix sync ended successfully"),
            Err(e) => error!("matrix sync ended with error: {e:?}"),
        }
        result
    }

    async fn send(&self, room_id: &str, content: RoomMessageEventContent) {
        let room_id = match RoomId::parse(room_id) {
            Ok(room_id) => room_id,
            Err(e) => {
                error!("invalid room id {room_id}: {e}");
                return;
            }
        };

        match self.client.get_room(&room_id) {
            Some(room) => {
                if let Err(e) = room.send(content).await {
                    error!("failed to send message to {room_id}: {e:?}");
                }
            }
            None => warn!("not in room {room_id}, message dropped"),
        }
    }
}

impl Chatter for MatrixClient {
    async fn send_text(&self, room_id: &str, text: &str) {
        self.send(room_id, RoomMessageEventContent::text_plain(text))
            .await;
    }

    async fn send_formatted_text(&self, room_id: &str, text: &str, html: &str) {
        self.send(room_id, RoomMessageEventContent::text_html(text, html))
            .await;
    }
}

async fn build_client(
    user_credentials: &UserCredentials,
    session: &MatrixSession,
) -> anyhow::Result<Client> {
    let user_id: OwnedUserId = user_credentials
        .user_id
        .clone()
        .try_into()
        .with_context(|| format!("invalid matrix user id {}", user_credentials.user_id))?;

    let builder = Client::builder().sqlite_store(session.sqlite_path(), None);
    let builder = match &user_credentials.homeserver {
        Some(homeserver) => builder.homeserver_url(homeserver),
        None => builder.server_name(user_id.server_name()),
    };

    Ok(builder.build().await?)
}

async fn login(
    user_credentials: &UserCredentials,
    session: &MatrixSession,
) -> anyhow::Result<Client> {
    let client = build_client(user_credentials, session).await?;

    client
        .matrix_auth()
        .login_username(&user_credentials.user_id, &user_credentials.password)
        .initial_device_display_name("spawnscope bot")
        .send()
        .await
        .context("matrix login failed")?;

    let user_session = client
        .matrix_auth()
        .session()
        .context("no session after matrix login")?;
    session.save_user_session(&user_session).await?;

    info!("logged in as {}", user_credentials.user_id);
    Ok(client)
}
