//! Matrix synchronization and event handling.
//!
//! [`MatrixSync::sync`]:
//! 1. performs an initial sync to catch up on invites received while offline
//! 2. registers the auto-join and message handlers
//! 3. enters the sync loop, persisting the sync token after every response

use std::sync::Arc;

use anyhow::Result;
use log::{error, info, warn};
use matrix_sdk::{
    Client, LoopCtrl, Room, RoomState,
    config::SyncSettings,
    ruma::{
        api::client::filter::FilterDefinition,
        events::room::{
            member::StrippedRoomMemberEvent,
            message::{MessageType, OriginalSyncRoomMessageEvent},
        },
    },
};
use tokio::time::{Duration, sleep};

use crate::{matrix::session::MatrixSession, poster::IncomingMessage};

pub struct MatrixSync {
    client: Client,
    session: MatrixSession,
}

impl MatrixSync {
    pub fn new(client: &Client, session: &MatrixSession) -> Self {
        MatrixSync {
            client: client.to_owned(),
            session: session.to_owned(),
        }
    }

    /// Syncs forever, handing every text message of a joined room to `on_message`.
    ///
    /// Messages sent before the start are not replayed.
    ///
    /// # Errors
    ///
    /// Returns an error when the sync loop fails. Failing to persist the sync token
    /// is only logged.
    pub async fn sync<F>(&self, on_message: F) -> Result<()>
    where
        F: Fn(IncomingMessage) + Send + Sync + 'static,
    {
        info!("start syncing");

        self.client.add_event_handler(auto_join_rooms);

        let filter = FilterDefinition::with_lazy_loading();
        let mut sync_settings = SyncSettings::default().filter(filter.into());
        if let Some(sync_token) = self.session.sync_token() {
            sync_settings = sync_settings.token(sync_token);
        }

        // Catch up without handling old messages
        let mut delay = 2;
        let next_batch = loop {
            match self.client.sync_once(sync_settings.clone()).await {
                Ok(response) => break response.next_batch,
                Err(e) => {
                    error!("initial sync failed ({e}), retrying in {delay}s");
                    sleep(Duration::from_secs(delay)).await;
                    delay = (delay * 2).min(300);
                }
            }
        };
        self.persist_sync_token(next_batch.clone()).await;
        sync_settings = sync_settings.token(next_batch);

        let on_message = Arc::new(on_message);
        self.client.add_event_handler({
            let on_message = Arc::clone(&on_message);
            move |event: OriginalSyncRoomMessageEvent, room: Room, client: Client| async move {
                on_room_message(event, room, client, on_message.as_ref())
            }
        });

        self.client
            .sync_with_result_callback(sync_settings, |sync_result| async move {
                let response = sync_result?;
                self.persist_sync_token(response.next_batch).await;
                Ok(LoopCtrl::Continue)
            })
            .await?;

        Ok(())
    }

    async fn persist_sync_token(&self, sync_token: String) {
        if let Err(e) = self.session.save_sync_token(sync_token).await {
            error!("failed to persist sync token: {e:#}");
        }
    }
}

/// Joins rooms the bot is invited to.
///
/// Joining right after the invite can fail on Synapse, see
/// <https://github.com/matrix-org/synapse/issues/4345>, so it is retried with
/// an increasing delay.
async fn auto_join_rooms(room_member: StrippedRoomMemberEvent, client: Client, room: Room) {
    let Some(user_id) = client.user_id() else {
        warn!("could not get user id from client");
        return;
    };
    if room_member.state_key != user_id {
        return;
    }

    tokio::spawn(async move {
        info!("auto joining room {}", room.room_id());
        let mut delay = 2;

        while let Err(err) = room.join().await {
            error!(
                "failed to join room {} ({err:?}), retrying in {delay}s",
                room.room_id()
            );

            sleep(Duration::from_secs(delay)).await;
            delay *= 2;

            if delay > 3600 {
                error!("can't join room {} ({err:?})", room.room_id());
                return;
            }
        }
        info!("successfully joined room {}", room.room_id());
    });
}

/// Forwards text messages of other users in joined rooms.
fn on_room_message<F>(event: OriginalSyncRoomMessageEvent, room: Room, client: Client, on_message: &F)
where
    F: Fn(IncomingMessage),
{
    if room.state() != RoomState::Joined {
        return;
    }
    if client.user_id().is_some_and(|own_id| event.sender == own_id) {
        return;
    }
    let MessageType::Text(text_content) = event.content.msgtype else {
        return;
    };

    on_message(IncomingMessage {
        room_id: room.room_id().to_string(),
        sender: event.sender.to_string(),
        body: text_content.body,
    });
}
