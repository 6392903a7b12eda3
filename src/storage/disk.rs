//! JSON file storage for room records.
//!
//! Records live under the data directory, one file per room:
//!
//! ```text
//! <base>/roomconfig/<homeserver>/<room>.json
//! <base>/roomstate/<homeserver>/<room>.json
//! ```
//!
//! The room `!abcdef:example.com` is stored as `example.com/abcdef.json`. Files are
//! written to a temporary name and renamed, so a crash never leaves half a record.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use futures::future::join_all;
use log::{debug, error, info, warn};
use serde::{Serialize, de::DeserializeOwned};
use tokio::fs;

use crate::{
    rooms::{RoomConfig, RoomState},
    storage::Persister,
};

const ROOM_CONFIG_STORE: &str = "roomconfig";
const ROOM_STATE_STORE: &str = "roomstate";
const RECORD_EXTENSION: &str = "json";

/// [`Persister`] writing one JSON file per room.
#[derive(Debug, Clone)]
pub struct DiskPersister {
    base: PathBuf,
}

impl DiskPersister {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        DiskPersister { base: base.into() }
    }

    async fn save_record<T: Serialize>(&self, store: &str, room_id: &str, record: &T) {
        let Some(path) = record_path(&self.base, store, room_id) else {
            warn!("not saving {store} of malformed room id {room_id}");
            return;
        };

        let data = match serde_json::to_string(record) {
            Ok(data) => data,
            Err(e) => {
                error!("failed to serialize {store} of {room_id}: {e}");
                return;
            }
        };

        if let Err(e) = write_atomic(&path, data.as_bytes()).await {
            error!("failed to write {store} of {room_id}: {e}");
            return;
        }

        debug!("saved {store} of {room_id}");
    }

    async fn read_record<T: DeserializeOwned>(&self, store: &str, room_id: &str) -> Option<T> {
        let path = record_path(&self.base, store, room_id)?;
        let data = fs::read_to_string(&path).await.ok()?;

        match serde_json::from_str(&data) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("dropping malformed {store} of {room_id}: {e}");
                None
            }
        }
    }

    async fn read_records<T: DeserializeOwned>(&self, store: &str) -> Vec<(String, T)> {
        let mut records = Vec::new();

        let store_path = self.base.join(store);
        let Ok(mut servers) = fs::read_dir(&store_path).await else {
            info!("no {store} records found in {}", store_path.display());
            return records;
        };

        while let Ok(Some(server)) = servers.next_entry().await {
            let server_path = server.path();
            let Some(homeserver) = file_name(&server_path) else {
                continue;
            };
            let Ok(mut rooms) = fs::read_dir(&server_path).await else {
                continue;
            };

            while let Ok(Some(room)) = rooms.next_entry().await {
                let room_path = room.path();
                if room_path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                    continue;
                }
                let Some(localpart) = room_path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let room_id = format!("!{localpart}:{homeserver}");

                let data = match fs::read_to_string(&room_path).await {
                    Ok(data) => data,
                    Err(e) => {
                        warn!("failed to read {}: {e}", room_path.display());
                        continue;
                    }
                };
                match serde_json::from_str(&data) {
                    Ok(record) => records.push((room_id, record)),
                    Err(e) => warn!("dropping malformed {store} of {room_id}: {e}"),
                }
            }
        }

        records
    }
}

impl Persister for DiskPersister {
    async fn save_room_config(&self, config: &RoomConfig) {
        self.save_record(ROOM_CONFIG_STORE, &config.room_id, config)
            .await;
    }

    async fn save_room_configs(&self, configs: &HashMap<String, RoomConfig>) {
        info!("saving {} room configs", configs.len());
        join_all(configs.values().map(|config| self.save_room_config(config))).await;
    }

    async fn read_room_config(&self, room_id: &str) -> Option<RoomConfig> {
        self.read_record(ROOM_CONFIG_STORE, room_id).await
    }

    async fn read_room_configs(&self, configs: &mut HashMap<String, RoomConfig>) {
        let mut read = 0;
        for (room_id, config) in self.read_records::<RoomConfig>(ROOM_CONFIG_STORE).await {
            if config.room_id != room_id {
                warn!(
                    "dropping roomconfig stored as {room_id} for room {}",
                    config.room_id
                );
                continue;
            }
            configs.insert(room_id, config);
            read += 1;
        }
        info!("read {read} room configs");
    }

    async fn save_room_state(&self, room_id: &str, state: &RoomState) {
        self.save_record(ROOM_STATE_STORE, room_id, state).await;
    }

    async fn save_room_states(&self, states: &HashMap<String, RoomState>) {
        info!("saving {} room states", states.len());
        join_all(
            states
                .iter()
                .map(|(room_id, state)| self.save_room_state(room_id, state)),
        )
        .await;
    }

    async fn read_room_state(&self, room_id: &str) -> Option<RoomState> {
        self.read_record(ROOM_STATE_STORE, room_id).await
    }

    async fn read_room_states(&self, states: &mut HashMap<String, RoomState>) {
        let records = self.read_records::<RoomState>(ROOM_STATE_STORE).await;
        info!("read {} room states", records.len());
        states.extend(records);
    }
}

/// Maps `!room:homeserver` to `<base>/<store>/<homeserver>/<room>.json`.
///
/// Returns `None` for room ids that aren't of that shape or that would escape
/// the store directory.
fn record_path(base: &Path, store: &str, room_id: &str) -> Option<PathBuf> {
    let (localpart, homeserver) = room_id.strip_prefix('!')?.split_once(':')?;
    if !is_safe_component(localpart) || !is_safe_component(homeserver) {
        return None;
    }

    Some(
        base.join(store)
            .join(homeserver)
            .join(format!("{localpart}.{RECORD_EXTENSION}")),
    )
}

fn is_safe_component(part: &str) -> bool {
    !part.is_empty() && !part.starts_with('.') && !part.contains(['/', '\\'])
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

async fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data).await?;
    fs::rename(&tmp_path, path).await
}
