//! Persistence of room configs and room states.
//!
//! The processing engine only talks to storage through the [`Persister`] trait.
//! Every method hands out or takes independent copies, and failures are logged by
//! the implementation instead of being returned: losing a write is not fatal.

mod disk;

use std::collections::HashMap;

use mockall::automock;

pub use crate::storage::disk::DiskPersister;
use crate::rooms::{RoomConfig, RoomState};

/// Storage backend for room configs and room states.
#[automock]
pub trait Persister {
    /// Writes the config of a single room.
    async fn save_room_config(&self, config: &RoomConfig);
    /// Writes every config of the map.
    async fn save_room_configs(&self, configs: &HashMap<String, RoomConfig>);
    /// Reads the config of a single room.
    async fn read_room_config(&self, room_id: &str) -> Option<RoomConfig>;
    /// Fills `configs` with every stored config. Unreadable records are skipped.
    async fn read_room_configs(&self, configs: &mut HashMap<String, RoomConfig>);
    /// Writes the state of a single room.
    async fn save_room_state(&self, room_id: &str, state: &RoomState);
    /// Writes every state of the map.
    async fn save_room_states(&self, states: &HashMap<String, RoomState>);
    /// Reads the state of a single room.
    async fn read_room_state(&self, room_id: &str) -> Option<RoomState>;
    /// Fills `states` with every stored state. Unreadable records are skipped.
    async fn read_room_states(&self, states: &mut HashMap<String, RoomState>);
}
