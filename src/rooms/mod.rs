//! Room subscriptions and announcement bookkeeping.
//!
//! - [`room_config`]: what a room wants to hear about, and how it is edited
//! - [`room_state`]: what was already announced in a room
//! - [`filter`]: the species and area predicate routing events to rooms

pub mod filter;
pub mod room_config;
pub mod room_state;

pub use crate::rooms::{
    filter::{EventKind, PokemonFilter, find_match},
    room_config::{FilterChange, RoomConfig, RoomConfigChange, RoomConfigError, RoomConfigs},
    room_state::RoomState,
};
