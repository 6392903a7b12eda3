//! Payloads posted by the MAD scanner.
//!
//! MAD posts a JSON array of envelopes. Each envelope names the message type and
//! carries the message itself:
//!
//! ```json
//! [{"type": "pokemon", "message": {"encounter_id": "123", "pokemon_id": 16, ...}}]
//! ```

use std::fmt;

use log::{debug, warn};
use serde::Deserialize;

use crate::pogo::{Gym, Location, Pokemon, Raid, Spawn};

#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: serde_json::Value,
}

/// Encounter ids arrive as JSON numbers or as strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EncounterId {
    Number(u64),
    Text(String),
}

impl fmt::Display for EncounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncounterId::Number(id) => write!(f, "{id}"),
            EncounterId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GymMessage {
    pub gym_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub team_id: u32,
}

#[derive(Debug, Deserialize)]
pub struct PokemonMessage {
    pub encounter_id: EncounterId,
    pub pokemon_id: u32,
    #[serde(default)]
    pub gender: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub disappear_time: i64,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct RaidMessage {
    pub gym_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub level: u32,
    pub start: i64,
    pub end: i64,
    /// 0 while the raid is an egg
    #[serde(default)]
    pub pokemon_id: u32,
    #[serde(default)]
    pub gender: u32,
}

impl From<GymMessage> for Gym {
    fn from(message: GymMessage) -> Self {
        Gym {
            guid: message.gym_id,
            team: message.team_id.into(),
            location: Location::new(message.latitude, message.longitude),
        }
    }
}

impl From<PokemonMessage> for Spawn {
    fn from(message: PokemonMessage) -> Self {
        Spawn {
            encounter_id: message.encounter_id.to_string(),
            pokemon: Pokemon {
                id: message.pokemon_id,
                gender: message.gender.into(),
            },
            location: Location::new(message.latitude, message.longitude),
            end_time: message.disappear_time,
            verified: message.verified,
        }
    }
}

impl From<RaidMessage> for Raid {
    fn from(message: RaidMessage) -> Self {
        let pokemon = (message.pokemon_id != 0).then(|| Pokemon {
            id: message.pokemon_id,
            gender: message.gender.into(),
        });
        Raid {
            hash: Raid::hash_for(&message.gym_id, message.start),
            gym_id: message.gym_id,
            location: Location::new(message.latitude, message.longitude),
            pokemon,
            level: message.level,
            start_time: message.start,
            end_time: message.end,
        }
    }
}

/// A decoded feed message.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Gym(Gym),
    Spawn(Spawn),
    Raid(Raid),
}

/// Decodes one envelope.
///
/// Returns `None` for skipped types (`pokestop`, `weather`), unknown types and
/// messages that don't decode.
pub fn decode_envelope(envelope: Envelope) -> Option<FeedEvent> {
    let decoded = match envelope.kind.as_str() {
        "gym" => serde_json::from_value::<GymMessage>(envelope.message)
            .map(|message| FeedEvent::Gym(message.into())),
        "pokemon" => serde_json::from_value::<PokemonMessage>(envelope.message)
            .map(|message| FeedEvent::Spawn(message.into())),
        "raid" => serde_json::from_value::<RaidMessage>(envelope.message)
            .map(|message| FeedEvent::Raid(message.into())),
        "pokestop" | "weather" => return None,
        kind => {
            debug!("unhandled type {kind}");
            return None;
        }
    };

    match decoded {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("can't decode message as type {}: {e}", envelope.kind);
            None
        }
    }
}
