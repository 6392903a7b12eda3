//! Game entities received from the scanner feed.
//!
//! The feed reports three kinds of events:
//! - [`Spawn`]: a wild Pokemon visible at a point until its despawn time
//! - [`Raid`]: a boss battle at a gym, possibly still an egg
//! - [`Gym`]: a gym status update
//!
//! Lookup tables used to decorate announcements live in [`pokedex`] and [`geodex`].

pub mod geodex;
pub mod location;
pub mod pokedex;

use serde::{Deserialize, Serialize};

pub use crate::pogo::{
    geodex::GeoDex,
    location::{Location, LocationRadius},
    pokedex::Pokedex,
};

/// Gender as reported by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Unset,
    Male,
    Female,
    Genderless,
}

impl From<u32> for Gender {
    fn from(value: u32) -> Self {
        match value {
            1 => Gender::Male,
            2 => Gender::Female,
            3 => Gender::Genderless,
            _ => Gender::Unset,
        }
    }
}

impl Gender {
    pub fn symbol(&self) -> &'static str {
        match self {
            Gender::Male => "♂",
            Gender::Female => "♀",
            _ => "",
        }
    }
}

/// Team controlling a gym.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TeamColor {
    #[default]
    Neutral,
    Blue,
    Red,
    Yellow,
}

impl From<u32> for TeamColor {
    fn from(value: u32) -> Self {
        match value {
            1 => TeamColor::Blue,
            2 => TeamColor::Red,
            3 => TeamColor::Yellow,
            _ => TeamColor::Neutral,
        }
    }
}

/// A species together with its individual traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pokemon {
    pub id: u32,
    pub gender: Gender,
}

/// A wild Pokemon, identified by its encounter id.
#[derive(Debug, Clone, PartialEq)]
pub struct Spawn {
    pub encounter_id: String,
    pub pokemon: Pokemon,
    pub location: Location,
    /// Unix timestamp of the despawn.
    pub end_time: i64,
    /// Whether the despawn time is known for sure.
    pub verified: bool,
}

/// A raid at a gym, identified by `<gym_id>:<start_time>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Raid {
    pub hash: String,
    pub gym_id: String,
    pub location: Location,
    /// `None` while the raid is still an egg.
    pub pokemon: Option<Pokemon>,
    pub level: u32,
    pub start_time: i64,
    pub end_time: i64,
}

impl Raid {
    /// Builds the idempotency key of a raid.
    pub fn hash_for(gym_id: &str, start_time: i64) -> String {
        format!("{gym_id}:{start_time}")
    }
}

/// A gym status update. It carries no announcement of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Gym {
    pub guid: String,
    pub team: TeamColor,
    pub location: Location,
}
