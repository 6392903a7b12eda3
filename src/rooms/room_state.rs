//! Per-room dedup ledger.
//!
//! A [`RoomState`] remembers which spawns and raids were already announced in a
//! room, so a repeated feed message is never announced twice. Entries are keyed by
//! the event's idempotency id and carry the event's own end time. They are only
//! reclaimed by [`RoomState::remove_expired`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::pogo::{Raid, Spawn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedState {
    pub end_time: i64,
    pub posted: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoomState {
    #[serde(default)]
    pub spawns: HashMap<String, PostedState>,
    #[serde(default)]
    pub raids: HashMap<String, PostedState>,
}

impl RoomState {
    pub fn new() -> Self {
        RoomState::default()
    }

    pub fn is_spawn_posted(&self, encounter_id: &str) -> bool {
        Self::is_posted(&self.spawns, encounter_id)
    }

    pub fn is_raid_posted(&self, hash: &str) -> bool {
        Self::is_posted(&self.raids, hash)
    }

    pub fn mark_spawn_posted(&mut self, spawn: &Spawn) {
        self.spawns.insert(
            spawn.encounter_id.clone(),
            PostedState {
                end_time: spawn.end_time,
                posted: true,
            },
        );
    }

    pub fn mark_raid_posted(&mut self, raid: &Raid) {
        self.raids.insert(
            raid.hash.clone(),
            PostedState {
                end_time: raid.end_time,
                posted: true,
            },
        );
    }

    /// Drops every entry whose end time is strictly before `now`.
    ///
    /// An entry stays valid through its end time, so `end_time == now` is kept.
    /// Returns the number of removed entries.
    pub fn remove_expired(&mut self, now: i64) -> usize {
        let before = self.len();
        self.spawns.retain(|_, state| state.end_time >= now);
        self.raids.retain(|_, state| state.end_time >= now);
        before - self.len()
    }

    /// Forgets all spawns, all raids, or both.
    pub fn clear(&mut self, spawns: bool, raids: bool) {
        if spawns {
            self.spawns.clear();
        }
        if raids {
            self.raids.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.spawns.len() + self.raids.len()
    }

    fn is_posted(map: &HashMap<String, PostedState>, id: &str) -> bool {
        map.get(id).is_some_and(|state| state.posted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pogo::{Gender, Location, Pokemon};

    fn create_test_spawn(encounter_id: &str, end_time: i64) -> Spawn {
        Spawn {
            encounter_id: encounter_id.to_owned(),
            pokemon: Pokemon {
                id: 16,
                gender: Gender::Unset,
            },
            location: Location::new(30.05113, 31.21918),
            end_time,
            verified: true,
        }
    }

    fn create_test_raid(gym_id: &str, start_time: i64, end_time: i64) -> Raid {
        Raid {
            hash: Raid::hash_for(gym_id, start_time),
            gym_id: gym_id.to_owned(),
            location: Location::new(30.05113, 31.21918),
            pokemon: Some(Pokemon {
                id: 150,
                gender: Gender::Genderless,
            }),
            level: 5,
            start_time,
            end_time,
        }
    }

    #[test]
    fn test_new_state_has_nothing_posted() {
        let state = RoomState::new();
        assert!(!state.is_spawn_posted("abc"));
        assert!(!state.is_raid_posted("gym:1"));
        assert_eq!(state.len(), 0);
    }

    #[test]
    fn test_mark_posted() {
        let mut state = RoomState::new();
        let spawn = create_test_spawn("abc", 1613800682);
        let raid = create_test_raid("gym", 1613800000, 1613802700);

        state.mark_spawn_posted(&spawn);
        state.mark_raid_posted(&raid);

        assert!(state.is_spawn_posted("abc"));
        assert!(state.is_raid_posted("gym:1613800000"));
        assert!(!state.is_spawn_posted("gym:1613800000"));
        assert!(!state.is_raid_posted("abc"));
    }

    #[test]
    fn test_unposted_entry_is_not_posted() {
        let mut state = RoomState::new();
        state.spawns.insert(
            "abc".to_owned(),
            PostedState {
                end_time: 1613800682,
                posted: false,
            },
        );
        assert!(!state.is_spawn_posted("abc"));
    }

    #[test]
    fn test_mark_posted_overwrites_end_time() {
        let mut state = RoomState::new();
        state.mark_spawn_posted(&create_test_spawn("abc", 100));
        state.mark_spawn_posted(&create_test_spawn("abc", 200));
        assert_eq!(state.spawns["abc"].end_time, 200);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_remove_expired_boundary() {
        let mut state = RoomState::new();
        state.mark_spawn_posted(&create_test_spawn("abc", 1613800682));

        assert_eq!(state.remove_expired(1613800682), 0);
        assert!(state.is_spawn_posted("abc"));

        assert_eq!(state.remove_expired(1613800683), 1);
        assert!(!state.is_spawn_posted("abc"));
    }

    #[test]
    fn test_remove_expired_counts_spawns_and_raids() {
        let mut state = RoomState::new();
        state.mark_spawn_posted(&create_test_spawn("old", 100));
        state.mark_spawn_posted(&create_test_spawn("new", 300));
        state.mark_raid_posted(&create_test_raid("gym", 50, 150));
        state.mark_raid_posted(&create_test_raid("gym", 250, 350));

        assert_eq!(state.remove_expired(200), 2);
        assert!(state.is_spawn_posted("new"));
        assert!(state.is_raid_posted("gym:250"));
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut state = RoomState::new();
        state.mark_spawn_posted(&create_test_spawn("abc", 100));
        state.mark_raid_posted(&create_test_raid("gym", 50, 150));

        state.clear(true, false);
        assert!(state.spawns.is_empty());
        assert_eq!(state.raids.len(), 1);

        state.mark_spawn_posted(&create_test_spawn("abc", 100));
        state.clear(false, true);
        assert_eq!(state.spawns.len(), 1);
        assert!(state.raids.is_empty());

        state.mark_raid_posted(&create_test_raid("gym", 50, 150));
        state.clear(true, true);
        assert_eq!(state.len(), 0);
    }
}
