//! Per-room event filters and the matcher deciding which filter an event hits.

use serde::{Deserialize, Serialize};

use crate::pogo::{Location, LocationRadius};

/// Kind of event being routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Spawn,
    Raid,
}

/// A species set restricted to a circular area.
///
/// `list_raids` enables the filter for raids, `list_wanted` for spawns. In both
/// modes `pokemon_ids` is an allow-list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PokemonFilter {
    pub area: LocationRadius,
    #[serde(default)]
    pub list_raids: bool,
    #[serde(default)]
    pub list_wanted: bool,
    #[serde(default)]
    pub pokemon_ids: Vec<u32>,
}

impl PokemonFilter {
    /// Whether this filter applies to events of `kind`.
    pub fn handles(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Spawn => self.list_wanted,
            EventKind::Raid => self.list_raids,
        }
    }

    pub fn matches(&self, kind: EventKind, pokemon_id: u32, location: &Location) -> bool {
        self.handles(kind) && self.pokemon_ids.contains(&pokemon_id) && self.area.contains(location)
    }

    /// Adds species that aren't in the list yet.
    pub fn add_pokemon(&mut self, ids: &[u32]) {
        for id in ids {
            if !self.pokemon_ids.contains(id) {
                self.pokemon_ids.push(*id);
            }
        }
    }

    /// Removes the given species and drops duplicates from the remaining list.
    pub fn remove_pokemon(&mut self, ids: &[u32]) {
        let mut kept: Vec<u32> = Vec::with_capacity(self.pokemon_ids.len());
        for id in &self.pokemon_ids {
            if !ids.contains(id) && !kept.contains(id) {
                kept.push(*id);
            }
        }
        self.pokemon_ids = kept;
    }
}

/// Returns the index of the first filter matching the event, if any.
///
/// Filters are scanned in list order and the first hit wins.
pub fn find_match(
    filters: &[PokemonFilter],
    kind: EventKind,
    pokemon_id: u32,
    location: &Location,
) -> Option<usize> {
    filters
        .iter()
        .position(|filter| filter.matches(kind, pokemon_id, location))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_filter(kind: EventKind, ids: &[u32]) -> PokemonFilter {
        PokemonFilter {
            area: LocationRadius::new(30.04896, 31.22366, 1000.0),
            list_raids: kind == EventKind::Raid,
            list_wanted: kind == EventKind::Spawn,
            pokemon_ids: ids.to_vec(),
        }
    }

    fn inside() -> Location {
        Location::new(30.05113, 31.21918)
    }

    fn outside() -> Location {
        Location::new(30.0495, 31.2592)
    }

    #[test]
    fn test_spawn_filter_matches() {
        let filter = create_test_filter(EventKind::Spawn, &[16]);
        assert!(filter.matches(EventKind::Spawn, 16, &inside()));
        assert!(!filter.matches(EventKind::Spawn, 19, &inside()));
        assert!(!filter.matches(EventKind::Spawn, 16, &outside()));
        assert!(!filter.matches(EventKind::Raid, 16, &inside()));
    }

    #[test]
    fn test_raid_filter_matches() {
        let filter = create_test_filter(EventKind::Raid, &[150]);
        assert!(filter.matches(EventKind::Raid, 150, &inside()));
        assert!(!filter.matches(EventKind::Spawn, 150, &inside()));
    }

    #[test]
    fn test_empty_species_list_matches_nothing() {
        let filter = create_test_filter(EventKind::Spawn, &[]);
        assert!(!filter.matches(EventKind::Spawn, 16, &inside()));
    }

    #[test]
    fn test_find_match_first_wins() {
        let filters = vec![
            create_test_filter(EventKind::Raid, &[16]),
            create_test_filter(EventKind::Spawn, &[16, 19]),
            create_test_filter(EventKind::Spawn, &[16]),
        ];
        assert_eq!(
            find_match(&filters, EventKind::Spawn, 16, &inside()),
            Some(1)
        );
        assert_eq!(find_match(&filters, EventKind::Raid, 16, &inside()), Some(0));
        assert_eq!(find_match(&filters, EventKind::Spawn, 1, &inside()), None);
        assert_eq!(find_match(&[], EventKind::Spawn, 16, &inside()), None);
    }

    #[test]
    fn test_add_pokemon_skips_duplicates() {
        let mut filter = create_test_filter(EventKind::Spawn, &[16]);
        filter.add_pokemon(&[16, 19, 19]);
        assert_eq!(filter.pokemon_ids, vec![16, 19]);
    }

    #[test]
    fn test_remove_pokemon_deduplicates() {
        let mut filter = create_test_filter(EventKind::Spawn, &[16, 19, 16, 1, 19]);
        filter.remove_pokemon(&[1]);
        assert_eq!(filter.pokemon_ids, vec![16, 19]);

        filter.remove_pokemon(&[16, 42]);
        assert_eq!(filter.pokemon_ids, vec![19]);
    }
}
