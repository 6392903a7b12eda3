//! Room subscription settings and their typed mutation protocol.
//!
//! Every edit goes through [`RoomConfigs::update`], [`RoomConfigs::change`] or
//! [`RoomConfigs::clear_filters`]. `change` validates its preconditions before
//! touching anything, so a failed change leaves the config as it was.
//!
//! Filters are addressed by their position in the list. Removing a filter shifts
//! the following ones down by one.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{pogo::LocationRadius, rooms::filter::PokemonFilter};

/// Subscription settings of one room.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoomConfig {
    pub room_id: String,
    #[serde(default)]
    pub accept_commands: bool,
    /// Send announcements as HTML with links instead of plain text.
    #[serde(default)]
    pub format_text: bool,
    #[serde(default)]
    pub filter: Vec<PokemonFilter>,
}

/// Edit applied to a single filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChange {
    AddPokemon(Vec<u32>),
    RemovePokemon(Vec<u32>),
    ReplaceArea(LocationRadius),
}

/// Edit applied to an existing room config.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomConfigChange {
    AppendFilters(Vec<PokemonFilter>),
    UpdateFilter { index: usize, change: FilterChange },
    RemoveFilter { index: usize },
    SetAcceptCommands(bool),
    SetFormatText(bool),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomConfigError {
    #[error("roomconfig doesn't exist")]
    NotFound,
    #[error("there are no filters to append")]
    NoFilters,
    #[error("invalid filter id")]
    InvalidFilterIndex,
}

/// All room configs, keyed by room id.
#[derive(Debug, Default)]
pub struct RoomConfigs {
    configs: HashMap<String, RoomConfig>,
}

impl RoomConfigs {
    pub fn new() -> Self {
        RoomConfigs::default()
    }

    pub fn get(&self, room_id: &str) -> Option<&RoomConfig> {
        self.configs.get(room_id)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn values(&self) -> impl Iterator<Item = &RoomConfig> {
        self.configs.values()
    }

    /// Mutable access used to fill the store from persistence.
    pub fn as_map_mut(&mut self) -> &mut HashMap<String, RoomConfig> {
        &mut self.configs
    }

    /// Installs `config`, or merges it into the existing config of its room.
    ///
    /// On merge the flags are overwritten and the filters are appended, existing
    /// filters are never replaced. Returns `true` when the config was created.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let mut configs = RoomConfigs::new();
    /// assert!(configs.update(config.clone()));
    /// assert!(!configs.update(config));
    /// assert_eq!(configs.get(&config.room_id).unwrap().filter.len(), 2);
    /// ```
    pub fn update(&mut self, config: RoomConfig) -> bool {
        match self.configs.get_mut(&config.room_id) {
            Some(existing) => {
                debug!("merging roomconfig of {}", config.room_id);
                existing.accept_commands = config.accept_commands;
                existing.format_text = config.format_text;
                existing.filter.extend(config.filter);
                false
            }
            None => {
                debug!("creating roomconfig of {}", config.room_id);
                self.configs.insert(config.room_id.clone(), config);
                true
            }
        }
    }

    /// Applies `change` to the config of `room_id`.
    ///
    /// # Errors
    ///
    /// - [`RoomConfigError::NotFound`] if the room has no config
    /// - [`RoomConfigError::NoFilters`] when appending an empty filter list
    /// - [`RoomConfigError::InvalidFilterIndex`] when the index is out of bounds
    ///
    /// Nothing is modified when an error is returned.
    pub fn change(
        &mut self,
        room_id: &str,
        change: RoomConfigChange,
    ) -> Result<&RoomConfig, RoomConfigError> {
        let config = self
            .configs
            .get_mut(room_id)
            .ok_or(RoomConfigError::NotFound)?;

        match change {
            RoomConfigChange::AppendFilters(filters) => {
                if filters.is_empty() {
                    return Err(RoomConfigError::NoFilters);
                }
                config.filter.extend(filters);
            }
            RoomConfigChange::UpdateFilter { index, change } => {
                let filter = config
                    .filter
                    .get_mut(index)
                    .ok_or(RoomConfigError::InvalidFilterIndex)?;
                match change {
                    FilterChange::AddPokemon(ids) => filter.add_pokemon(&ids),
                    FilterChange::RemovePokemon(ids) => filter.remove_pokemon(&ids),
                    FilterChange::ReplaceArea(area) => filter.area = area,
                }
            }
            RoomConfigChange::RemoveFilter { index } => {
                if index >= config.filter.len() {
                    return Err(RoomConfigError::InvalidFilterIndex);
                }
                config.filter.remove(index);
            }
            RoomConfigChange::SetAcceptCommands(value) => config.accept_commands = value,
            RoomConfigChange::SetFormatText(value) => config.format_text = value,
        }

        Ok(config)
    }

    /// Removes every filter of `room_id`. Returns `None` if the room has no config.
    pub fn clear_filters(&mut self, room_id: &str) -> Option<&RoomConfig> {
        let config = self.configs.get_mut(room_id)?;
        config.filter.clear();
        Some(config)
    }
}
