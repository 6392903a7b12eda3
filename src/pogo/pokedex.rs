//! Species name lookup.
//!
//! The pokedex is a JSON array ordered by national dex number:
//!
//! ```json
//! [
//!   { "id": 1, "name_en": "Bulbasaur", "name_de": "Bisasam" },
//!   { "id": 2, "name_en": "Ivysaur", "name_de": "Bisaknosp" }
//! ]
//! ```

use anyhow::Context;
use log::info;
use serde::Deserialize;
use thiserror::Error;
use tokio::fs;

/// Error returned when a lookup misses.
#[derive(Debug, Error, PartialEq)]
pub enum LookupError {
    #[error("invalid pokedex id {0}")]
    InvalidPokedexId(u32),
    #[error("Pokemon not found")]
    PokemonNotFound,
    #[error("no fort found")]
    FortNotFound,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PokedexEntry {
    pub id: u32,
    pub name_en: String,
    pub name_de: String,
}

/// In-memory species table.
#[derive(Debug, Default)]
pub struct Pokedex {
    entries: Vec<PokedexEntry>,
}

impl Pokedex {
    pub fn new(entries: Vec<PokedexEntry>) -> Self {
        Pokedex { entries }
    }

    /// Reads the pokedex from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or isn't a valid pokedex.
    pub async fn load(path: &str) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read pokedex {path}"))?;
        let entries: Vec<PokedexEntry> =
            serde_json::from_str(&data).with_context(|| format!("invalid pokedex {path}"))?;

        info!("read {} pokedex entries", entries.len());
        Ok(Pokedex::new(entries))
    }

    /// Returns the English and German names of a species.
    pub fn names_by_id(&self, id: u32) -> Result<(&str, &str), LookupError> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| (entry.name_en.as_str(), entry.name_de.as_str()))
            .ok_or(LookupError::InvalidPokedexId(id))
    }

    /// Looks a species up by its English or German name, ignoring case.
    pub fn id_by_name(&self, name: &str) -> Result<&PokedexEntry, LookupError> {
        let wanted = name.to_lowercase();
        self.entries
            .iter()
            .find(|entry| {
                entry.name_en.to_lowercase() == wanted || entry.name_de.to_lowercase() == wanted
            })
            .ok_or(LookupError::PokemonNotFound)
    }

    /// Display name used in announcements.
    ///
    /// `Pidgey (de: Taubsi)` when the names differ, a single name when they don't,
    /// and `Pokemon #16` when the species is unknown or there is no pokedex.
    pub fn display_name(pokedex: Option<&Pokedex>, id: u32) -> String {
        match pokedex.map(|dex| dex.names_by_id(id)) {
            Some(Ok((en, de))) if en == de => en.to_owned(),
            Some(Ok((en, de))) => format!("{en} (de: {de})"),
            _ => format!("Pokemon #{id}"),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
pub fn create_test_pokedex() -> Pokedex {
    Pokedex::new(vec![
        PokedexEntry {
            id: 1,
            name_en: "Bulbasaur".to_owned(),
            name_de: "Bisasam".to_owned(),
        },
        PokedexEntry {
            id: 16,
            name_en: "Pidgey".to_owned(),
            name_de: "Taubsi".to_owned(),
        },
        PokedexEntry {
            id: 19,
            name_en: "Rattata".to_owned(),
            name_de: "Rattfratz".to_owned(),
        },
        PokedexEntry {
            id: 150,
            name_en: "Mewtwo".to_owned(),
            name_de: "Mewtu".to_owned(),
        },
        PokedexEntry {
            id: 151,
            name_en: "Mew".to_owned(),
            name_de: "Mew".to_owned(),
        },
    ])
}
