//! Fort (gym, stop, portal) lookup.
//!
//! Forts are loaded from a JSON array:
//!
//! ```json
//! [
//!   { "guid": "a1b2c3.16", "latitude": 30.049, "longitude": 31.223, "name": "Fountain", "type": "gym" }
//! ]
//! ```
//!
//! Nearest-fort queries scan every fort, which is fine for the few thousand forts
//! of a city.

use std::{collections::HashMap, fmt};

use anyhow::Context;
use log::info;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::pogo::{location::Location, pokedex::LookupError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FortType {
    Portal,
    Gym,
    Stop,
}

impl fmt::Display for FortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FortType::Portal => "Portal",
            FortType::Gym => "Gym",
            FortType::Stop => "Stop",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fort {
    pub guid: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub fort_type: FortType,
}

impl Fort {
    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }

    /// The fort name, or `<type>:<guid>` for unnamed forts.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{}:{}", self.fort_type, self.guid),
        }
    }
}

impl fmt::Display for Fort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GUID={} Type={} ({:.6},{:.6}) Name: {}",
            self.guid,
            self.fort_type,
            self.latitude,
            self.longitude,
            self.name.as_deref().unwrap_or("nil")
        )
    }
}

/// Whether `guid` only contains hex digits and dots.
pub fn is_valid_guid(guid: &str) -> bool {
    !guid.is_empty() && guid.chars().all(|c| c.is_ascii_hexdigit() || c == '.')
}

/// Fort index keyed by GUID.
#[derive(Debug, Default)]
pub struct GeoDex {
    forts: HashMap<String, Fort>,
}

impl GeoDex {
    pub fn new(forts: Vec<Fort>) -> Self {
        GeoDex {
            forts: forts
                .into_iter()
                .map(|fort| (fort.guid.clone(), fort))
                .collect(),
        }
    }

    /// Reads forts from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or parsed.
    pub async fn load(path: &str) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read geodex {path}"))?;
        let forts: Vec<Fort> =
            serde_json::from_str(&data).with_context(|| format!("invalid geodex {path}"))?;

        info!("read {} forts", forts.len());
        Ok(GeoDex::new(forts))
    }

    pub fn fort(&self, guid: &str) -> Result<&Fort, LookupError> {
        self.forts.get(guid).ok_or(LookupError::FortNotFound)
    }

    /// Returns the fort closest to `center` within `radius_m` meters.
    pub fn nearest_fort(&self, center: &Location, radius_m: f64) -> Result<&Fort, LookupError> {
        self.forts
            .values()
            .map(|fort| (fort, fort.location().distance_to(center)))
            .filter(|(_, distance)| *distance <= radius_m)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(fort, _)| fort)
            .ok_or(LookupError::FortNotFound)
    }

    pub fn len(&self) -> usize {
        self.forts.len()
    }
}

#[cfg(test)]
pub fn create_test_geodex() -> GeoDex {
    GeoDex::new(vec![
        Fort {
            guid: "aaaa.16".to_owned(),
            latitude: 30.0512,
            longitude: 31.2192,
            name: Some("Fountain".to_owned()),
            fort_type: FortType::Gym,
        },
        Fort {
            guid: "bbbb.16".to_owned(),
            latitude: 30.0530,
            longitude: 31.2192,
            name: None,
            fort_type: FortType::Stop,
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_guid() {
        assert!(is_valid_guid("0123456789abcdefABCDEF.16"));
        assert!(!is_valid_guid(""));
        assert!(!is_valid_guid("../etc"));
        assert!(!is_valid_guid("xyz"));
    }

    #[test]
    fn test_display_name_falls_back_to_type_and_guid() {
        let geodex = create_test_geodex();
        assert_eq!(geodex.fort("aaaa.16").unwrap().display_name(), "Fountain");
        assert_eq!(geodex.fort("bbbb.16").unwrap().display_name(), "Stop:bbbb.16");
    }

    #[test]
    fn test_fort_lookup() {
        let geodex = create_test_geodex();
        assert!(geodex.fort("aaaa.16").is_ok());
        assert_eq!(geodex.fort("cccc"), Err(LookupError::FortNotFound));
    }

    #[test]
    fn test_nearest_fort_picks_closest() {
        let geodex = create_test_geodex();
        let spawn = Location::new(30.05113, 31.21918);
        let fort = geodex.nearest_fort(&spawn, 500.0).unwrap();
        assert_eq!(fort.guid, "aaaa.16");
    }

    #[test]
    fn test_nearest_fort_respects_radius() {
        let geodex = create_test_geodex();
        let far_away = Location::new(30.0495, 31.2592);
        assert_eq!(
            geodex.nearest_fort(&far_away, 500.0),
            Err(LookupError::FortNotFound)
        );
    }

    #[test]
    fn test_fort_deserialization() {
        let json = r#"[{"guid": "ab.12", "latitude": 1.5, "longitude": 2.5, "type": "portal"}]"#;
        let forts: Vec<Fort> = serde_json::from_str(json).unwrap();
        assert_eq!(forts[0].fort_type, FortType::Portal);
        assert!(forts[0].name.is_none());
        assert_eq!(
            forts[0].to_string(),
            "GUID=ab.12 Type=Portal (1.500000,2.500000) Name: nil"
        );
    }
}
