//! Announcement texts for spawns and raids.
//!
//! Every announcement comes as plain text and as HTML. Rooms with `format_text`
//! get the HTML rendering, the others the plain text.
//!
//! ```text
//! Pidgey (de: Taubsi)♂ until 14:05:30 (12m4s left) near Fountain (8m, 41°) at https://maps.google.de/maps?q=...
//! Raid Mewtwo (de: Mewtu) 14:00:00-14:45:00 at Fountain (Level 5)
//! ```

use chrono::{DateTime, Local};

use crate::{
    pogo::{GeoDex, Location, Pokedex, Pokemon, Raid, Spawn},
    utils::{escape_html, format_seconds},
};

/// Radius in which a spawn looks for a fort to describe its position.
pub const NEAREST_FORT_RADIUS_M: f64 = 500.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    pub text: String,
    pub html: String,
}

/// Formats a unix timestamp as local `HH:MM:SS`.
pub fn format_clock(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(time) => time.with_timezone(&Local).format("%H:%M:%S").to_string(),
        None => timestamp.to_string(),
    }
}

/// Builds the announcement of a spawn.
///
/// The remaining time is computed against `now` and may be negative for spawns
/// that arrive late.
pub fn announce_spawn(
    spawn: &Spawn,
    pokedex: Option<&Pokedex>,
    geodex: Option<&GeoDex>,
    now: i64,
) -> Announcement {
    let name = Pokedex::display_name(pokedex, spawn.pokemon.id);
    let prefix = format!(
        "{name}{} until {} ({} left)",
        spawn.pokemon.gender.symbol(),
        format_clock(spawn.end_time),
        format_seconds(spawn.end_time.saturating_sub(now))
    );
    let link = spawn.location.to_maps_link();

    let nearest = geodex.and_then(|dex| dex.nearest_fort(&spawn.location, NEAREST_FORT_RADIUS_M).ok());
    match nearest {
        Some(fort) => {
            let fort_location = fort.location();
            let position = format!(
                "({}m, {}°)",
                fort_location.distance_to(&spawn.location) as i64,
                fort_location.bearing_to(&spawn.location) as i64
            );
            let fort_name = fort.display_name();
            Announcement {
                text: format!("{prefix} near {fort_name} {position} at {link}"),
                html: format!(
                    "{} near <a href=\"{link}\">{} {position}</a>",
                    escape_html(&prefix),
                    escape_html(&fort_name)
                ),
            }
        }
        None => Announcement {
            text: format!("{prefix} at {link}"),
            html: format!(
                "{} at <a href=\"{link}\">{}</a>",
                escape_html(&prefix),
                format_coordinates(&spawn.location)
            ),
        },
    }
}

/// Builds the announcement of a hatched raid, `pokemon` being its boss.
pub fn announce_raid(
    raid: &Raid,
    pokemon: &Pokemon,
    pokedex: Option<&Pokedex>,
    geodex: Option<&GeoDex>,
) -> Announcement {
    let name = Pokedex::display_name(pokedex, pokemon.id);
    let fort_name = geodex
        .and_then(|dex| dex.fort(&raid.gym_id).ok())
        .map_or_else(|| raid.gym_id.clone(), |fort| fort.display_name());
    let time = format!(
        "{}-{}",
        format_clock(raid.start_time),
        format_clock(raid.end_time)
    );
    let link = raid.location.to_maps_link();

    Announcement {
        text: format!("Raid {name} {time} at {fort_name} (Level {})", raid.level),
        html: format!(
            "Raid {} {time} at <a href=\"{link}\">{}</a> (Level {})",
            escape_html(&name),
            escape_html(&fort_name),
            raid.level
        ),
    }
}

fn format_coordinates(location: &Location) -> String {
    format!("({:.6},{:.6})", location.latitude, location.longitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pogo::{Gender, geodex::create_test_geodex, pokedex::create_test_pokedex};

    const END_TIME: i64 = 1613800682;

    fn create_test_spawn() -> Spawn {
        Spawn {
            encounter_id: "abc".to_owned(),
            pokemon: Pokemon {
                id: 16,
                gender: Gender::Male,
            },
            location: Location::new(30.05113, 31.21918),
            end_time: END_TIME,
            verified: true,
        }
    }

    fn create_test_raid(pokemon: Pokemon) -> Raid {
        Raid {
            hash: Raid::hash_for("aaaa.16", END_TIME - 2700),
            gym_id: "aaaa.16".to_owned(),
            location: Location::new(30.0512, 31.2192),
            pokemon: Some(pokemon),
            level: 5,
            start_time: END_TIME - 2700,
            end_time: END_TIME,
        }
    }

    #[test]
    fn test_format_clock() {
        let clock = format_clock(END_TIME);
        assert_eq!(clock.len(), 8);
        assert_eq!(clock.matches(':').count(), 2);
    }

    #[test]
    fn test_spawn_near_fort() {
        let pokedex = create_test_pokedex();
        let geodex = create_test_geodex();
        let spawn = create_test_spawn();

        let announcement = announce_spawn(&spawn, Some(&pokedex), Some(&geodex), END_TIME - 600);

        let fort = geodex.fort("aaaa.16").unwrap().location();
        let position = format!(
            "({}m, {}°)",
            fort.distance_to(&spawn.location) as i64,
            fort.bearing_to(&spawn.location) as i64
        );
        let prefix = format!("Pidgey (de: Taubsi)♂ until {} (10m0s left)", format_clock(END_TIME));
        assert_eq!(
            announcement.text,
            format!(
                "{prefix} near Fountain {position} at https://maps.google.de/maps?q=30.051130,31.219180"
            )
        );
        assert_eq!(
            announcement.html,
            format!(
                "{prefix} near <a href=\"https://maps.google.de/maps?q=30.051130,31.219180\">Fountain {position}</a>"
            )
        );
    }

    #[test]
    fn test_spawn_without_lookups() {
        let spawn = create_test_spawn();

        let announcement = announce_spawn(&spawn, None, None, END_TIME + 5);

        assert_eq!(
            announcement.text,
            format!(
                "Pokemon #16♂ until {} (-5s left) at https://maps.google.de/maps?q=30.051130,31.219180",
                format_clock(END_TIME)
            )
        );
        assert!(announcement.html.ends_with(">(30.051130,31.219180)</a>"));
    }

    #[test]
    fn test_raid_with_fort_name() {
        let pokedex = create_test_pokedex();
        let geodex = create_test_geodex();
        let boss = Pokemon {
            id: 150,
            gender: Gender::Genderless,
        };
        let raid = create_test_raid(boss);

        let announcement = announce_raid(&raid, &boss, Some(&pokedex), Some(&geodex));

        let time = format!("{}-{}", format_clock(raid.start_time), format_clock(END_TIME));
        assert_eq!(
            announcement.text,
            format!("Raid Mewtwo (de: Mewtu) {time} at Fountain (Level 5)")
        );
        assert_eq!(
            announcement.html,
            format!(
                "Raid Mewtwo (de: Mewtu) {time} at <a href=\"https://maps.google.de/maps?q=30.051200,31.219200\">Fountain</a> (Level 5)"
            )
        );
    }

    #[test]
    fn test_raid_falls_back_to_gym_id() {
        let boss = Pokemon {
            id: 151,
            gender: Gender::Unset,
        };
        let raid = create_test_raid(boss);

        let announcement = announce_raid(&raid, &boss, None, None);

        assert!(announcement.text.starts_with("Raid Pokemon #151 "));
        assert!(announcement.text.ends_with(" at aaaa.16 (Level 5)"));
    }

    #[test]
    fn test_spawn_with_out_of_range_end_time() {
        let mut spawn = create_test_spawn();
        spawn.end_time = i64::MIN;

        let announcement = announce_spawn(&spawn, None, None, END_TIME);

        assert!(
            announcement
                .text
                .starts_with("Pokemon #16♂ until -9223372036854775808 (-")
        );
        assert!(announcement.text.contains(" left) at "));

        spawn.end_time = i64::MAX;
        let announcement = announce_spawn(&spawn, None, None, -1);
        assert!(announcement.text.contains("until 9223372036854775807 ("));
    }
}
