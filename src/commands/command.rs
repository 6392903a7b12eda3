//! Command keywords and parsing.
//!
//! A command is a chat line whose first word is one of the keywords of
//! [`KEYWORDS`]. Words are separated by whitespace, so coordinates like
//! `-33.86` are plain arguments.

use log::debug;

use crate::{
    commands::{
        CommandParseError,
        responses::{
            ADMIN_USAGE, FILTER_ADD_USAGE, FILTER_AREA_USAGE, FILTER_RM_USAGE, FILTER_USAGE,
            FORT_INFO_USAGE, FORT_NEAR_USAGE, FORT_USAGE, INVALID_FLOAT, INVALID_GUID,
            INVALID_PARAMETER, MON_USAGE, format_filter_pokemon_add_usage,
            format_filter_pokemon_rm_usage, format_filter_pokemon_usage,
        },
    },
    pogo::{Location, LocationRadius, geodex::is_valid_guid},
    rooms::EventKind,
};

/// Default search radius of `fort near`.
pub const FORT_NEAR_DEFAULT_RADIUS_M: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Help,
    Admin,
    Status,
    Mon,
    Fort,
    Filter,
    Spawn,
    Raid,
}

/// Entry of the keyword table.
#[derive(Debug)]
pub struct KeywordEntry {
    pub name: &'static str,
    pub keyword: Keyword,
    /// Usable by everyone, otherwise admins only.
    pub public: bool,
}

pub const KEYWORDS: &[KeywordEntry] = &[
    KeywordEntry {
        name: "help",
        keyword: Keyword::Help,
        public: true,
    },
    KeywordEntry {
        name: "admin",
        keyword: Keyword::Admin,
        public: false,
    },
    KeywordEntry {
        name: "status",
        keyword: Keyword::Status,
        public: true,
    },
    KeywordEntry {
        name: "mon",
        keyword: Keyword::Mon,
        public: true,
    },
    KeywordEntry {
        name: "fort",
        keyword: Keyword::Fort,
        public: true,
    },
    KeywordEntry {
        name: "filter",
        keyword: Keyword::Filter,
        public: true,
    },
    KeywordEntry {
        name: "spawn",
        keyword: Keyword::Spawn,
        public: true,
    },
    KeywordEntry {
        name: "raid",
        keyword: Keyword::Raid,
        public: true,
    },
];

impl Keyword {
    fn entry(&self) -> Option<&'static KeywordEntry> {
        KEYWORDS.iter().find(|entry| entry.keyword == *self)
    }

    pub fn is_public(&self) -> bool {
        self.entry().is_some_and(|entry| entry.public)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminCommand {
    RoomConfig,
    RoomState,
    RoomStateClear,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MonQuery {
    Ids(Vec<u32>),
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FortCommand {
    Near { center: Location, radius_m: f64 },
    Info { guid: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterCommand {
    Add { kind: EventKind, area: LocationRadius },
    Remove { index: usize },
    Area { index: usize, area: LocationRadius },
    Drop,
    DropReally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PokemonOp {
    Add,
    Remove,
}

/// A parsed bot command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Status,
    Admin(AdminCommand),
    Mon(MonQuery),
    Fort(FortCommand),
    Filter(FilterCommand),
    /// `spawn add|rm` and `raid add|rm`.
    FilterPokemon {
        kind: EventKind,
        op: PokemonOp,
        index: usize,
        ids: Vec<u32>,
    },
}

impl Command {
    /// Parses a chat line.
    ///
    /// # Errors
    ///
    /// - [`CommandParseError::NotForBot`] if the first word is not a keyword
    /// - [`CommandParseError::InvalidCommand`] with a usage text if the arguments
    ///   don't fit the command
    pub fn parse(body: &str) -> Result<Self, CommandParseError> {
        let args: Vec<&str> = body.split_whitespace().collect();
        let Some(first) = args.first() else {
            return Err(CommandParseError::NotForBot);
        };

        let Some(entry) = KEYWORDS.iter().find(|entry| entry.name == *first) else {
            debug!("command not handled: {first}");
            return Err(CommandParseError::NotForBot);
        };

        debug!("parsing command: {body}");

        match entry.keyword {
            Keyword::Help => Ok(Command::Help),
            Keyword::Status => Ok(Command::Status),
            Keyword::Admin => Self::parse_admin(&args).map(Command::Admin),
            Keyword::Mon => Self::parse_mon(&args).map(Command::Mon),
            Keyword::Fort => Self::parse_fort(&args).map(Command::Fort),
            Keyword::Filter => Self::parse_filter(&args).map(Command::Filter),
            Keyword::Spawn => Self::parse_filter_pokemon(EventKind::Spawn, &args),
            Keyword::Raid => Self::parse_filter_pokemon(EventKind::Raid, &args),
        }
    }

    /// The keyword this command was invoked with.
    pub fn keyword(&self) -> Keyword {
        match self {
            Command::Help => Keyword::Help,
            Command::Status => Keyword::Status,
            Command::Admin(_) => Keyword::Admin,
            Command::Mon(_) => Keyword::Mon,
            Command::Fort(_) => Keyword::Fort,
            Command::Filter(_) => Keyword::Filter,
            Command::FilterPokemon {
                kind: EventKind::Spawn,
                ..
            } => Keyword::Spawn,
            Command::FilterPokemon {
                kind: EventKind::Raid,
                ..
            } => Keyword::Raid,
        }
    }

    fn parse_admin(args: &[&str]) -> Result<AdminCommand, CommandParseError> {
        match args.get(1) {
            Some(&"roomconfig") => Ok(AdminCommand::RoomConfig),
            Some(&"roomstate") => Ok(AdminCommand::RoomState),
            Some(&"roomstate_clear") => Ok(AdminCommand::RoomStateClear),
            Some(&"shutdown") => Ok(AdminCommand::Shutdown),
            _ => Err(invalid(ADMIN_USAGE)),
        }
    }

    fn parse_mon(args: &[&str]) -> Result<MonQuery, CommandParseError> {
        if args.len() != 2 {
            return Err(invalid(MON_USAGE));
        }

        match parse_id_list(args[1]) {
            Some(ids) => Ok(MonQuery::Ids(ids)),
            None => Ok(MonQuery::Name(args[1].to_owned())),
        }
    }

    fn parse_fort(args: &[&str]) -> Result<FortCommand, CommandParseError> {
        match args.get(1) {
            Some(&"near") => {
                if args.len() != 4 && args.len() != 5 {
                    return Err(invalid(FORT_NEAR_USAGE));
                }
                let center = parse_location(args[2], args[3]).ok_or(invalid(INVALID_FLOAT))?;
                let radius_m = match args.get(4) {
                    Some(radius) => parse_radius(radius).ok_or(invalid(INVALID_FLOAT))?,
                    None => FORT_NEAR_DEFAULT_RADIUS_M,
                };
                Ok(FortCommand::Near { center, radius_m })
            }
            Some(&"info") => {
                if args.len() != 3 {
                    return Err(invalid(FORT_INFO_USAGE));
                }
                if !is_valid_guid(args[2]) {
                    return Err(invalid(INVALID_GUID));
                }
                Ok(FortCommand::Info {
                    guid: args[2].to_owned(),
                })
            }
            _ => Err(invalid(FORT_USAGE)),
        }
    }

    fn parse_filter(args: &[&str]) -> Result<FilterCommand, CommandParseError> {
        match args.get(1) {
            Some(&"add") => {
                if args.len() != 6 {
                    return Err(invalid(FILTER_ADD_USAGE));
                }
                let kind = match args[2] {
                    "raid" => EventKind::Raid,
                    "spawn" => EventKind::Spawn,
                    _ => return Err(invalid(INVALID_PARAMETER)),
                };
                let area = parse_area(&args[3..6]).ok_or(invalid(INVALID_PARAMETER))?;
                Ok(FilterCommand::Add { kind, area })
            }
            Some(&"rm") => {
                if args.len() != 3 {
                    return Err(invalid(FILTER_RM_USAGE));
                }
                let index = args[2].parse().map_err(|_| invalid(INVALID_PARAMETER))?;
                Ok(FilterCommand::Remove { index })
            }
            Some(&"area") => {
                if args.len() != 6 {
                    return Err(invalid(FILTER_AREA_USAGE));
                }
                let index = args[2].parse().map_err(|_| invalid(INVALID_PARAMETER))?;
                let area = parse_area(&args[3..6]).ok_or(invalid(INVALID_PARAMETER))?;
                Ok(FilterCommand::Area { index, area })
            }
            Some(&"drop") => Ok(FilterCommand::Drop),
            Some(&"dropreally") => Ok(FilterCommand::DropReally),
            _ => Err(invalid(FILTER_USAGE)),
        }
    }

    fn parse_filter_pokemon(kind: EventKind, args: &[&str]) -> Result<Command, CommandParseError> {
        let verb = match kind {
            EventKind::Spawn => "spawn",
            EventKind::Raid => "raid",
        };

        let (op, usage) = match args.get(1) {
            Some(&"add") => (PokemonOp::Add, format_filter_pokemon_add_usage(verb)),
            Some(&"rm") => (PokemonOp::Remove, format_filter_pokemon_rm_usage(verb)),
            _ => return Err(CommandParseError::InvalidCommand(format_filter_pokemon_usage(verb))),
        };

        if args.len() != 4 {
            return Err(CommandParseError::InvalidCommand(usage));
        }

        let index = args[2].parse().map_err(|_| invalid(INVALID_PARAMETER))?;
        let ids = parse_id_list(args[3]).ok_or(invalid(INVALID_PARAMETER))?;

        Ok(Command::FilterPokemon {
            kind,
            op,
            index,
            ids,
        })
    }
}

fn invalid(message: &str) -> CommandParseError {
    CommandParseError::InvalidCommand(message.to_owned())
}

/// Parses `16` or `16,19,150`.
fn parse_id_list(value: &str) -> Option<Vec<u32>> {
    value.split(',').map(|id| id.parse().ok()).collect()
}

fn parse_location(latitude: &str, longitude: &str) -> Option<Location> {
    let location = Location::new(latitude.parse().ok()?, longitude.parse().ok()?);
    location.is_valid().then_some(location)
}

fn parse_radius(value: &str) -> Option<f64> {
    let radius: f64 = value.parse().ok()?;
    (radius.is_finite() && radius >= 0.0).then_some(radius)
}

/// Parses `<lat> <lon> <radius_m>`.
fn parse_area(args: &[&str]) -> Option<LocationRadius> {
    let location = parse_location(args[0], args[1])?;
    let radius_m = parse_radius(args[2])?;
    Some(LocationRadius { location, radius_m })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(body: &str, expected: &str) {
        match Command::parse(body) {
            Err(CommandParseError::InvalidCommand(message)) => assert_eq!(message, expected),
            other => panic!("expected InvalidCommand for {body:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_not_a_command() {
        assert!(matches!(
            Command::parse("hello there"),
            Err(CommandParseError::NotForBot)
        ));
        assert!(matches!(
            Command::parse("   "),
            Err(CommandParseError::NotForBot)
        ));
        assert!(matches!(
            Command::parse("!help"),
            Err(CommandParseError::NotForBot)
        ));
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("help"), Ok(Command::Help));
        assert_eq!(Command::parse("  status  "), Ok(Command::Status));
    }

    #[test]
    fn test_parse_admin() {
        assert_eq!(
            Command::parse("admin roomconfig"),
            Ok(Command::Admin(AdminCommand::RoomConfig))
        );
        assert_eq!(
            Command::parse("admin roomstate_clear"),
            Ok(Command::Admin(AdminCommand::RoomStateClear))
        );
        assert_eq!(
            Command::parse("admin shutdown"),
            Ok(Command::Admin(AdminCommand::Shutdown))
        );
        assert_invalid("admin", ADMIN_USAGE);
        assert_invalid("admin reboot", ADMIN_USAGE);
    }

    #[test]
    fn test_parse_mon() {
        assert_eq!(
            Command::parse("mon 16"),
            Ok(Command::Mon(MonQuery::Ids(vec![16])))
        );
        assert_eq!(
            Command::parse("mon 16,19,150"),
            Ok(Command::Mon(MonQuery::Ids(vec![16, 19, 150])))
        );
        assert_eq!(
            Command::parse("mon Pidgey"),
            Ok(Command::Mon(MonQuery::Name("Pidgey".to_owned())))
        );
        assert_invalid("mon", MON_USAGE);
        assert_invalid("mon a b", MON_USAGE);
    }

    #[test]
    fn test_parse_fort() {
        assert_eq!(
            Command::parse("fort near -33.86 151.21"),
            Ok(Command::Fort(FortCommand::Near {
                center: Location::new(-33.86, 151.21),
                radius_m: FORT_NEAR_DEFAULT_RADIUS_M,
            }))
        );
        assert_eq!(
            Command::parse("fort near 30.0 31.0 250"),
            Ok(Command::Fort(FortCommand::Near {
                center: Location::new(30.0, 31.0),
                radius_m: 250.0,
            }))
        );
        assert_eq!(
            Command::parse("fort info abc.16"),
            Ok(Command::Fort(FortCommand::Info {
                guid: "abc.16".to_owned()
            }))
        );
        assert_invalid("fort", FORT_USAGE);
        assert_invalid("fort near 30.0", FORT_NEAR_USAGE);
        assert_invalid("fort near x 31.0", INVALID_FLOAT);
        assert_invalid("fort near 30.0 31.0 NaN", INVALID_FLOAT);
        assert_invalid("fort info", FORT_INFO_USAGE);
        assert_invalid("fort info ../etc", INVALID_GUID);
    }

    #[test]
    fn test_parse_filter_add() {
        assert_eq!(
            Command::parse("filter add spawn 30.04896 31.22366 1000"),
            Ok(Command::Filter(FilterCommand::Add {
                kind: EventKind::Spawn,
                area: LocationRadius::new(30.04896, 31.22366, 1000.0),
            }))
        );
        assert_eq!(
            Command::parse("filter add raid -30 -31 50.5"),
            Ok(Command::Filter(FilterCommand::Add {
                kind: EventKind::Raid,
                area: LocationRadius::new(-30.0, -31.0, 50.5),
            }))
        );
        assert_invalid("filter add spawn 30 31", FILTER_ADD_USAGE);
        assert_invalid("filter add gym 30 31 100", INVALID_PARAMETER);
        assert_invalid("filter add spawn 95 31 100", INVALID_PARAMETER);
        assert_invalid("filter add spawn 30 31 -1", INVALID_PARAMETER);
    }

    #[test]
    fn test_parse_filter_edits() {
        assert_eq!(
            Command::parse("filter rm 2"),
            Ok(Command::Filter(FilterCommand::Remove { index: 2 }))
        );
        assert_eq!(
            Command::parse("filter area 0 30 31 100"),
            Ok(Command::Filter(FilterCommand::Area {
                index: 0,
                area: LocationRadius::new(30.0, 31.0, 100.0),
            }))
        );
        assert_eq!(
            Command::parse("filter drop"),
            Ok(Command::Filter(FilterCommand::Drop))
        );
        assert_eq!(
            Command::parse("filter dropreally"),
            Ok(Command::Filter(FilterCommand::DropReally))
        );
        assert_invalid("filter", FILTER_USAGE);
        assert_invalid("filter rm", FILTER_RM_USAGE);
        assert_invalid("filter rm -1", INVALID_PARAMETER);
        assert_invalid("filter area 0 30 31", FILTER_AREA_USAGE);
    }

    #[test]
    fn test_parse_filter_pokemon() {
        assert_eq!(
            Command::parse("spawn add 0 16,19"),
            Ok(Command::FilterPokemon {
                kind: EventKind::Spawn,
                op: PokemonOp::Add,
                index: 0,
                ids: vec![16, 19],
            })
        );
        assert_eq!(
            Command::parse("raid rm 1 150"),
            Ok(Command::FilterPokemon {
                kind: EventKind::Raid,
                op: PokemonOp::Remove,
                index: 1,
                ids: vec![150],
            })
        );
        assert_invalid("raid", "Usage: raid [add|rm]");
        assert_invalid("spawn add 0", &format_filter_pokemon_add_usage("spawn"));
        assert_invalid("spawn rm 0 16,x", INVALID_PARAMETER);
    }

    #[test]
    fn test_keyword_of_command() {
        assert_eq!(Command::Help.keyword(), Keyword::Help);
        assert_eq!(
            Command::Admin(AdminCommand::Shutdown).keyword(),
            Keyword::Admin
        );
        assert_eq!(
            Command::parse("raid add 0 1").unwrap().keyword(),
            Keyword::Raid
        );
    }

    #[test]
    fn test_only_admin_is_restricted() {
        for entry in KEYWORDS {
            assert_eq!(entry.keyword.is_public(), entry.keyword != Keyword::Admin);
        }
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("1"), Some(vec![1]));
        assert_eq!(parse_id_list("1,2,3"), Some(vec![1, 2, 3]));
        assert_eq!(parse_id_list("1,,3"), None);
        assert_eq!(parse_id_list("pidgey"), None);
    }
}
