//! Filter editing command handlers.
//!
//! `filter add|rm|area|drop|dropreally` edit the filter list of the room,
//! `spawn add|rm` and `raid add|rm` edit the species of a single filter.
//! All edits are returned as actions for the engine to apply.

use log::debug;

use crate::{
    commands::{
        CommandAction, CommandContext, CommandResult,
        command::{FilterCommand, PokemonOp},
        responses::{FILTER_DROP_WARNING, FILTER_LIMIT_REACHED},
    },
    rooms::{EventKind, FilterChange, PokemonFilter, RoomConfig, RoomConfigChange},
};

/// Highest number of filters a room may hold.
pub const MAX_FILTERS_PER_ROOM: usize = 100;

/// Handles the `filter` subcommands.
///
/// # Arguments
///
/// * `context` - The room the command was written in
/// * `command` - The parsed subcommand
///
/// # Returns
///
/// * `CommandResult` - The action to apply, or a reply when nothing is to change
pub fn handle_filter(context: &CommandContext, command: &FilterCommand) -> CommandResult {
    debug!("handling filter command: {:?}", command);

    match command {
        FilterCommand::Add { kind, area } => {
            let filter_count = context.room_config.map_or(0, |config| config.filter.len());
            if filter_count >= MAX_FILTERS_PER_ROOM {
                return CommandResult::reply(FILTER_LIMIT_REACHED);
            }

            let filter = PokemonFilter {
                area: *area,
                list_raids: *kind == EventKind::Raid,
                list_wanted: *kind == EventKind::Spawn,
                pokemon_ids: vec![],
            };
            CommandResult::action(CommandAction::UpdateRoomConfig {
                config: RoomConfig {
                    room_id: context.room_id.to_owned(),
                    accept_commands: false,
                    format_text: true,
                    filter: vec![filter],
                },
                success: "added filter to roomconfig".to_owned(),
            })
        }
        FilterCommand::Remove { index } => CommandResult::action(CommandAction::ChangeRoomConfig {
            change: RoomConfigChange::RemoveFilter { index: *index },
            success: "removed from filter".to_owned(),
        }),
        FilterCommand::Area { index, area } => {
            CommandResult::action(CommandAction::ChangeRoomConfig {
                change: RoomConfigChange::UpdateFilter {
                    index: *index,
                    change: FilterChange::ReplaceArea(*area),
                },
                success: "filter area updated".to_owned(),
            })
        }
        FilterCommand::Drop => CommandResult::reply(FILTER_DROP_WARNING),
        FilterCommand::DropReally => CommandResult::action(CommandAction::ClearFilters),
    }
}

/// Handles `spawn add|rm` and `raid add|rm`.
pub fn handle_filter_pokemon(op: PokemonOp, index: usize, ids: &[u32]) -> CommandResult {
    debug!("handling filter pokemon command: {:?} {} {:?}", op, index, ids);

    let (change, success) = match op {
        PokemonOp::Add => (FilterChange::AddPokemon(ids.to_vec()), "added to filter"),
        PokemonOp::Remove => (FilterChange::RemovePokemon(ids.to_vec()), "removed from filter"),
    };

    CommandResult::action(CommandAction::ChangeRoomConfig {
        change: RoomConfigChange::UpdateFilter { index, change },
        success: success.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create_test_context;
    use crate::pogo::LocationRadius;

    fn create_test_area() -> LocationRadius {
        LocationRadius::new(30.04896, 31.22366, 1000.0)
    }

    #[test]
    fn test_filter_add_creates_config() {
        let command = FilterCommand::Add {
            kind: EventKind::Raid,
            area: create_test_area(),
        };

        let result = handle_filter(&create_test_context(), &command);

        let Some(CommandAction::UpdateRoomConfig { config, success }) = result.action else {
            panic!("expected UpdateRoomConfig, got {:?}", result.action);
        };
        assert_eq!(config.room_id, "!room:example.com");
        assert!(config.format_text);
        assert!(!config.accept_commands);
        assert_eq!(config.filter.len(), 1);
        assert!(config.filter[0].list_raids);
        assert!(!config.filter[0].list_wanted);
        assert!(config.filter[0].pokemon_ids.is_empty());
        assert_eq!(success, "added filter to roomconfig");
    }

    #[test]
    fn test_filter_add_limit() {
        let config = RoomConfig {
            room_id: "!room:example.com".to_owned(),
            filter: vec![PokemonFilter::default(); MAX_FILTERS_PER_ROOM],
            ..Default::default()
        };
        let mut context = create_test_context();
        context.room_config = Some(&config);

        let command = FilterCommand::Add {
            kind: EventKind::Spawn,
            area: create_test_area(),
        };
        let result = handle_filter(&context, &command);

        assert_eq!(result.reply.unwrap().text, FILTER_LIMIT_REACHED);
        assert!(result.action.is_none());
    }

    #[test]
    fn test_filter_rm_and_area() {
        let context = create_test_context();

        let result = handle_filter(&context, &FilterCommand::Remove { index: 2 });
        assert_eq!(
            result.action,
            Some(CommandAction::ChangeRoomConfig {
                change: RoomConfigChange::RemoveFilter { index: 2 },
                success: "removed from filter".to_owned(),
            })
        );

        let command = FilterCommand::Area {
            index: 0,
            area: create_test_area(),
        };
        let result = handle_filter(&context, &command);
        assert_eq!(
            result.action,
            Some(CommandAction::ChangeRoomConfig {
                change: RoomConfigChange::UpdateFilter {
                    index: 0,
                    change: FilterChange::ReplaceArea(create_test_area()),
                },
                success: "filter area updated".to_owned(),
            })
        );
    }

    #[test]
    fn test_filter_drop_only_warns() {
        let result = handle_filter(&create_test_context(), &FilterCommand::Drop);
        assert_eq!(result.reply.unwrap().text, FILTER_DROP_WARNING);
        assert!(result.action.is_none());

        let result = handle_filter(&create_test_context(), &FilterCommand::DropReally);
        assert_eq!(result.action, Some(CommandAction::ClearFilters));
    }

    #[test]
    fn test_filter_pokemon() {
        let result = handle_filter_pokemon(PokemonOp::Add, 1, &[16, 19]);
        assert_eq!(
            result.action,
            Some(CommandAction::ChangeRoomConfig {
                change: RoomConfigChange::UpdateFilter {
                    index: 1,
                    change: FilterChange::AddPokemon(vec![16, 19]),
                },
                success: "added to filter".to_owned(),
            })
        );

        let result = handle_filter_pokemon(PokemonOp::Remove, 0, &[16]);
        let Some(CommandAction::ChangeRoomConfig { success, .. }) = result.action else {
            panic!("expected ChangeRoomConfig");
        };
        assert_eq!(success, "removed from filter");
    }
}
