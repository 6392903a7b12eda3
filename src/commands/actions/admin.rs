//! Admin command handler.
//!
//! Dumps the room config or room state as JSON, clears the room state or shuts the
//! bot down. The commander only lets configured admins get here.

use log::{debug, error};

use crate::commands::{
    CommandAction, CommandContext, CommandResult, Reply,
    command::AdminCommand,
    responses::{NO_ROOM_CONFIG, NO_ROOM_STATE, format_json_dump},
};

pub fn handle_admin(context: &CommandContext, command: &AdminCommand) -> CommandResult {
    debug!("handling admin command: {:?}", command);

    match command {
        AdminCommand::RoomConfig => match context.room_config {
            Some(config) => json_reply("RoomConfig", context.room_id, config),
            None => CommandResult::reply(NO_ROOM_CONFIG),
        },
        AdminCommand::RoomState => match context.room_state {
            Some(state) => json_reply("RoomState", context.room_id, state),
            None => CommandResult::reply(NO_ROOM_STATE),
        },
        AdminCommand::RoomStateClear => match context.room_state {
            Some(_) => CommandResult {
                reply: Some(Reply::text("room state cleared")),
                action: Some(CommandAction::ClearRoomState),
            },
            None => CommandResult::reply(NO_ROOM_STATE),
        },
        AdminCommand::Shutdown => CommandResult {
            reply: Some(Reply::text("shutting down")),
            action: Some(CommandAction::Shutdown),
        },
    }
}

fn json_reply(title: &str, room_id: &str, value: &impl serde::Serialize) -> CommandResult {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CommandResult {
            reply: Some(format_json_dump(title, room_id, &json)),
            action: None,
        },
        Err(e) => {
            error!("failed to serialize {title}: {e}");
            CommandResult::reply(format!("failed: {e}"))
        }
    }
}
