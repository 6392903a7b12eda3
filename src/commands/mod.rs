//! Chat commands.
//!
//! Rooms configure their subscriptions by writing commands into the chat, for
//! example `filter add spawn 52.52 13.405 800` followed by `spawn add 0 16,19`.
//!
//! # Architecture
//!
//! ```text
//! chat line
//!      │
//!      ▼
//! Commander::parse() ──► Command
//!      │
//!      ▼
//! Commander::execute(&Command, &CommandContext) ──► CommandResult
//!                                                    - reply
//!                                                    - requested action
//! ```
//!
//! Handlers never touch room configs or states. They read what they need from the
//! [`CommandContext`] and describe the wanted change as a [`CommandAction`], which
//! the processing engine applies and persists.
//!
//! # Commands
//!
//! | Command | Arguments | Description |
//! |---------|-----------|-------------|
//! | `help` | | List the commands |
//! | `status` | | Uptime and age of the last feed data |
//! | `admin` | `roomconfig\|roomstate\|roomstate_clear\|shutdown` | Admin tools |
//! | `mon` | `<id[,id...]>\|<name>` | Pokedex lookup |
//! | `fort` | `near <lat> <lon> [radius]\|info <guid>` | Fort lookup |
//! | `filter` | `add\|rm\|area\|drop\|dropreally` | Edit the room filters |
//! | `spawn`, `raid` | `add\|rm <filter_id> <id[,id...]>` | Edit the species of a filter |

use std::time::Duration;

mod actions;
mod command;
mod commander;
mod responses;

pub use crate::commands::{
    commander::Commander,
    responses::{NO_ROOM_CONFIG, format_mutation_failure},
};
use crate::{
    pogo::{GeoDex, Pokedex},
    rooms::{RoomConfig, RoomConfigChange, RoomState},
};

/// Read-only view of the engine state handed to command handlers.
#[derive(Debug)]
pub struct CommandContext<'a> {
    /// Room the command was written in
    pub room_id: &'a str,
    /// Matrix user who wrote the command
    pub sender: &'a str,
    pub is_admin: bool,
    pub room_config: Option<&'a RoomConfig>,
    pub room_state: Option<&'a RoomState>,
    pub pokedex: Option<&'a Pokedex>,
    pub geodex: Option<&'a GeoDex>,
    pub uptime: Duration,
    /// Time since the last feed event, `None` if nothing was received yet
    pub last_data: Option<Duration>,
}

/// A message for the room, with an optional HTML rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub html: Option<String>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply {
            text: text.into(),
            html: None,
        }
    }
}

/// State change requested by a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandAction {
    /// Create the room config or merge into it, then reply `success`.
    UpdateRoomConfig { config: RoomConfig, success: String },
    /// Apply a validated change, then reply `success` or the failure.
    ChangeRoomConfig {
        change: RoomConfigChange,
        success: String,
    },
    /// Remove every filter of the room.
    ClearFilters,
    /// Forget what was announced in the room.
    ClearRoomState,
    /// Persist and stop the engine.
    Shutdown,
}

/// Outcome of a command handler.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandResult {
    pub reply: Option<Reply>,
    pub action: Option<CommandAction>,
}

impl CommandResult {
    pub fn reply(text: impl Into<String>) -> Self {
        CommandResult {
            reply: Some(Reply::text(text)),
            action: None,
        }
    }

    pub fn action(action: CommandAction) -> Self {
        CommandResult {
            reply: None,
            action: Some(action),
        }
    }
}

/// Errors that can occur during command parsing.
///
/// * `NotForBot` - the line is not a command, stay silent
/// * `InvalidCommand` - the arguments are wrong, reply with the message
#[derive(Debug, PartialEq)]
pub enum CommandParseError {
    NotForBot,
    InvalidCommand(String),
}

#[cfg(test)]
pub fn create_test_context<'a>() -> CommandContext<'a> {
    CommandContext {
        room_id: "!room:example.com",
        sender: "@user:example.com",
        is_admin: false,
        room_config: None,
        room_state: None,
        pokedex: None,
        geodex: None,
        uptime: Duration::from_secs(3723),
        last_data: None,
    }
}
