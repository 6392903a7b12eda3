//! Help command handler.
//!
//! Lists the command keywords. Stateless.

use log::debug;

use crate::commands::{
    CommandResult,
    command::KEYWORDS,
    responses::format_command_list,
};

/// Returns the list of known command keywords.
pub fn handle_help() -> CommandResult {
    debug!("handling help command");

    let keywords: Vec<&str> = KEYWORDS.iter().map(|entry| entry.name).collect();
    CommandResult::reply(format_command_list(&keywords))
}
