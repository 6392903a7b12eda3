use log::debug;

use crate::{
    commands::{CommandContext, CommandResult, responses::format_status},
    utils::format_duration,
};

/// Reports the uptime and how long ago the feed last sent data.
pub fn handle_status(context: &CommandContext) -> CommandResult {
    debug!("handling status command");

    let uptime = format_duration(context.uptime);
    let last_data = context.last_data.map(format_duration);

    CommandResult::reply(format_status(&uptime, last_data.as_deref()))
}
