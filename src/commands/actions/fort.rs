//! Fort lookup command handler.
//!
//! `fort near` reports the closest fort with its distance and bearing to the given
//! point, `fort info` prints a fort by GUID.

use log::debug;

use crate::commands::{
    CommandContext, CommandResult,
    command::FortCommand,
    responses::GEODEX_DISABLED,
};

pub fn handle_fort(context: &CommandContext, command: &FortCommand) -> CommandResult {
    debug!("handling fort command: {:?}", command);

    let Some(geodex) = context.geodex else {
        return CommandResult::reply(GEODEX_DISABLED);
    };

    let text = match command {
        FortCommand::Near { center, radius_m } => match geodex.nearest_fort(center, *radius_m) {
            Ok(fort) => {
                let location = fort.location();
                format!(
                    "{fort}\ndistance from fort to ({:.6},{:.6}): {:.0}m, bearing {:.0}°",
                    center.latitude,
                    center.longitude,
                    location.distance_to(center),
                    location.bearing_to(center)
                )
            }
            Err(_) => format!(
                "no fort found near ({:.6},{:.6}) in {} m radius",
                center.latitude, center.longitude, radius_m
            ),
        },
        FortCommand::Info { guid } => match geodex.fort(guid) {
            Ok(fort) => fort.to_string(),
            Err(_) => "no fort found with that GUID".to_owned(),
        },
    };

    CommandResult::reply(text)
}
