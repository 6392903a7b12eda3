//! Pokedex lookup command handler.

use log::debug;

use crate::commands::{
    CommandContext, CommandResult,
    command::MonQuery,
    responses::POKEDEX_DISABLED,
};

/// Looks up species by id list or by name.
pub fn handle_mon(context: &CommandContext, query: &MonQuery) -> CommandResult {
    debug!("handling mon command: {:?}", query);

    let Some(pokedex) = context.pokedex else {
        return CommandResult::reply(POKEDEX_DISABLED);
    };

    let text = match query {
        MonQuery::Ids(ids) => ids
            .iter()
            .map(|id| match pokedex.names_by_id(*id) {
                Ok((en, de)) => format!("#{id} English: {en}, German: {de}"),
                Err(_) => format!("#{id} not found"),
            })
            .collect::<Vec<String>>()
            .join("\n"),
        MonQuery::Name(name) => match pokedex.id_by_name(name) {
            Ok(entry) => format!(
                "#{} English: {}, German: {}",
                entry.id, entry.name_en, entry.name_de
            ),
            Err(e) => e.to_string(),
        },
    };

    CommandResult::reply(text)
}
