//! Reply texts of the bot commands.
//!
//! Replies are plain text. JSON dumps additionally come with an HTML code block.

use crate::{commands::Reply, utils::escape_html};

pub const ADMIN_USAGE: &str = "Usage: admin [roomconfig|roomstate[_clear]|shutdown]";
pub const ADMIN_RESTRICTED: &str = "this command is restricted to admins";
pub const MON_USAGE: &str = "Usage: mon <id[,id2[,id3...]]|name>\nLookup name or id in Pokedex";
pub const FORT_USAGE: &str = "Usage: fort [near|info]";
pub const FORT_NEAR_USAGE: &str = "Usage: fort near <lat> <lon> [radius_m=500]";
pub const FORT_INFO_USAGE: &str = "Usage: fort info <GUID>";
pub const FILTER_USAGE: &str = "Usage: filter [add|rm|area|drop]";
pub const FILTER_ADD_USAGE: &str = "Usage: filter add <raid|spawn> <lat> <lon> <radius_m>\nAdd a new filter that matches raids or spawns around the given location.";
pub const FILTER_RM_USAGE: &str = "Usage: filter rm <filter_id>\nRemove filter from RoomConfig.";
pub const FILTER_AREA_USAGE: &str =
    "Usage: filter area <filter_id> <lat> <lon> <radius_m>\nChange area for given filter id.";
pub const FILTER_DROP_WARNING: &str = "this removes ALL filters from this room IRREVOCABLY! type \"filter dropreally\" if you really intend to do this.";
pub const FILTER_LIMIT_REACHED: &str =
    "you've reached the allowed limit of filters a room can have";
pub const INVALID_PARAMETER: &str = "invalid parameter";
pub const INVALID_FLOAT: &str = "invalid float";
pub const INVALID_GUID: &str = "GUID contains invalid characters";
pub const POKEDEX_DISABLED: &str = "pokedex deactivated by admin";
pub const GEODEX_DISABLED: &str = "geodex deactivated by admin";
pub const NO_ROOM_CONFIG: &str = "no roomconfig found";
pub const NO_ROOM_STATE: &str = "room state doesn't exist";

pub fn format_command_list(keywords: &[&str]) -> String {
    if keywords.is_empty() {
        return "there are no commands".to_owned();
    }
    format!("commands: {}", keywords.join(" "))
}

/// Usage of the `spawn` and `raid` commands.
pub fn format_filter_pokemon_usage(verb: &str) -> String {
    format!("Usage: {verb} [add|rm]")
}

pub fn format_filter_pokemon_add_usage(verb: &str) -> String {
    format!("Usage: {verb} add <filter_id> <pkmn_id[,id2[,id3...]]>\nAppend Pokemon ID(s) to filter.")
}

pub fn format_filter_pokemon_rm_usage(verb: &str) -> String {
    format!("Usage: {verb} rm <filter_id> <pkmn_id[,id2[,id3...]]>\nRemove Pokemon ID(s) from filter.")
}

pub fn format_status(uptime: &str, last_data: Option<&str>) -> String {
    let last_data = match last_data {
        Some(ago) => format!("{ago} ago"),
        None => "never".to_owned(),
    };
    format!("Bot uptime: {uptime}\nLast MAD data: {last_data}")
}

pub fn format_mutation_failure(error: &impl std::fmt::Display) -> String {
    format!("failed: {error}")
}

/// Pretty JSON dump with a title, e.g. for `admin roomconfig`.
pub fn format_json_dump(title: &str, room_id: &str, json: &str) -> Reply {
    Reply {
        text: format!("{title} for `{room_id}`:\n```json\n{json}\n```"),
        html: Some(format!(
            "<p>{title} for <code>{room_id}</code>:</p>\n<pre><code class=\"language-json\">{}\n</code></pre>\n",
            escape_html(json)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_command_list() {
        assert_eq!(
            format_command_list(&["help", "status"]),
            "commands: help status"
        );
        assert_eq!(format_command_list(&[]), "there are no commands");
    }

    #[test]
    fn test_format_status() {
        assert_eq!(
            format_status("1h2m3s", None),
            "Bot uptime: 1h2m3s\nLast MAD data: never"
        );
        assert_eq!(
            format_status("1h2m3s", Some("4s")),
            "Bot uptime: 1h2m3s\nLast MAD data: 4s ago"
        );
    }

    #[test]
    fn test_format_json_dump() {
        let reply = format_json_dump("RoomConfig", "!abc:example.com", "{\"a\": \"<b>\"}");
        assert_eq!(
            reply.text,
            "RoomConfig for `!abc:example.com`:\n```json\n{\"a\": \"<b>\"}\n```"
        );
        let html = reply.html.unwrap();
        assert!(html.contains("<pre><code class=\"language-json\">"));
        assert!(html.contains("&quot;&lt;b&gt;&quot;"));
    }
}
