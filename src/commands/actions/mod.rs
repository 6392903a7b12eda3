//! Command action handlers.
//!
//! One handler per keyword. Each handler receives a
//! [`CommandContext`](crate::commands::CommandContext) and returns a
//! [`CommandResult`](crate::commands::CommandResult).
//!
//! # Available Handlers
//!
//! - [`handle_help`] - List the commands
//! - [`handle_status`] - Uptime and feed freshness
//! - [`handle_admin`] - Dump or clear room data, shut down
//! - [`handle_mon`] - Pokedex lookup
//! - [`handle_fort`] - Geodex lookup
//! - [`handle_filter`] - Add, remove, move or drop filters
//! - [`handle_filter_pokemon`] - Edit the species of a filter
//!
//! # State Changes
//!
//! Handlers don't modify state directly. Room config and room state edits are
//! returned as a [`CommandAction`](crate::commands::CommandAction).

mod admin;
mod filter;
mod fort;
mod help;
mod mon;
mod status;

pub use crate::commands::actions::{
    admin::handle_admin,
    filter::{handle_filter, handle_filter_pokemon},
    fort::handle_fort,
    help::handle_help,
    mon::handle_mon,
    status::handle_status,
};
