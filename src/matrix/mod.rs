//! Matrix transport of the bot.
//!
//! - [`MatrixClient`]: login, sync and message sending
//! - `session`: persisted login and sync token
//! - `sync`: auto-join and message forwarding

mod client;
mod session;
mod sync;

pub use crate::matrix::client::MatrixClient;

/// Credentials of the bot account.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// Homeserver URL. Discovered from the user id when unset.
    pub homeserver: Option<String>,
    pub user_id: String,
    pub password: String,
}
