//! Configuration of the bot.
//!
//! The configuration is read from a YAML file. Every value can be overridden with an
//! environment variable prefixed by `SPAWNSCOPE_`, nested keys being separated by `__`
//! (`SPAWNSCOPE_MATRIX__PASSWORD`).
//!
//! ```yaml
//! matrix:
//!   homeserver: "https://matrix.example.org"
//!   user_id: "@spawnscope:example.org"
//!   password: "secret"
//!   admins: ["@alice:example.org"]
//!
//! webhook:
//!   bind: "0.0.0.0:8080"
//!
//! poster:
//!   expiry_check_period: 30
//!   resume_state: true
//!   queue_size: 1024
//!
//! pokedex: "pokedex.json"
//! geodex: "forts.json"
//! ```

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

use crate::matrix::UserCredentials;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub matrix: Matrix,
    #[serde(default)]
    pub webhook: Webhook,
    #[serde(default)]
    pub poster: Poster,
    /// Path to the pokedex JSON file
    #[serde(default)]
    pub pokedex: Option<String>,
    /// Path to the fort JSON file
    #[serde(default)]
    pub geodex: Option<String>,
}

/// Matrix account of the bot.
#[derive(Debug, Clone, Deserialize)]
pub struct Matrix {
    /// Homeserver URL, discovered from `user_id` when unset
    #[serde(default)]
    pub homeserver: Option<String>,
    /// Fully qualified user id, `@spawnscope:example.org`
    pub user_id: String,
    pub password: String,
    /// Users allowed to run `admin` commands. Everyone may when empty.
    #[serde(default)]
    pub admins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Webhook {
    /// Address the webhook listens on
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for Webhook {
    fn default() -> Self {
        Webhook {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Poster {
    /// Seconds between two expiry sweeps
    #[serde(default = "default_expiry_check_period")]
    pub expiry_check_period: u64,
    /// Load room configs and states at startup
    #[serde(default = "default_resume_state")]
    pub resume_state: bool,
    /// Capacity of each poster queue
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
}

impl Default for Poster {
    fn default() -> Self {
        Poster {
            expiry_check_period: default_expiry_check_period(),
            resume_state: default_resume_state(),
            queue_size: default_queue_size(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_owned()
}

fn default_expiry_check_period() -> u64 {
    30
}

fn default_resume_state() -> bool {
    true
}

fn default_queue_size() -> usize {
    1024
}

impl Config {
    /// Loads the configuration from `path`, then applies the `SPAWNSCOPE_` environment
    /// variables on top of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or a required value is missing.
    pub fn load(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("SPAWNSCOPE_").split("__"))
            .extract()
    }

    pub fn user_credentials(&self) -> UserCredentials {
        UserCredentials {
            homeserver: self.matrix.homeserver.clone(),
            user_id: self.matrix.user_id.clone(),
            password: self.matrix.password.clone(),
        }
    }
}

impl Poster {
    /// Expiry sweep period, at least one second.
    pub fn expiry_check_period(&self) -> Duration {
        Duration::from_secs(self.expiry_check_period.max(1))
    }
}
