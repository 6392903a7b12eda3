//! The processing engine.
//!
//! A [`Poster`] owns every room config and room state and is the only place they
//! are mutated. It consumes a fixed set of queues, one message at a time:
//!
//! ```text
//! webhook ──► gyms / spawns / raids ──┐
//! matrix  ──► messages ───────────────┼──► Poster::run ──► Chatter
//! main    ──► quit / stop ────────────┤         │
//! expiry timer ───────────────────────┘         └──► Persister
//! ```
//!
//! A spawn or raid is announced in every room whose filters match it, at most once
//! per room. Announced events are remembered in the room state until their end time
//! has passed and the periodic expiry sweep removes them.
//!
//! Sending is awaited inside the loop. A stalled chat transport stalls the engine,
//! and the room state is only updated once the send returned.
//!
//! # Stopping
//!
//! - `quit` returns immediately, nothing is persisted
//! - `stop` (or `admin shutdown`) saves all room states, runs the shutdown
//!   callback and returns

mod announce;
mod chatter;

use std::{collections::HashMap, time::Duration};

use chrono::Utc;
use log::{debug, error, info};
use tokio::{
    sync::mpsc,
    time::{self, Instant},
};

pub use crate::poster::chatter::Chatter;
use crate::{
    commands::{
        CommandAction, CommandContext, CommandParseError, Commander, NO_ROOM_CONFIG, Reply,
        format_mutation_failure,
    },
    pogo::{GeoDex, Gym, Pokedex, Raid, Spawn},
    poster::announce::{Announcement, announce_raid, announce_spawn},
    rooms::{EventKind, RoomConfig, RoomConfigs, RoomState, find_match},
    storage::Persister,
};

/// A chat line written by a user in a room the bot is in.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub room_id: String,
    pub sender: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct PosterSettings {
    /// Period of the expiry sweep over all room states
    pub expiry_check_period: Duration,
    /// Load room configs and room states before processing
    pub resume_state: bool,
    /// Matrix users allowed to run restricted commands. Empty allows everyone.
    pub admins: Vec<String>,
}

/// Sending side of the poster queues.
#[derive(Debug, Clone)]
pub struct PosterHandle {
    pub gyms: mpsc::Sender<Gym>,
    pub spawns: mpsc::Sender<Spawn>,
    pub raids: mpsc::Sender<Raid>,
    pub messages: mpsc::Sender<IncomingMessage>,
    quit: mpsc::Sender<()>,
    stop: mpsc::Sender<()>,
}

impl PosterHandle {
    /// Stops the poster without persisting anything.
    pub async fn quit(&self) {
        if self.quit.send(()).await.is_err() {
            debug!("poster already stopped");
        }
    }

    /// Stops the poster after saving the room states.
    pub async fn stop(&self) {
        if self.stop.send(()).await.is_err() {
            debug!("poster already stopped");
        }
    }
}

/// Receiving side of the poster queues, consumed by [`Poster::run`].
#[derive(Debug)]
pub struct PosterReceivers {
    pub(crate) gyms: mpsc::Receiver<Gym>,
    pub(crate) spawns: mpsc::Receiver<Spawn>,
    pub(crate) raids: mpsc::Receiver<Raid>,
    pub(crate) messages: mpsc::Receiver<IncomingMessage>,
    quit: mpsc::Receiver<()>,
    stop: mpsc::Receiver<()>,
}

/// Creates the poster queues. Event queues hold up to `queue_size` entries.
pub fn channel(queue_size: usize) -> (PosterHandle, PosterReceivers) {
    let queue_size = queue_size.max(1);
    let (gyms_tx, gyms) = mpsc::channel(queue_size);
    let (spawns_tx, spawns) = mpsc::channel(queue_size);
    let (raids_tx, raids) = mpsc::channel(queue_size);
    let (messages_tx, messages) = mpsc::channel(queue_size);
    let (quit_tx, quit) = mpsc::channel(1);
    let (stop_tx, stop) = mpsc::channel(1);

    (
        PosterHandle {
            gyms: gyms_tx,
            spawns: spawns_tx,
            raids: raids_tx,
            messages: messages_tx,
            quit: quit_tx,
            stop: stop_tx,
        },
        PosterReceivers {
            gyms,
            spawns,
            raids,
            messages,
            quit,
            stop,
        },
    )
}

/// Routes feed events to rooms and executes chat commands.
pub struct Poster<C: Chatter, P: Persister> {
    chatter: C,
    persister: P,
    commander: Commander,
    settings: PosterSettings,
    pokedex: Option<Pokedex>,
    geodex: Option<GeoDex>,
    room_configs: RoomConfigs,
    room_states: HashMap<String, RoomState>,
    start_time: Instant,
    /// When the last feed event arrived
    last_data: Option<Instant>,
    on_shutdown: Option<Box<dyn FnOnce() + Send>>,
}

impl<C: Chatter, P: Persister> Poster<C, P> {
    pub fn new(chatter: C, persister: P, settings: PosterSettings) -> Self {
        Poster {
            chatter,
            persister,
            commander: Commander::new(),
            settings,
            pokedex: None,
            geodex: None,
            room_configs: RoomConfigs::new(),
            room_states: HashMap::new(),
            start_time: Instant::now(),
            last_data: None,
            on_shutdown: None,
        }
    }

    pub fn with_pokedex(mut self, pokedex: Option<Pokedex>) -> Self {
        self.pokedex = pokedex;
        self
    }

    pub fn with_geodex(mut self, geodex: Option<GeoDex>) -> Self {
        self.geodex = geodex;
        self
    }

    /// Registers a callback run once after a graceful stop.
    pub fn on_shutdown(&mut self, callback: impl FnOnce() + Send + 'static) {
        self.on_shutdown = Some(Box::new(callback));
    }

    /// Processes the queues until a stop is requested.
    ///
    /// Returns when `quit` or `stop` is received, when `admin shutdown` is
    /// executed, or when every [`PosterHandle`] was dropped.
    pub async fn run(mut self, mut receivers: PosterReceivers) {
        if self.settings.resume_state {
            self.resume().await;
        }

        let period = self.settings.expiry_check_period;
        let mut expiry = time::interval_at(Instant::now() + period, period);
        info!(
            "poster running, expiry check every {}s",
            period.as_secs_f64()
        );

        loop {
            tokio::select! {
                quit = receivers.quit.recv() => {
                    match quit {
                        Some(()) => info!("quit requested, stopping without saving"),
                        None => info!("poster handles dropped, stopping without saving"),
                    }
                    return;
                }
                Some(()) = receivers.stop.recv() => {
                    self.shutdown().await;
                    return;
                }
                Some(gym) = receivers.gyms.recv() => self.process_gym(&gym),
                Some(spawn) = receivers.spawns.recv() => self.process_spawn(&spawn).await,
                Some(raid) = receivers.raids.recv() => self.process_raid(&raid).await,
                Some(message) = receivers.messages.recv() => {
                    if self.process_message(message).await {
                        self.shutdown().await;
                        return;
                    }
                }
                _ = expiry.tick() => self.remove_expired(Utc::now().timestamp()),
            }
        }
    }

    async fn resume(&mut self) {
        self.persister
            .read_room_configs(self.room_configs.as_map_mut())
            .await;
        self.persister.read_room_states(&mut self.room_states).await;
        info!(
            "resumed {} room configs and {} room states",
            self.room_configs.len(),
            self.room_states.len()
        );
    }

    async fn shutdown(&mut self) {
        info!("stopping poster, saving {} room states", self.room_states.len());
        self.persister.save_room_states(&self.room_states).await;

        if let Some(callback) = self.on_shutdown.take() {
            callback();
        }
    }

    fn process_gym(&mut self, gym: &Gym) {
        self.last_data = Some(Instant::now());
        debug!("gym {} is held by {:?}", gym.guid, gym.team);
    }

    async fn process_spawn(&mut self, spawn: &Spawn) {
        self.last_data = Some(Instant::now());
        let now = Utc::now().timestamp();

        for config in self.room_configs.values() {
            let state = self
                .room_states
                .entry(config.room_id.clone())
                .or_insert_with(RoomState::new);
            if state.is_spawn_posted(&spawn.encounter_id) {
                continue;
            }

            let matched = find_match(
                &config.filter,
                EventKind::Spawn,
                spawn.pokemon.id,
                &spawn.location,
            );
            if let Some(index) = matched {
                debug!(
                    "spawn {} matches filter {} of {}",
                    spawn.encounter_id, index, config.room_id
                );
                let announcement =
                    announce_spawn(spawn, self.pokedex.as_ref(), self.geodex.as_ref(), now);
                Self::announce(&self.chatter, config, &announcement).await;
                state.mark_spawn_posted(spawn);
            }
        }
    }

    async fn process_raid(&mut self, raid: &Raid) {
        self.last_data = Some(Instant::now());

        let Some(pokemon) = raid.pokemon else {
            debug!("raid {} is still an egg", raid.hash);
            return;
        };

        for config in self.room_configs.values() {
            let state = self
                .room_states
                .entry(config.room_id.clone())
                .or_insert_with(RoomState::new);
            if state.is_raid_posted(&raid.hash) {
                continue;
            }

            if find_match(&config.filter, EventKind::Raid, pokemon.id, &raid.location).is_none() {
                continue;
            }
            debug!("raid {} matches a filter of {}", raid.hash, config.room_id);
            let announcement =
                announce_raid(raid, &pokemon, self.pokedex.as_ref(), self.geodex.as_ref());
            Self::announce(&self.chatter, config, &announcement).await;
            state.mark_raid_posted(raid);
        }
    }

    async fn announce(chatter: &C, config: &RoomConfig, announcement: &Announcement) {
        if config.format_text {
            chatter
                .send_formatted_text(&config.room_id, &announcement.text, &announcement.html)
                .await;
        } else {
            chatter
                .send_text(&config.room_id, &announcement.text)
                .await;
        }
    }

    fn remove_expired(&mut self, now: i64) {
        let removed: usize = self
            .room_states
            .values_mut()
            .map(|state| state.remove_expired(now))
            .sum();
        if removed > 0 {
            debug!("removed {} expired entries from room states", removed);
        }
    }

    /// Parses and executes a chat line. Returns `true` when a shutdown was requested.
    async fn process_message(&mut self, message: IncomingMessage) -> bool {
        let command = match self.commander.parse(&message.body) {
            Ok(command) => command,
            Err(CommandParseError::NotForBot) => return false,
            Err(CommandParseError::InvalidCommand(usage)) => {
                self.chatter.send_text(&message.room_id, &usage).await;
                return false;
            }
        };

        let is_admin = self.settings.admins.is_empty()
            || self.settings.admins.iter().any(|admin| *admin == message.sender);
        let result = {
            let context = CommandContext {
                room_id: &message.room_id,
                sender: &message.sender,
                is_admin,
                room_config: self.room_configs.get(&message.room_id),
                room_state: self.room_states.get(&message.room_id),
                pokedex: self.pokedex.as_ref(),
                geodex: self.geodex.as_ref(),
                uptime: self.start_time.elapsed(),
                last_data: self.last_data.map(|instant| instant.elapsed()),
            };
            self.commander.execute(&command, &context)
        };

        if let Some(reply) = &result.reply {
            self.send_reply(&message.room_id, reply).await;
        }

        match result.action {
            Some(action) => self.apply_action(&message.room_id, action).await,
            None => false,
        }
    }

    async fn send_reply(&self, room_id: &str, reply: &Reply) {
        match &reply.html {
            Some(html) => {
                self.chatter
                    .send_formatted_text(room_id, &reply.text, html)
                    .await
            }
            None => self.chatter.send_text(room_id, &reply.text).await,
        }
    }

    /// Applies the state change requested by a command and persists the config.
    async fn apply_action(&mut self, room_id: &str, action: CommandAction) -> bool {
        match action {
            CommandAction::UpdateRoomConfig { config, success } => {
                if config.room_id != room_id {
                    error!("refusing to update {} from {}", config.room_id, room_id);
                    return false;
                }
                if self.room_configs.update(config) {
                    info!("created roomconfig of {}", room_id);
                }
                if let Some(config) = self.room_configs.get(room_id) {
                    self.persister.save_room_config(config).await;
                }
                self.chatter.send_text(room_id, &success).await;
            }
            CommandAction::ChangeRoomConfig { change, success } => {
                let reply = match self.room_configs.change(room_id, change) {
                    Ok(config) => {
                        self.persister.save_room_config(config).await;
                        success
                    }
                    Err(e) => format_mutation_failure(&e),
                };
                self.chatter.send_text(room_id, &reply).await;
            }
            CommandAction::ClearFilters => {
                let reply = match self.room_configs.clear_filters(room_id) {
                    Some(config) => {
                        self.persister.save_room_config(config).await;
                        "removed all filters in roomconfig"
                    }
                    None => NO_ROOM_CONFIG,
                };
                self.chatter.send_text(room_id, reply).await;
            }
            CommandAction::ClearRoomState => {
                if let Some(state) = self.room_states.get_mut(room_id) {
                    state.clear(true, true);
                }
            }
            CommandAction::Shutdown => {
                info!("shutdown requested from {}", room_id);
                return true;
            }
        }
        false
    }
}
