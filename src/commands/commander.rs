//! Command orchestration and execution.
//!
//! [`Commander`] is the entry point of the command layer. It parses chat lines
//! into [`Command`]s and routes them to their handlers.
//!
//! # Flow
//!
//! ```text
//! Matrix Message → parse() → Command → execute() → CommandResult
//! ```

use log::{debug, info};

use crate::commands::{
    CommandContext, CommandParseError, CommandResult,
    actions::{
        handle_admin, handle_filter, handle_filter_pokemon, handle_fort, handle_help, handle_mon,
        handle_status,
    },
    command::Command,
    responses::ADMIN_RESTRICTED,
};

/// Command orchestrator for parsing and executing bot commands.
///
/// Commands have no prefix: a line is a command when its first word is a known
/// keyword. Everything else is ignored ([`CommandParseError::NotForBot`]).
///
/// Restricted keywords (`admin`) are only executed for senders flagged as admin in
/// the [`CommandContext`].
#[derive(Debug, Default)]
pub struct Commander;

impl Commander {
    pub fn new() -> Self {
        Commander
    }

    /// Parses a Matrix message body into a structured command.
    ///
    /// # Arguments
    ///
    /// * `body` - The raw message text from Matrix
    ///
    /// # Returns
    ///
    /// * `Ok(Command)` - Successfully parsed and validated command
    /// * `Err(CommandParseError::NotForBot)` - Regular chat, stay silent
    /// * `Err(CommandParseError::InvalidCommand)` - Usage text to reply with
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let commander = Commander::new();
    /// assert!(commander.parse("help").is_ok());
    /// assert!(commander.parse("Hello, world!").is_err());
    /// ```
    pub fn parse(&self, body: &str) -> Result<Command, CommandParseError> {
        Command::parse(body)
    }

    /// Executes a parsed command and returns the result.
    ///
    /// # Arguments
    ///
    /// * `command` - The parsed command to execute
    /// * `context` - Read-only view of the room and the engine
    ///
    /// # Returns
    ///
    /// * `CommandResult` - Reply and requested state change. Restricted commands of
    ///   non-admins only get a refusal.
    pub fn execute(&self, command: &Command, context: &CommandContext) -> CommandResult {
        if !command.keyword().is_public() && !context.is_admin {
            info!(
                "refused restricted command {:?} from {} in {}",
                command.keyword(),
                context.sender,
                context.room_id
            );
            return CommandResult::reply(ADMIN_RESTRICTED);
        }

        debug!("executing command {:?} in {}", command, context.room_id);

        match command {
            Command::Help => handle_help(),
            Command::Status => handle_status(context),
            Command::Admin(admin) => handle_admin(context, admin),
            Command::Mon(query) => handle_mon(context, query),
            Command::Fort(fort) => handle_fort(context, fort),
            Command::Filter(filter) => handle_filter(context, filter),
            Command::FilterPokemon { op, index, ids, .. } => {
                handle_filter_pokemon(*op, *index, ids)
            }
        }
    }
}
