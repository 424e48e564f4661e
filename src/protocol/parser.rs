//! Request parser
//!
//! Turns one raw request line into a typed [`Command`]. Pure: no I/O, no
//! shared state.
//!
//! ## Grammar
//! ```text
//! GET <key>
//! SET <key> <value>
//! DEL <key>
//! ```
//!
//! Tokens are separated by any run of whitespace, so leading and trailing
//! whitespace never reaches a key or value. Verbs are case-sensitive.

use crate::error::{KvError, Result};
use super::{Command, CommandType};

/// Parse a raw command line
pub fn parse(raw: &str) -> Result<Command> {
    let mut tokens = raw.split_whitespace();

    let verb = tokens.next().unwrap_or_default();
    let command_type = CommandType::from_verb(verb)
        .ok_or_else(|| KvError::UnknownCommand(verb.to_string()))?;

    let args: Vec<&str> = tokens.collect();
    if args.len() != command_type.arity() {
        return Err(KvError::NotEnoughArguments {
            command: command_type.as_str(),
        });
    }

    let command = match command_type {
        CommandType::Get => Command::Get {
            key: args[0].to_string(),
        },
        CommandType::Set => Command::Set {
            key: args[0].to_string(),
            value: args[1].to_string(),
        },
        CommandType::Del => Command::Del {
            key: args[0].to_string(),
        },
    };

    Ok(command)
}
