//! Command definitions
//!
//! Represents commands from clients.

use std::fmt;

/// Command verbs, matched case-sensitively on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Get,
    Set,
    Del,
}

impl CommandType {
    /// Wire spelling of the verb
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Get => "GET",
            CommandType::Set => "SET",
            CommandType::Del => "DEL",
        }
    }

    /// Look up a verb token, exact match only
    pub fn from_verb(verb: &str) -> Option<Self> {
        match verb {
            "GET" => Some(CommandType::Get),
            "SET" => Some(CommandType::Set),
            "DEL" => Some(CommandType::Del),
            _ => None,
        }
    }

    /// Number of tokens expected after the verb
    pub fn arity(&self) -> usize {
        match self {
            CommandType::Get | CommandType::Del => 1,
            CommandType::Set => 2,
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get a value by key
    Get { key: String },

    /// Upsert a key-value pair
    Set { key: String, value: String },

    /// Delete a key
    Del { key: String },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Set { .. } => CommandType::Set,
            Command::Del { .. } => CommandType::Del,
        }
    }

    /// The key every command addresses
    pub fn key(&self) -> &str {
        match self {
            Command::Get { key } | Command::Set { key, .. } | Command::Del { key } => key,
        }
    }

    /// Whether the command changes storage and therefore goes to the WAL
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Command::Get { .. })
    }

    /// Canonical WAL operation line, `None` for reads
    pub fn to_log_line(&self) -> Option<String> {
        self.is_mutating().then(|| self.to_string())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Get { key } => write!(f, "GET {}", key),
            Command::Set { key, value } => write!(f, "SET {} {}", key, value),
            Command::Del { key } => write!(f, "DEL {}", key),
        }
    }
}
