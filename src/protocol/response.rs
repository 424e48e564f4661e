//! Response definitions
//!
//! Represents responses to clients.

use crate::error::{KvError, Result};

/// Success payload of one executed command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Value for GET, empty for SET/DEL
    pub message: String,
}

impl QueryResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Acknowledgment for mutations
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A response line to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Command succeeded; payload may be empty
    Ok(String),

    /// GET on an absent key
    NotFound,

    /// Malformed or unknown command, shown verbatim
    Invalid(String),

    /// Any other execution failure, with the offending raw command
    Failed(String),

    /// Admission refused because the server is full
    Rejected,

    /// Request line longer than the configured limit
    TooLarge,
}

impl Response {
    pub const REJECTED_LINE: &'static str = "max connection limit reached";
    pub const NOT_FOUND_LINE: &'static str = "key not found";
    pub const TOO_LARGE_LINE: &'static str = "request too large";

    /// Map the outcome of `Executor::execute` onto a response
    pub fn from_outcome(raw: &str, outcome: Result<QueryResult>) -> Self {
        match outcome {
            Ok(result) => Response::Ok(result.message),
            Err(KvError::KeyNotFound(_)) => Response::NotFound,
            Err(KvError::Capacity) => Response::Rejected,
            Err(e) if e.is_validation() => Response::Invalid(e.to_string()),
            Err(_) => Response::Failed(raw.to_string()),
        }
    }

    /// Text of the response line, without the trailing newline
    pub fn to_line(&self) -> String {
        match self {
            Response::Ok(message) => message.clone(),
            Response::NotFound => Self::NOT_FOUND_LINE.to_string(),
            Response::Invalid(message) => message.clone(),
            Response::Failed(raw) => format!("An error while executing command: {}", raw),
            Response::Rejected => Self::REJECTED_LINE.to_string(),
            Response::TooLarge => Self::TOO_LARGE_LINE.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok(_))
    }
}
