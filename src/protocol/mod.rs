//! Protocol Module
//!
//! Defines the line protocol for client-server communication.
//!
//! ## Requests
//! - `GET <key>`
//! - `SET <key> <value>`
//! - `DEL <key>`
//!
//! ## Responses
//! One newline-terminated line per request: the value for GET, an empty
//! line for SET/DEL, or an error message.

mod command;
mod parser;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use parser::parse;
pub use response::{QueryResult, Response};
pub use codec::{decode_line, encode_line, read_line, write_line, write_response, DELIMITER};
