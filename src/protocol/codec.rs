//! Protocol codec
//!
//! Line framing for the wire protocol.
//!
//! ## Wire Format
//! ```text
//! request:  <VERB> <arg>...\n
//! response: <text>\n
//! ```
//! A `\r` before the newline is tolerated on input and never emitted.

use std::io::{BufRead, Write};

use crate::error::{KvError, Result};
use super::Response;

/// Line terminator
pub const DELIMITER: u8 = b'\n';

/// Strip the line terminator and validate UTF-8
pub fn decode_line(mut bytes: Vec<u8>) -> Result<String> {
    if bytes.last() == Some(&DELIMITER) {
        bytes.pop();
    }
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    String::from_utf8(bytes)
        .map_err(|e| KvError::Protocol(format!("request is not valid UTF-8: {}", e)))
}

/// Append the line terminator
pub fn encode_line(text: &str) -> Vec<u8> {
    let mut line = Vec::with_capacity(text.len() + 1);
    line.extend_from_slice(text.as_bytes());
    line.push(DELIMITER);
    line
}

/// Read one line; `Ok(None)` on a clean EOF
///
/// Blocks until a full line is received or an error occurs
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(DELIMITER, &mut buf)? == 0 {
        return Ok(None);
    }
    decode_line(buf).map(Some)
}

/// Write one line and flush
pub fn write_line<W: Write>(writer: &mut W, text: &str) -> Result<()> {
    writer.write_all(&encode_line(text))?;
    writer.flush()?;
    Ok(())
}

/// Write a response line and flush
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    write_line(writer, &response.to_line())
}
