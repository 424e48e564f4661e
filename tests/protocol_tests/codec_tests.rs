//! Codec Tests
//!
//! Tests for line framing and response rendering.

use std::io::Cursor;

use kvdb::protocol::{
    decode_line, encode_line, read_line, write_line, write_response, QueryResult, Response,
};
use kvdb::KvError;

// =============================================================================
// Line Framing
// =============================================================================

#[test]
fn test_encode_line_appends_newline() {
    assert_eq!(encode_line("GET a"), b"GET a\n".to_vec());
    assert_eq!(encode_line(""), b"\n".to_vec());
}

#[test]
fn test_decode_line_strips_terminators() {
    assert_eq!(decode_line(b"GET a\n".to_vec()).unwrap(), "GET a");
    assert_eq!(decode_line(b"GET a\r\n".to_vec()).unwrap(), "GET a");
    assert_eq!(decode_line(b"GET a".to_vec()).unwrap(), "GET a");
}

#[test]
fn test_decode_line_rejects_invalid_utf8() {
    let err = decode_line(vec![0x47, 0xff, 0xfe, b'\n']).unwrap_err();
    assert!(matches!(err, KvError::Protocol(_)));
}

#[test]
fn test_read_line_sequence_then_eof() {
    let mut cursor = Cursor::new(b"SET a 1\nGET a\n".to_vec());

    assert_eq!(read_line(&mut cursor).unwrap(), Some("SET a 1".to_string()));
    assert_eq!(read_line(&mut cursor).unwrap(), Some("GET a".to_string()));
    assert_eq!(read_line(&mut cursor).unwrap(), None);
}

#[test]
fn test_read_line_unterminated_tail() {
    let mut cursor = Cursor::new(b"DEL a".to_vec());
    assert_eq!(read_line(&mut cursor).unwrap(), Some("DEL a".to_string()));
    assert_eq!(read_line(&mut cursor).unwrap(), None);
}

#[test]
fn test_write_line() {
    let mut out = Vec::new();
    write_line(&mut out, "1").unwrap();
    write_line(&mut out, "").unwrap();
    assert_eq!(out, b"1\n\n".to_vec());
}

// =============================================================================
// Responses
// =============================================================================

#[test]
fn test_response_from_success() {
    let response = Response::from_outcome("GET a", Ok(QueryResult::new("1")));
    assert_eq!(response, Response::Ok("1".to_string()));
    assert_eq!(response.to_line(), "1");
}

#[test]
fn test_response_for_mutation_is_empty_line() {
    let response = Response::from_outcome("SET a 1", Ok(QueryResult::empty()));

    let mut out = Vec::new();
    write_response(&mut out, &response).unwrap();
    assert_eq!(out, b"\n".to_vec());
}

#[test]
fn test_response_validation_error_is_verbatim() {
    let response = Response::from_outcome("GET", Err(KvError::NotEnoughArguments { command: "GET" }));
    assert_eq!(response.to_line(), "not enough arguments for GET");
}

#[test]
fn test_response_engine_error_is_generic() {
    let response = Response::from_outcome("SET a 1", Err(KvError::Engine("disk on fire".to_string())));
    assert_eq!(response.to_line(), "An error while executing command: SET a 1");
    assert!(!response.to_line().contains("disk"));
}

#[test]
fn test_response_not_found() {
    let response = Response::from_outcome("GET a", Err(KvError::KeyNotFound("a".to_string())));
    assert_eq!(response, Response::NotFound);
    assert_eq!(response.to_line(), "key not found");
}

#[test]
fn test_response_rejected_line() {
    assert_eq!(Response::Rejected.to_line(), "max connection limit reached");
    assert!(!Response::Rejected.is_ok());
}

#[test]
fn test_capacity_error_maps_to_rejection() {
    let response = Response::from_outcome("", Err(KvError::Capacity));
    assert_eq!(response, Response::Rejected);
}
