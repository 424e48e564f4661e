//! Tests for WAL Entry
//!
//! These tests verify:
//! - Row rendering `<unix_ts> <operation_line>`
//! - Row parsing and corruption detection
//! - Timestamp stamping

use kvdb::wal::{unix_now, WalEntry};
use kvdb::KvError;

#[test]
fn test_to_row() {
    let entry = WalEntry::with_timestamp(1718000000, "SET alpha 1");
    assert_eq!(entry.to_row(), "1718000000 SET alpha 1");
}

#[test]
fn test_from_row() {
    let entry = WalEntry::from_row("1718000000 DEL alpha\n").unwrap();
    assert_eq!(entry.timestamp, 1718000000);
    assert_eq!(entry.operation_line, "DEL alpha");
}

#[test]
fn test_from_row_keeps_operation_spacing() {
    let entry = WalEntry::from_row("5 SET k v").unwrap();
    assert_eq!(entry, WalEntry::with_timestamp(5, "SET k v"));
}

#[test]
fn test_from_row_rejects_garbage() {
    for row in ["garbage", "abc SET a 1", "123 ", "123", "", "-1 SET a 1"] {
        let err = WalEntry::from_row(row).unwrap_err();
        assert!(matches!(err, KvError::WalCorruption(_)), "row {:?} gave {:?}", row, err);
    }
}

#[test]
fn test_new_stamps_current_time() {
    let before = unix_now();
    let entry = WalEntry::new("SET a 1");
    let after = unix_now();

    assert!(entry.timestamp >= before && entry.timestamp <= after);
    assert_eq!(entry.operation_line, "SET a 1");
}
