//! Network Tests
//!
//! Admission control and the TCP server, driven through real sockets on
//! ephemeral ports.

#[path = "../common/mod.rs"]
mod common;

mod registry_tests;
