//! Protocol Tests
//!
//! Parser, command encoding and line codec.

mod codec_tests;
