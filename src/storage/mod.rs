//! Storage Module
//!
//! The storage facade and the engine capability behind it.
//!
//! ## Responsibilities
//! - Define the three-method [`Engine`] contract
//! - Delegate every command to the engine, logging failures
//! - Ship a default in-memory engine
//!
//! ```text
//! Database ──▶ Storage (facade) ──▶ dyn Engine
//!                                     └─ InMemoryEngine
//! ```

mod engine;
mod facade;
mod memory;

pub use engine::Engine;
pub use facade::Storage;
pub use memory::InMemoryEngine;
