//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod cache;
pub mod clock;
pub mod dnd5e_api;
pub mod ports;
pub mod settings;
pub mod state_store;
pub mod storage;
