//! Questboard engine library.
//!
//! Everything behind the `questboard` binary: persisted state, use cases,
//! the D&D 5e reference client and the terminal front end.
//!
//! ## Structure
//!
//! - `use_cases/` - User story orchestration over the state store
//! - `infrastructure/` - Ports and their adapters (storage, HTTP, clock, config)
//! - `api/` - Router, views and the interactive shell
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

/// End-to-end workflows driven through the shell.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
