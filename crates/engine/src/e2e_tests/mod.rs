//! End-to-end tests.
//!
//! These drive a fully wired [`App`](crate::App) through the shell exactly
//! as a user at the terminal would: in-memory storage, a fixed clock,
//! scripted dice and a mocked reference API.
//!
//! ```bash
//! cargo test -p questboard-engine --lib e2e_tests
//! ```

mod campaign_flow_tests;
mod e2e_helpers;
mod table_tools_tests;

pub use e2e_helpers::*;
