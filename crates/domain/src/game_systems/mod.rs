//! Game system rules.
//!
//! Only D&D 5th Edition is supported; the reference data API serves 5e content.

pub mod dnd5e;
