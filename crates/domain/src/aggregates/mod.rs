//! Aggregates - entities that guard their own invariants
//!
//! Fields are private; state only changes through methods that return
//! outcome events or domain errors.

pub mod campaign;
pub mod character;
pub mod proposal;

pub use campaign::{Campaign, ChatMessage};
pub use character::{CatalogRef, Character};
pub use proposal::{ProposalOption, SessionProposal, VoteChoice, VoteTally};
