//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Local storage (file on disk, memory in tests)
//! - Reference data (D&D 5e REST API)
//! - Interactive prompts (ability score improvements)
//! - Clock/Random (for testing)

mod error;
mod external;
mod storage;
mod testing;

pub use error::{ReferenceError, StorageError};
pub use external::{
    AbilityChoicePort, AbilityIncreasePrompt, ApiReference, ClassDetails, EquipmentDetails,
    ReferenceDataPort,
};
pub use storage::StorageProvider;
pub use testing::{ClockPort, RandomPort};

#[cfg(test)]
pub use external::{MockAbilityChoicePort, MockReferenceDataPort};
#[cfg(test)]
pub use testing::MockClockPort;
