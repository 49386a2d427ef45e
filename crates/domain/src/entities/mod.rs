//! Entities - plain data structs with identity and no invariants to protect.

mod dice_roll;
mod item;
mod session;
mod user;

pub use dice_roll::DiceRollLogEntry;
pub use item::InventoryItem;
pub use session::{dedup_sessions, ScheduledSession};
pub use user::{Role, User};
