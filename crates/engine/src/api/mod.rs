//! Terminal front end: fragment router, text views and the command shell.

pub mod router;
pub mod shell;
pub mod timer;
pub mod views;

pub use router::Route;
pub use shell::{ConsoleInput, Flow, Shell, StdinAbilityChooser};
