//! Command implementations
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod clean;
mod demo;
mod inspect;
mod list;

pub use clean::Clean;
pub use demo::Demo;
pub use inspect::Inspect;
pub use list::List;
