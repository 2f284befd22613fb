//! Traits describing the host environment.
//!
//! Oracles expose what the storage core cannot know on its own: which cells
//! border a node and where removed items go. Hosts implement them over their
//! own world representation; tests use small in-memory versions.
mod adjacency;
mod drops;

pub use adjacency::{AdjacencyOracle, AdjacentCell};
pub use drops::DropSink;
