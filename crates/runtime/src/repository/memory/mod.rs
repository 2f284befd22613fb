//! In-memory repository implementations for testing and development.

mod node;

pub use node::InMemoryNodeRepository;
