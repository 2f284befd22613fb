//! File-based repository implementations.

mod node;

pub use node::FileNodeRepository;
