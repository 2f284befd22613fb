//! Repository layer for node records.
//!
//! Repositories hold the encoded bin record of every node that has changed
//! since it was placed, keyed by the node's cell. Records are opaque bytes
//! here; encoding and decoding belong to [`storage_core::codec`].

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileNodeRepository;
pub use memory::InMemoryNodeRepository;
pub use traits::NodeRepository;
