//! Host runtime for the pooled storage network.
//!
//! This crate embeds [`storage_core::StorageNetwork`] in a small host that
//! owns a grid world, a drop ledger and a repository for node records. The
//! host drives the two ticks the core expects: a frequent save pass and a
//! low-frequency maintenance pass.
//!
//! Modules are organized by responsibility:
//! - [`host`] hosts the orchestrator and builder
//! - [`config`] reads runtime tunables from the environment
//! - [`oracle`] implements the core's environment traits over a grid
//! - [`repository`] persists encoded node records
pub mod config;
pub mod error;
pub mod host;
pub mod oracle;
pub mod repository;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use host::{Host, HostBuilder};
pub use oracle::{DropLedger, DroppedItem, GridWorld};
pub use repository::{FileNodeRepository, InMemoryNodeRepository, NodeRepository, RepositoryError};
