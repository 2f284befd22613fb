//! Pooled storage network core.
//!
//! `storage-core` models storage nodes that touch each other and pool their
//! capacity into groups. It owns the item model, the per-node bin allocator,
//! the persisted record codec and the connectivity graph. Everything here is
//! synchronous; hosts drive it from their own scheduler and supply the world
//! through the traits in [`env`].
pub mod codec;
pub mod common;
pub mod config;
pub mod env;
pub mod error;
pub mod inventory;
pub mod item;
pub mod network;

pub use codec::CodecError;
pub use common::{BindingId, Direction, GroupId, NodeId, Position};
pub use config::Capacity;
pub use env::{AdjacencyOracle, AdjacentCell, DropSink};
pub use error::{ErrorSeverity, StorageError};
pub use inventory::{Bin, BinInventory, TransferMode};
pub use item::{ItemId, ItemVariant, LookVector, VariantTag};
pub use network::{
    ConnectivityGroup, ConnectivityManager, DiscoveryReport, GroupTotals, NetworkError,
    NodeState, NodeSummary, StorageNetwork, StorageNode, UnlinkMode,
};
