//! Host-side implementations of the storage core's environment traits.
//!
//! [`GridWorld`] answers adjacency queries over a sparse cell grid and
//! [`DropLedger`] records items spilled by removed nodes. Both are plain
//! owned state; the host hands them to the network by reference.
mod drops;
mod grid;

pub use drops::{DropLedger, DroppedItem};
pub use grid::GridWorld;
