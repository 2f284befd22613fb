use crate::common::{NodeId, Position};

/// What the host knows about one cell touching a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdjacentCell {
    /// The cell hosts the given node.
    Node(NodeId),
    /// The cell's data is not loaded. This is not the same as an empty cell
    /// and makes the discovery pass inconclusive.
    Unknown(Position),
}

/// Spatial adjacency query provided by the host world.
pub trait AdjacencyOracle {
    /// Returns the touching cells around `position` that host a storage node
    /// or whose contents are unknown. Empty cells are omitted.
    fn adjacent(&self, position: Position) -> Vec<AdjacentCell>;
}
