//! Sparse cell grid served through [`storage_core::AdjacencyOracle`].
use std::collections::{HashMap, HashSet};

use storage_core::{AdjacencyOracle, AdjacentCell, Direction, NodeId, Position};
use strum::IntoEnumIterator;

/// Cells occupied by storage nodes plus the cells whose data is not loaded.
///
/// Unloaded cells are reported as [`AdjacentCell::Unknown`] even when a node
/// sits there, mirroring a world segment that has not been streamed in.
#[derive(Clone, Debug, Default)]
pub struct GridWorld {
    cells: HashMap<Position, NodeId>,
    unloaded: HashSet<Position>,
}

impl GridWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `node` at `position` and returns the previous occupant.
    pub fn occupy(&mut self, position: Position, node: NodeId) -> Option<NodeId> {
        self.cells.insert(position, node)
    }

    /// Clears `position` and returns the node that was there.
    pub fn vacate(&mut self, position: Position) -> Option<NodeId> {
        self.cells.remove(&position)
    }

    pub fn node_at(&self, position: Position) -> Option<NodeId> {
        self.cells.get(&position).copied()
    }

    pub fn unload(&mut self, position: Position) {
        self.unloaded.insert(position);
    }

    pub fn load(&mut self, position: Position) {
        self.unloaded.remove(&position);
    }

    pub fn is_loaded(&self, position: Position) -> bool {
        !self.unloaded.contains(&position)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl AdjacencyOracle for GridWorld {
    fn adjacent(&self, position: Position) -> Vec<AdjacentCell> {
        Direction::iter()
            .filter_map(|direction| {
                let cell = position.step(direction);
                if !self.is_loaded(cell) {
                    return Some(AdjacentCell::Unknown(cell));
                }
                self.node_at(cell).map(AdjacentCell::Node)
            })
            .collect()
    }
}
