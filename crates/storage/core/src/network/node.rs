//! The storage node entity.

use std::collections::BTreeSet;

use crate::common::{GroupId, NodeId, Position};
use crate::config::Capacity;
use crate::inventory::{BinInventory, TransferMode};
use crate::item::ItemVariant;

/// Lifecycle of a node.
///
/// `Uninitialized → Discovering → Attached(group) → Removed`, with
/// `Attached → Discovering` re-entered whenever a maintenance tick reruns
/// discovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeState {
    Uninitialized,
    Discovering,
    Attached(GroupId),
    Removed,
}

/// How an edge removal treats the neighbor left behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnlinkMode {
    /// Drop the edge silently. Used while a node is being torn down so its
    /// neighbors do not start discovery passes of their own.
    Teardown,
    /// Drop the edge and schedule the neighbor for discovery on the next
    /// maintenance tick.
    Rediscover,
}

/// One physical storage unit: its bins, its edges and its group handle.
///
/// Graph and group fields are only mutated through
/// [`crate::StorageNetwork`], which keeps edges symmetric and groups
/// partitioned.
#[derive(Clone, Debug)]
pub struct StorageNode {
    id: NodeId,
    position: Position,
    inventory: BinInventory,
    neighbors: BTreeSet<NodeId>,
    group: Option<GroupId>,
    state: NodeState,
    /// Last discovery pass met an unloaded cell.
    inconclusive: bool,
    /// An edge was dropped in `Rediscover` mode since the last pass.
    rediscover: bool,
    /// Queued for the next save pass.
    dirty: bool,
}

impl StorageNode {
    pub(crate) fn new(id: NodeId, position: Position, capacity: Capacity) -> Self {
        Self {
            id,
            position,
            inventory: BinInventory::new(capacity),
            neighbors: BTreeSet::new(),
            group: None,
            state: NodeState::Uninitialized,
            inconclusive: false,
            rediscover: false,
            dirty: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    pub fn inventory(&self) -> &BinInventory {
        &self.inventory
    }

    pub fn neighbors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.neighbors.iter().copied()
    }

    pub fn has_neighbor(&self, other: NodeId) -> bool {
        self.neighbors.contains(&other)
    }

    pub fn num_items(&self) -> u64 {
        self.inventory.num_items()
    }

    pub fn max_items(&self) -> u32 {
        self.inventory.capacity().max_items
    }

    pub fn num_bins(&self) -> usize {
        self.inventory.num_bins()
    }

    pub fn max_bins(&self) -> usize {
        self.inventory.capacity().max_bins
    }

    pub fn max_bin_size(&self) -> u32 {
        self.inventory.capacity().max_bin_size
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the last discovery pass met an unloaded cell.
    pub fn is_inconclusive(&self) -> bool {
        self.inconclusive
    }

    /// Whether the next maintenance tick should rerun discovery.
    pub fn needs_discovery(&self) -> bool {
        self.state != NodeState::Removed
            && (self.group.is_none() || self.inconclusive || self.rediscover)
    }

    /// Offers `amount` units of `item` to this node's bins.
    pub fn give(&mut self, item: &ItemVariant, amount: u32, mode: TransferMode) -> bool {
        let accepted = self.inventory.give(item, amount, mode);
        tracing::debug!(node = %self.id, %item, amount, ?mode, accepted, "give");
        if accepted && mode.is_commit() {
            self.mark_dirty();
        }
        accepted
    }

    /// Requests up to `amount` units matching `item` from this node's bins.
    pub fn take(&mut self, item: &ItemVariant, amount: u32, mode: TransferMode) -> Option<ItemVariant> {
        let taken = self.inventory.take(item, amount, mode);
        tracing::debug!(node = %self.id, %item, amount, ?mode, found = taken.is_some(), "take");
        if taken.is_some() && mode.is_commit() {
            self.mark_dirty();
        }
        taken
    }

    /// Queues the node for the next save pass. Returns `false` if it was
    /// already queued.
    pub fn mark_dirty(&mut self) -> bool {
        !std::mem::replace(&mut self.dirty, true)
    }

    pub(crate) fn clear_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub(crate) fn restore(&mut self, items: Vec<ItemVariant>) -> usize {
        self.inventory.restore(items)
    }

    /// Adds an edge; self-edges and duplicates are ignored.
    pub(crate) fn add_neighbor(&mut self, other: NodeId) -> bool {
        other != self.id && self.neighbors.insert(other)
    }

    pub(crate) fn remove_neighbor(&mut self, other: NodeId, mode: UnlinkMode) -> bool {
        let removed = self.neighbors.remove(&other);
        if removed && mode == UnlinkMode::Rediscover {
            self.rediscover = true;
        }
        removed
    }

    pub(crate) fn set_group(&mut self, group: Option<GroupId>) {
        self.group = group;
        if let NodeState::Attached(_) = self.state {
            self.state = match group {
                Some(group) => NodeState::Attached(group),
                None => NodeState::Discovering,
            };
        }
    }

    pub(crate) fn begin_discovery(&mut self) {
        self.state = NodeState::Discovering;
    }

    pub(crate) fn finish_discovery(&mut self, inconclusive: bool) {
        self.inconclusive = inconclusive;
        self.rediscover = false;
        if let Some(group) = self.group {
            self.state = NodeState::Attached(group);
        }
    }

    /// Final teardown once edges and group membership are gone.
    pub(crate) fn retire(&mut self) -> Vec<ItemVariant> {
        self.neighbors.clear();
        self.group = None;
        self.dirty = false;
        self.inconclusive = false;
        self.rediscover = false;
        self.state = NodeState::Removed;
        self.inventory.drain()
    }
}
