//! Storage network: nodes, their edges and the groups pooling them.
//!
//! [`StorageNetwork`] owns every live node and the group arena. All mutation
//! is synchronous and expected to run on the host's single scheduling thread;
//! the host drives [`StorageNetwork::maintenance_tick`] on its low-frequency
//! tick and drains [`StorageNetwork::drain_save_queue`] on its save pass.
mod discovery;
mod error;
mod group;
mod node;
mod summary;

use std::collections::BTreeMap;

pub use discovery::DiscoveryReport;
pub use error::NetworkError;
pub use group::{ConnectivityGroup, ConnectivityManager, GroupTotals};
pub use node::{NodeState, StorageNode, UnlinkMode};
pub use summary::NodeSummary;

use crate::common::{BindingId, GroupId, NodeId, Position};
use crate::config::Capacity;
use crate::env::{AdjacencyOracle, DropSink};
use crate::inventory::TransferMode;
use crate::item::ItemVariant;
use group::NodeTable;

/// Every live node plus the groups partitioning them.
#[derive(Debug, Default)]
pub struct StorageNetwork {
    nodes: NodeTable,
    groups: ConnectivityManager,
    bindings: BTreeMap<BindingId, NodeId>,
    next_node: u32,
    next_binding: u32,
}

impl StorageNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty node at `position` and runs its first discovery pass.
    pub fn place<O>(&mut self, position: Position, capacity: Capacity, oracle: &O) -> NodeId
    where
        O: AdjacencyOracle + ?Sized,
    {
        self.place_restored(position, capacity, Vec::new(), oracle)
    }

    /// Creates a node holding previously persisted `items`, then runs its
    /// first discovery pass. Items that do not fit `capacity` are dropped.
    pub fn place_restored<O>(
        &mut self,
        position: Position,
        capacity: Capacity,
        items: Vec<ItemVariant>,
        oracle: &O,
    ) -> NodeId
    where
        O: AdjacencyOracle + ?Sized,
    {
        let id = NodeId(self.next_node);
        self.next_node += 1;

        let mut node = StorageNode::new(id, position, capacity);
        let dropped = node.restore(items);
        if dropped > 0 {
            tracing::warn!(node = %id, dropped, "restored node lost items");
        }
        self.nodes.insert(id, node);
        tracing::debug!(node = %id, %position, "node created");

        if let Err(err) = self.discover(id, oracle) {
            // The node was inserted above, so only a corrupted arena gets here;
            // the maintenance tick regroups the node.
            tracing::error!(node = %id, %err, "initial discovery failed");
        }
        id
    }

    /// Tears a node down.
    ///
    /// Edges are dropped on both sides without scheduling discovery on the
    /// neighbors, the node leaves its group (which is not re-split), every
    /// remaining item goes to `sink` at the node's position and all bindings
    /// to the node are detached. Returns the retired node.
    pub fn remove<S>(&mut self, node: NodeId, sink: &mut S) -> Result<StorageNode, NetworkError>
    where
        S: DropSink + ?Sized,
    {
        let neighbors: Vec<NodeId> = self
            .nodes
            .get(&node)
            .ok_or(NetworkError::UnknownNode(node))?
            .neighbors()
            .collect();
        for other in &neighbors {
            if let Some(entry) = self.nodes.get_mut(other) {
                entry.remove_neighbor(node, UnlinkMode::Teardown);
            }
        }

        self.groups.remove(&mut self.nodes, node)?;

        let mut retired = self
            .nodes
            .remove(&node)
            .ok_or(NetworkError::UnknownNode(node))?;
        let position = retired.position();
        let items = retired.retire();
        let dropped = items.len();
        for item in items {
            sink.drop_item(item, position);
        }

        let before = self.bindings.len();
        self.bindings.retain(|_, target| *target != node);
        let detached = before - self.bindings.len();

        tracing::info!(
            %node,
            neighbors = neighbors.len(),
            dropped,
            detached,
            "node removed"
        );
        Ok(retired)
    }

    /// Drops the edge between `a` and `b` on both sides.
    pub fn unlink(&mut self, a: NodeId, b: NodeId, mode: UnlinkMode) -> Result<(), NetworkError> {
        for id in [a, b] {
            if !self.nodes.contains_key(&id) {
                return Err(NetworkError::UnknownNode(id));
            }
        }
        if let Some(node) = self.nodes.get_mut(&a) {
            node.remove_neighbor(b, mode);
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            node.remove_neighbor(a, mode);
        }
        Ok(())
    }

    /// Low-frequency tick: reruns discovery for every node without a group,
    /// with an inconclusive last pass, or scheduled by an unlink. Returns how
    /// many nodes were rediscovered.
    pub fn maintenance_tick<O>(&mut self, oracle: &O) -> usize
    where
        O: AdjacencyOracle + ?Sized,
    {
        let pending: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| node.needs_discovery())
            .map(StorageNode::id)
            .collect();

        for &node in &pending {
            tracing::debug!(
                %node,
                grouped = self.group_of(node).is_some(),
                "looking for neighbors again"
            );
            if let Err(err) = self.discover(node, oracle) {
                tracing::warn!(%node, %err, "rediscovery failed");
            }
        }
        pending.len()
    }

    /// Public union of two groups; see [`ConnectivityManager`] for the
    /// survivor rule.
    pub fn merge_groups(&mut self, a: GroupId, b: GroupId) -> Result<GroupId, NetworkError> {
        self.groups.merge(&mut self.nodes, a, b)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn node(&self, node: NodeId) -> Option<&StorageNode> {
        self.nodes.get(&node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &StorageNode> {
        self.nodes.values()
    }

    pub fn groups(&self) -> &ConnectivityManager {
        &self.groups
    }

    pub fn group(&self, group: GroupId) -> Option<&ConnectivityGroup> {
        self.groups.get(group)
    }

    pub fn group_of(&self, node: NodeId) -> Option<GroupId> {
        self.nodes.get(&node).and_then(StorageNode::group)
    }

    pub fn group_totals(&self, group: GroupId) -> Option<GroupTotals> {
        self.groups.totals(&self.nodes, group)
    }

    pub fn group_num_items(&self, group: GroupId) -> Option<u64> {
        self.groups.num_items(&self.nodes, group)
    }

    pub fn group_max_items(&self, group: GroupId) -> Option<u64> {
        self.groups.max_items(&self.nodes, group)
    }

    /// Offers items to a single node.
    pub fn give(
        &mut self,
        node: NodeId,
        item: &ItemVariant,
        amount: u32,
        mode: TransferMode,
    ) -> Result<bool, NetworkError> {
        let entry = self
            .nodes
            .get_mut(&node)
            .ok_or(NetworkError::UnknownNode(node))?;
        Ok(entry.give(item, amount, mode))
    }

    /// Requests items from a single node.
    pub fn take(
        &mut self,
        node: NodeId,
        item: &ItemVariant,
        amount: u32,
        mode: TransferMode,
    ) -> Result<Option<ItemVariant>, NetworkError> {
        let entry = self
            .nodes
            .get_mut(&node)
            .ok_or(NetworkError::UnknownNode(node))?;
        Ok(entry.take(item, amount, mode))
    }

    /// Hands an external transfer actor a handle to `node`'s give/take
    /// entry points. The handle detaches when the node is removed.
    pub fn bind(&mut self, node: NodeId) -> Result<BindingId, NetworkError> {
        if !self.nodes.contains_key(&node) {
            return Err(NetworkError::UnknownNode(node));
        }
        let binding = BindingId(self.next_binding);
        self.next_binding += 1;
        self.bindings.insert(binding, node);
        Ok(binding)
    }

    pub fn binding_target(&self, binding: BindingId) -> Option<NodeId> {
        self.bindings.get(&binding).copied()
    }

    pub fn give_via(
        &mut self,
        binding: BindingId,
        item: &ItemVariant,
        amount: u32,
        mode: TransferMode,
    ) -> Result<bool, NetworkError> {
        let node = self
            .binding_target(binding)
            .ok_or(NetworkError::DetachedBinding(binding))?;
        self.give(node, item, amount, mode)
    }

    pub fn take_via(
        &mut self,
        binding: BindingId,
        item: &ItemVariant,
        amount: u32,
        mode: TransferMode,
    ) -> Result<Option<ItemVariant>, NetworkError> {
        let node = self
            .binding_target(binding)
            .ok_or(NetworkError::DetachedBinding(binding))?;
        self.take(node, item, amount, mode)
    }

    /// Queues `node` for the next save pass. Returns `false` if it was
    /// already queued.
    pub fn mark_dirty(&mut self, node: NodeId) -> Result<bool, NetworkError> {
        let entry = self
            .nodes
            .get_mut(&node)
            .ok_or(NetworkError::UnknownNode(node))?;
        Ok(entry.mark_dirty())
    }

    /// Nodes marked since the last call, in id order. Each marking is
    /// reported once.
    pub fn drain_save_queue(&mut self) -> Vec<NodeId> {
        self.nodes
            .values_mut()
            .filter_map(|node| node.clear_dirty().then(|| node.id()))
            .collect()
    }

    pub fn summary(&self, node: NodeId) -> Result<NodeSummary, NetworkError> {
        let entry = self
            .nodes
            .get(&node)
            .ok_or(NetworkError::UnknownNode(node))?;
        Ok(NodeSummary {
            node,
            group: entry.group().and_then(|group| self.group_totals(group)),
            num_items: entry.num_items(),
            max_items: entry.max_items(),
            bins: entry.inventory().items().map(ToString::to_string).collect(),
        })
    }
}
