//! Neighbor discovery.
//!
//! A pass asks the adjacency oracle for the cells touching a node, links the
//! node to every live storage node found there and folds the groups together.
//! Unloaded cells make the pass inconclusive so the maintenance tick retries
//! it; they never fail it.

use crate::common::NodeId;
use crate::env::{AdjacencyOracle, AdjacentCell};
use crate::network::{NetworkError, StorageNetwork};

/// Outcome of one discovery pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Neighbors found during this pass, in oracle order.
    pub neighbors: Vec<NodeId>,
    /// At least one touching cell was unloaded.
    pub inconclusive: bool,
}

impl StorageNetwork {
    /// Runs one discovery pass for `node`.
    pub fn discover<O>(&mut self, node: NodeId, oracle: &O) -> Result<DiscoveryReport, NetworkError>
    where
        O: AdjacencyOracle + ?Sized,
    {
        let entry = self
            .nodes
            .get_mut(&node)
            .ok_or(NetworkError::UnknownNode(node))?;
        entry.begin_discovery();
        let position = entry.position();

        let mut inconclusive = false;
        let mut neighbors = Vec::new();
        for cell in oracle.adjacent(position) {
            match cell {
                AdjacentCell::Unknown(at) => {
                    tracing::debug!(%node, %at, "adjacent cell not loaded");
                    inconclusive = true;
                }
                AdjacentCell::Node(other) if other != node && self.nodes.contains_key(&other) => {
                    if !neighbors.contains(&other) {
                        neighbors.push(other);
                    }
                }
                AdjacentCell::Node(other) => {
                    tracing::trace!(%node, %other, "ignoring cell that hosts no live storage node");
                }
            }
        }

        // Candidates without a group are adopted once this node has one.
        let mut orphans = Vec::new();
        for &other in &neighbors {
            self.link(node, other);
            match (self.group_of(node), self.group_of(other)) {
                (None, Some(theirs)) => {
                    self.groups.attach(&mut self.nodes, node, theirs)?;
                }
                (Some(ours), Some(theirs)) if ours != theirs => {
                    self.groups.merge(&mut self.nodes, ours, theirs)?;
                }
                (_, None) => orphans.push(other),
                _ => {}
            }
        }

        let group = self.groups.add(&mut self.nodes, node)?;
        for orphan in orphans {
            let current = self.group_of(node).unwrap_or(group);
            self.groups.attach(&mut self.nodes, orphan, current)?;
        }

        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.finish_discovery(inconclusive);
        }
        tracing::debug!(
            %node,
            neighbors = neighbors.len(),
            inconclusive,
            group = ?self.group_of(node),
            "discovery finished"
        );

        Ok(DiscoveryReport {
            neighbors,
            inconclusive,
        })
    }

    /// Adds the edge in both directions. Idempotent.
    fn link(&mut self, a: NodeId, b: NodeId) {
        if let Some(node) = self.nodes.get_mut(&a) {
            node.add_neighbor(b);
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            node.add_neighbor(a);
        }
    }
}
