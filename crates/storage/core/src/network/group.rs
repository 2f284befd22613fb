//! Connectivity groups over storage nodes.
//!
//! Groups live in an arena keyed by [`GroupId`]; nodes hold the handle, never
//! the group itself. Groups are only ever created as singletons and grown by
//! merging. Removing a node never splits its group, even when the remaining
//! members no longer touch: they stay pooled until the group empties.

use std::collections::{BTreeMap, BTreeSet};

use crate::common::{GroupId, NodeId};
use crate::network::NetworkError;
use crate::network::node::StorageNode;

pub(crate) type NodeTable = BTreeMap<NodeId, StorageNode>;

/// Member set of one group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectivityGroup {
    id: GroupId,
    members: BTreeSet<NodeId>,
}

impl ConnectivityGroup {
    fn singleton(id: GroupId, node: NodeId) -> Self {
        Self {
            id,
            members: BTreeSet::from([node]),
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    pub fn members(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().copied()
    }
}

/// Pool-wide totals of a group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupTotals {
    pub members: usize,
    pub num_items: u64,
    pub max_items: u64,
    pub num_bins: usize,
    pub max_bins: usize,
}

/// Arena of groups partitioning the live nodes.
#[derive(Clone, Debug, Default)]
pub struct ConnectivityManager {
    groups: BTreeMap<GroupId, ConnectivityGroup>,
    next_group: u32,
}

impl ConnectivityManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, group: GroupId) -> Option<&ConnectivityGroup> {
        self.groups.get(&group)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectivityGroup> {
        self.groups.values()
    }

    /// Gives `node` a fresh singleton group unless it already has one.
    /// Returns the node's group either way.
    pub(crate) fn add(&mut self, nodes: &mut NodeTable, node: NodeId) -> Result<GroupId, NetworkError> {
        let entry = nodes.get_mut(&node).ok_or(NetworkError::UnknownNode(node))?;
        if let Some(group) = entry.group() {
            return Ok(group);
        }

        let id = GroupId(self.next_group);
        self.next_group += 1;
        self.groups.insert(id, ConnectivityGroup::singleton(id, node));
        entry.set_group(Some(id));
        tracing::debug!(%node, group = %id, "created singleton group");
        Ok(id)
    }

    /// Places a groupless `node` into `group`. A node that already belongs
    /// to another group has its group merged with `group` instead.
    pub(crate) fn attach(
        &mut self,
        nodes: &mut NodeTable,
        node: NodeId,
        group: GroupId,
    ) -> Result<GroupId, NetworkError> {
        let current = nodes.get(&node).ok_or(NetworkError::UnknownNode(node))?.group();
        match current {
            Some(current) => self.merge(nodes, current, group),
            None => {
                let target = self
                    .groups
                    .get_mut(&group)
                    .ok_or(NetworkError::UnknownGroup(group))?;
                target.members.insert(node);
                if let Some(entry) = nodes.get_mut(&node) {
                    entry.set_group(Some(group));
                }
                tracing::debug!(%node, %group, "joined group");
                Ok(group)
            }
        }
    }

    /// Unions two groups and returns the survivor.
    ///
    /// The larger group survives; equal sizes keep the older (lower) handle,
    /// so the result does not depend on argument order.
    pub(crate) fn merge(
        &mut self,
        nodes: &mut NodeTable,
        a: GroupId,
        b: GroupId,
    ) -> Result<GroupId, NetworkError> {
        let len_a = self.get(a).ok_or(NetworkError::UnknownGroup(a))?.len();
        let len_b = self.get(b).ok_or(NetworkError::UnknownGroup(b))?.len();
        if a == b {
            return Ok(a);
        }

        let (survivor, absorbed) = if len_a > len_b || (len_a == len_b && a < b) {
            (a, b)
        } else {
            (b, a)
        };

        let moved = self
            .groups
            .remove(&absorbed)
            .ok_or(NetworkError::UnknownGroup(absorbed))?;
        for member in moved.members() {
            if let Some(entry) = nodes.get_mut(&member) {
                entry.set_group(Some(survivor));
            }
        }
        let target = self
            .groups
            .get_mut(&survivor)
            .ok_or(NetworkError::UnknownGroup(survivor))?;
        target.members.extend(moved.members);

        tracing::debug!(%survivor, %absorbed, members = target.len(), "merged groups");
        Ok(survivor)
    }

    /// Ejects `node` from its group and clears the node's handle. The group
    /// is abandoned once it has no members. The remaining members are not
    /// re-examined for connectivity.
    pub(crate) fn remove(&mut self, nodes: &mut NodeTable, node: NodeId) -> Result<(), NetworkError> {
        let entry = nodes.get_mut(&node).ok_or(NetworkError::UnknownNode(node))?;
        let Some(group) = entry.group() else {
            return Ok(());
        };
        entry.set_group(None);

        if let Some(members) = self.groups.get_mut(&group) {
            members.members.remove(&node);
            if members.is_empty() {
                self.groups.remove(&group);
                tracing::debug!(%group, "abandoned empty group");
            }
        }
        Ok(())
    }

    pub(crate) fn totals(&self, nodes: &NodeTable, group: GroupId) -> Option<GroupTotals> {
        let group = self.groups.get(&group)?;
        let totals = group
            .members()
            .filter_map(|member| nodes.get(&member))
            .fold(GroupTotals::default(), |mut totals, node| {
                totals.members += 1;
                totals.num_items += node.num_items();
                totals.max_items += u64::from(node.max_items());
                totals.num_bins += node.num_bins();
                totals.max_bins += node.max_bins();
                totals
            });
        Some(totals)
    }

    pub(crate) fn num_items(&self, nodes: &NodeTable, group: GroupId) -> Option<u64> {
        self.totals(nodes, group).map(|totals| totals.num_items)
    }

    pub(crate) fn max_items(&self, nodes: &NodeTable, group: GroupId) -> Option<u64> {
        self.totals(nodes, group).map(|totals| totals.max_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Position;
    use crate::config::Capacity;

    fn table(count: u32) -> NodeTable {
        (0..count)
            .map(|i| {
                let id = NodeId(i);
                (id, StorageNode::new(id, Position::new(i as i32, 0, 0), Capacity::default()))
            })
            .collect()
    }

    fn members(manager: &ConnectivityManager, group: GroupId) -> Vec<NodeId> {
        manager.get(group).unwrap().members().collect()
    }

    #[test]
    fn add_is_a_no_op_for_grouped_nodes() {
        let mut nodes = table(1);
        let mut manager = ConnectivityManager::new();
        let first = manager.add(&mut nodes, NodeId(0)).unwrap();
        let second = manager.add(&mut nodes, NodeId(0)).unwrap();
        assert_eq!(first, second);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn merging_a_group_with_itself_changes_nothing() {
        let mut nodes = table(2);
        let mut manager = ConnectivityManager::new();
        let g = manager.add(&mut nodes, NodeId(0)).unwrap();
        manager.attach(&mut nodes, NodeId(1), g).unwrap();

        assert_eq!(manager.merge(&mut nodes, g, g).unwrap(), g);
        assert_eq!(members(&manager, g), vec![NodeId(0), NodeId(1)]);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn larger_group_survives_and_members_are_rehomed() {
        let mut nodes = table(3);
        let mut manager = ConnectivityManager::new();
        let small = manager.add(&mut nodes, NodeId(0)).unwrap();
        let big = manager.add(&mut nodes, NodeId(1)).unwrap();
        manager.attach(&mut nodes, NodeId(2), big).unwrap();

        let survivor = manager.merge(&mut nodes, small, big).unwrap();
        assert_eq!(survivor, big);
        assert!(manager.get(small).is_none());
        assert!(nodes.values().all(|node| node.group() == Some(big)));
    }

    #[test]
    fn merge_order_does_not_change_the_result() {
        let build = || {
            let mut nodes = table(2);
            let mut manager = ConnectivityManager::new();
            let g1 = manager.add(&mut nodes, NodeId(0)).unwrap();
            let g2 = manager.add(&mut nodes, NodeId(1)).unwrap();
            (nodes, manager, g1, g2)
        };

        let (mut nodes, mut forward, g1, g2) = build();
        let s1 = forward.merge(&mut nodes, g1, g2).unwrap();
        // Merging again through the survivor handle is a no-op.
        assert_eq!(forward.merge(&mut nodes, s1, s1).unwrap(), s1);

        let (mut other_nodes, mut backward, g1, g2) = build();
        let s2 = backward.merge(&mut other_nodes, g2, g1).unwrap();

        assert_eq!(s1, s2);
        assert_eq!(members(&forward, s1), members(&backward, s2));
    }

    #[test]
    fn stale_handle_is_reported() {
        let mut nodes = table(2);
        let mut manager = ConnectivityManager::new();
        let g1 = manager.add(&mut nodes, NodeId(0)).unwrap();
        let g2 = manager.add(&mut nodes, NodeId(1)).unwrap();
        manager.merge(&mut nodes, g1, g2).unwrap();
        assert_eq!(
            manager.merge(&mut nodes, g2, g1),
            Err(NetworkError::UnknownGroup(g2))
        );
    }

    #[test]
    fn removal_empties_and_abandons_groups() {
        let mut nodes = table(2);
        let mut manager = ConnectivityManager::new();
        let g = manager.add(&mut nodes, NodeId(0)).unwrap();
        manager.attach(&mut nodes, NodeId(1), g).unwrap();

        manager.remove(&mut nodes, NodeId(0)).unwrap();
        assert_eq!(nodes[&NodeId(0)].group(), None);
        assert_eq!(members(&manager, g), vec![NodeId(1)]);

        manager.remove(&mut nodes, NodeId(1)).unwrap();
        assert!(manager.is_empty());
    }

    #[test]
    fn totals_sum_over_members() {
        let mut nodes = table(2);
        let mut manager = ConnectivityManager::new();
        let g = manager.add(&mut nodes, NodeId(0)).unwrap();
        manager.attach(&mut nodes, NodeId(1), g).unwrap();

        let totals = manager.totals(&nodes, g).unwrap();
        assert_eq!(totals.members, 2);
        assert_eq!(totals.max_items, 2 * u64::from(Capacity::DEFAULT_MAX_ITEMS));
        assert_eq!(totals.max_bins, 2 * Capacity::DEFAULT_MAX_BINS);
        assert_eq!(manager.num_items(&nodes, g), Some(0));
    }
}
