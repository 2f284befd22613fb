use std::fmt;

use crate::common::NodeId;
use crate::network::GroupTotals;

/// Read-only snapshot handed to presentation code.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSummary {
    pub node: NodeId,
    /// `None` while the node waits for a maintenance tick to regroup it.
    pub group: Option<GroupTotals>,
    pub num_items: u64,
    pub max_items: u32,
    /// Display string of every bin, in bin order.
    pub bins: Vec<String>,
}

/// Renders the status popup text.
impl fmt::Display for NodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => {
                write!(f, "I'm connected to {} modules", group.members)?;
                write!(
                    f,
                    "\nNetwork storing {} / {} items",
                    group.num_items, group.max_items
                )?;
            }
            None => write!(f, "Looking for a network")?,
        }
        if self.max_items > 0 {
            write!(
                f,
                "\nThis crate storing {} / {} items",
                self.num_items, self.max_items
            )?;
        }
        for bin in &self.bins {
            write!(f, "\n{bin}")?;
        }
        Ok(())
    }
}
