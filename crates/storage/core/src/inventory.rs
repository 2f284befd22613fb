//! Per-node bin storage.
//!
//! Bins are kept in insertion order; give and take always scan from the
//! front so the oldest matching bin is used first.

use crate::config::Capacity;
use crate::item::ItemVariant;

/// Whether a give/take call mutates the inventory or only checks feasibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferMode {
    #[default]
    Commit,
    DryRun,
}

impl TransferMode {
    pub const fn is_commit(self) -> bool {
        matches!(self, Self::Commit)
    }
}

/// One inventory slot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bin {
    item: ItemVariant,
}

impl Bin {
    pub fn new(item: ItemVariant) -> Self {
        Self { item }
    }

    pub fn item(&self) -> &ItemVariant {
        &self.item
    }

    pub fn amount(&self) -> u32 {
        self.item.amount()
    }

    pub fn into_item(self) -> ItemVariant {
        self.item
    }
}

/// Ordered bins bounded by a [`Capacity`].
///
/// Invariants held after every call:
/// - `num_bins() <= capacity.max_bins`
/// - `num_items() <= capacity.max_items`
/// - every stackable bin holds an amount in `1..=capacity.max_bin_size`
#[derive(Clone, Debug, PartialEq)]
pub struct BinInventory {
    capacity: Capacity,
    bins: Vec<Bin>,
}

impl BinInventory {
    pub fn new(capacity: Capacity) -> Self {
        Self {
            capacity,
            bins: Vec::new(),
        }
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    /// Total units across every bin.
    pub fn num_items(&self) -> u64 {
        self.bins.iter().map(|bin| u64::from(bin.amount())).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemVariant> {
        self.bins.iter().map(Bin::item)
    }

    /// Attempts to store `amount` units of `item`.
    ///
    /// Stacks merge into the first bin of the same identity with enough
    /// headroom. A stack whose identity is already binned but lacks headroom is
    /// rejected; an unseen stack opens a fresh bin holding `amount` units.
    /// Singleton items each take a new bin. A zero amount or a malformed item
    /// is rejected.
    pub fn give(&mut self, item: &ItemVariant, amount: u32, mode: TransferMode) -> bool {
        if amount == 0 {
            return false;
        }
        if !item.is_well_formed() {
            tracing::trace!(%item, "rejected: malformed item");
            return false;
        }
        if self.num_items() + u64::from(amount) > u64::from(self.capacity.max_items) {
            tracing::trace!(%item, amount, "rejected: node item ceiling reached");
            return false;
        }

        let max_bin_size = u64::from(self.capacity.max_bin_size);
        if let Some(bin) = self.bins.iter_mut().find(|bin| {
            bin.item.stacks_with(item) && u64::from(bin.amount()) + u64::from(amount) <= max_bin_size
        }) {
            if mode.is_commit() {
                bin.item.grow(amount);
            }
            return true;
        }

        if item.is_stackable() && self.bins.iter().any(|bin| bin.item.stacks_with(item)) {
            tracing::trace!(%item, amount, "rejected: matching bin lacks headroom");
            return false;
        }

        if self.bins.len() < self.capacity.max_bins {
            if mode.is_commit() {
                let stored = if item.is_stackable() {
                    item.with_amount(amount)
                } else {
                    item.clone()
                };
                self.bins.push(Bin::new(stored));
            }
            return true;
        }

        tracing::trace!(%item, "rejected: no free bin");
        false
    }

    /// Attempts to remove up to `amount` units matching `item`.
    ///
    /// Stacks come back as a new item carrying the units actually taken; a bin
    /// drained to zero is removed in the same call. Singleton items come back
    /// as the stored bin contents.
    pub fn take(&mut self, item: &ItemVariant, amount: u32, mode: TransferMode) -> Option<ItemVariant> {
        if self.bins.is_empty() || amount == 0 {
            return None;
        }

        if item.is_stackable() {
            let index = self.bins.iter().position(|bin| bin.item.stacks_with(item))?;
            let bin = &mut self.bins[index];
            let taken = amount.min(bin.amount());
            let out = bin.item.with_amount(taken);
            if mode.is_commit() {
                bin.item.shrink(taken);
                if bin.amount() == 0 {
                    self.bins.remove(index);
                }
            }
            return Some(out);
        }

        let index = self.bins.iter().position(|bin| bin.item.identity_eq(item))?;
        if mode.is_commit() {
            Some(self.bins.remove(index).into_item())
        } else {
            Some(self.bins[index].item.clone())
        }
    }

    /// Loads persisted items in order, dropping any that are malformed or
    /// would break the capacity invariants. Returns how many were dropped.
    pub fn restore(&mut self, items: impl IntoIterator<Item = ItemVariant>) -> usize {
        let mut dropped = 0;
        for item in items {
            let fits_bin = !item.is_stackable() || item.amount() <= self.capacity.max_bin_size;
            let fits_node = self.bins.len() < self.capacity.max_bins
                && self.num_items() + u64::from(item.amount()) <= u64::from(self.capacity.max_items);

            if item.is_well_formed() && fits_bin && fits_node {
                self.bins.push(Bin::new(item));
            } else {
                tracing::warn!(%item, "dropping persisted item that does not fit this node");
                dropped += 1;
            }
        }
        dropped
    }

    /// Empties the inventory, handing back every stored item in bin order.
    pub fn drain(&mut self) -> Vec<ItemVariant> {
        self.bins.drain(..).map(Bin::into_item).collect()
    }
}
