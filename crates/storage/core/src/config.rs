/// Hard capacity ceilings for a single storage node.
///
/// `max_bins` bounds the number of distinct slots, `max_bin_size` bounds the
/// amount a single stackable bin may hold, and `max_items` bounds the total
/// units across every bin of the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capacity {
    pub max_bins: usize,
    pub max_bin_size: u32,
    pub max_items: u32,
}

impl Capacity {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_BINS: usize = 10;
    pub const DEFAULT_MAX_BIN_SIZE: u32 = 100;
    pub const DEFAULT_MAX_ITEMS: u32 = 100;

    pub const fn new(max_bins: usize, max_bin_size: u32, max_items: u32) -> Self {
        Self {
            max_bins,
            max_bin_size,
            max_items,
        }
    }

    /// A crate holding one large stack of a single kind.
    pub const fn bulk(size: u32) -> Self {
        Self::new(1, size, size)
    }

    /// A crate holding many individual units, one per bin.
    pub const fn itemized(bins: u32) -> Self {
        Self::new(bins as usize, 1, bins)
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_MAX_BINS,
            Self::DEFAULT_MAX_BIN_SIZE,
            Self::DEFAULT_MAX_ITEMS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{BinInventory, TransferMode};
    use crate::item::{ItemId, ItemVariant};

    #[test]
    fn bulk_crate_holds_one_stack() {
        assert_eq!(Capacity::bulk(64), Capacity::new(1, 64, 64));

        let mut inventory = BinInventory::new(Capacity::bulk(64));
        let ore = ItemVariant::plain_stack(ItemId(5), 1);
        assert!(inventory.give(&ore, 64, TransferMode::Commit));
        assert!(!inventory.give(&ItemVariant::single(ItemId(9)), 1, TransferMode::Commit));
        assert_eq!(inventory.num_bins(), 1);
    }

    #[test]
    fn itemized_crate_takes_one_unit_per_bin() {
        assert_eq!(Capacity::itemized(3), Capacity::new(3, 1, 3));

        let mut inventory = BinInventory::new(Capacity::itemized(3));
        let torch = ItemVariant::single(ItemId(9));
        for _ in 0..3 {
            assert!(inventory.give(&torch, 1, TransferMode::Commit));
        }
        assert!(!inventory.give(&torch, 1, TransferMode::Commit));
        assert_eq!(inventory.num_items(), 3);
    }
}
