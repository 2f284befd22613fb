use crate::common::Position;
use crate::item::ItemVariant;

/// Receives items that leave the network when their node is removed.
pub trait DropSink {
    fn drop_item(&mut self, item: ItemVariant, position: Position);
}
