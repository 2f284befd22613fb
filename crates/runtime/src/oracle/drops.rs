use storage_core::{DropSink, ItemVariant, Position};

/// One item spilled into the world.
#[derive(Clone, Debug, PartialEq)]
pub struct DroppedItem {
    pub item: ItemVariant,
    pub position: Position,
}

/// Append-only record of items spilled by removed nodes.
#[derive(Clone, Debug, Default)]
pub struct DropLedger {
    drops: Vec<DroppedItem>,
}

impl DropLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drops(&self) -> &[DroppedItem] {
        &self.drops
    }

    pub fn len(&self) -> usize {
        self.drops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }

    /// Hands every recorded drop to the caller and clears the ledger.
    pub fn take_all(&mut self) -> Vec<DroppedItem> {
        std::mem::take(&mut self.drops)
    }
}

impl DropSink for DropLedger {
    fn drop_item(&mut self, item: ItemVariant, position: Position) {
        tracing::trace!(%item, %position, "item dropped");
        self.drops.push(DroppedItem { item, position });
    }
}
