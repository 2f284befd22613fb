//! Repository contract for persisted node records.

use storage_core::Position;

use crate::repository::Result;

/// Stores one encoded record per occupied cell.
pub trait NodeRepository: Send + Sync {
    /// Save a record, replacing any previous one for the cell
    fn save(&self, position: Position, record: &[u8]) -> Result<()>;

    /// Load the record for a cell
    fn load(&self, position: Position) -> Result<Option<Vec<u8>>>;

    /// Check if a record exists
    fn exists(&self, position: Position) -> bool;

    /// Delete a record. Missing records are not an error.
    fn delete(&self, position: Position) -> Result<()>;

    /// List every cell with a record
    fn list_positions(&self) -> Result<Vec<Position>> {
        Ok(vec![])
    }
}
