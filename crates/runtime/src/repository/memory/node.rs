//! In-memory NodeRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use storage_core::Position;

use crate::repository::{NodeRepository, RepositoryError, Result};

/// In-memory implementation of NodeRepository.
pub struct InMemoryNodeRepository {
    records: RwLock<HashMap<Position, Vec<u8>>>,
}

impl InMemoryNodeRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryNodeRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeRepository for InMemoryNodeRepository {
    fn save(&self, position: Position, record: &[u8]) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        records.insert(position, record.to_vec());
        Ok(())
    }

    fn load(&self, position: Position) -> Result<Option<Vec<u8>>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.get(&position).cloned())
    }

    fn exists(&self, position: Position) -> bool {
        self.records
            .read()
            .map(|records| records.contains_key(&position))
            .unwrap_or(false)
    }

    fn delete(&self, position: Position) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        records.remove(&position);
        Ok(())
    }

    fn list_positions(&self) -> Result<Vec<Position>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut positions: Vec<Position> = records.keys().copied().collect();
        positions.sort_unstable();
        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_replaces_and_delete_forgets() {
        let repo = InMemoryNodeRepository::new();
        let at = Position::new(1, 2, 3);

        repo.save(at, &[1, 2]).unwrap();
        repo.save(at, &[3]).unwrap();
        assert_eq!(repo.load(at).unwrap(), Some(vec![3]));
        assert_eq!(repo.list_positions().unwrap(), vec![at]);

        repo.delete(at).unwrap();
        assert!(!repo.exists(at));
        assert_eq!(repo.load(at).unwrap(), None);
        // Deleting again is fine.
        repo.delete(at).unwrap();
    }
}
