//! File-based NodeRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use storage_core::Position;

use crate::repository::{NodeRepository, RepositoryError, Result};

/// File-based implementation of NodeRepository.
///
/// Stores each record as `node_{x}_{y}_{z}.bin` under the base directory.
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-save leaves the previous record intact.
pub struct FileNodeRepository {
    base_dir: PathBuf,
}

impl FileNodeRepository {
    /// Create a new file-based node repository.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn record_path(&self, position: Position) -> PathBuf {
        self.base_dir.join(format!(
            "node_{}_{}_{}.bin",
            position.x, position.y, position.z
        ))
    }
}

fn parse_record_name(filename: &str) -> Option<Position> {
    let coords = filename.strip_prefix("node_")?.strip_suffix(".bin")?;
    let mut parts = coords.split('_');
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    let z = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Position::new(x, y, z))
}

impl NodeRepository for FileNodeRepository {
    fn save(&self, position: Position, record: &[u8]) -> Result<()> {
        let path = self.record_path(position);
        let temp_path = path.with_extension("bin.tmp");

        fs::write(&temp_path, record)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(%position, bytes = record.len(), "saved node record to {}", path.display());

        Ok(())
    }

    fn load(&self, position: Position) -> Result<Option<Vec<u8>>> {
        let path = self.record_path(position);

        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        tracing::debug!(%position, bytes = bytes.len(), "loaded node record from {}", path.display());

        Ok(Some(bytes))
    }

    fn exists(&self, position: Position) -> bool {
        self.record_path(position).exists()
    }

    fn delete(&self, position: Position) -> Result<()> {
        let path = self.record_path(position);

        if path.exists() {
            fs::remove_file(&path).map_err(RepositoryError::Io)?;
            tracing::debug!(%position, "deleted node record");
        }

        Ok(())
    }

    fn list_positions(&self) -> Result<Vec<Position>> {
        let mut positions = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();

            if let Some(position) = path
                .file_name()
                .and_then(|s| s.to_str())
                .and_then(parse_record_name)
            {
                positions.push(position);
            }
        }

        positions.sort_unstable();
        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileNodeRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileNodeRepository::new(temp_dir.path()).unwrap();
        (temp_dir, repo)
    }

    #[test]
    fn test_save_load_and_delete() {
        let (_temp, repo) = setup();
        let at = Position::new(-3, 64, 7);

        assert_eq!(repo.load(at).unwrap(), None);
        repo.save(at, &[4, 0, 0, 0]).unwrap();
        repo.save(at, &[4, 0, 0, 0, 1]).unwrap();
        assert!(repo.exists(at));
        assert_eq!(repo.load(at).unwrap(), Some(vec![4, 0, 0, 0, 1]));

        repo.delete(at).unwrap();
        assert!(!repo.exists(at));
        repo.delete(at).unwrap();
    }

    #[test]
    fn test_list_ignores_foreign_files() {
        let (temp, repo) = setup();
        repo.save(Position::new(2, 0, 0), &[]).unwrap();
        repo.save(Position::new(-1, 0, 0), &[]).unwrap();
        fs::write(temp.path().join("notes.txt"), b"hello").unwrap();

        assert_eq!(
            repo.list_positions().unwrap(),
            vec![Position::new(-1, 0, 0), Position::new(2, 0, 0)]
        );
    }

    #[test]
    fn record_names_round_trip_negative_coordinates() {
        assert_eq!(
            parse_record_name("node_-4_12_900.bin"),
            Some(Position::new(-4, 12, 900))
        );
        assert_eq!(parse_record_name("node_1_2.bin"), None);
        assert_eq!(parse_record_name("node_1_2_3_4.bin"), None);
        assert_eq!(parse_record_name("node_1_2_3.bin.tmp"), None);
    }
}
