//! Unified error type surfaced by the host.
//!
//! Wraps failures from the network, the record codec and the repository so
//! callers can bubble them up with consistent context.
use storage_core::{CodecError, ErrorSeverity, NetworkError, Position, StorageError};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("cell {0} already hosts a storage node")]
    CellOccupied(Position),

    #[error("cell {0} hosts no storage node")]
    EmptyCell(Position),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl StorageError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CellOccupied(_) | Self::EmptyCell(_) => ErrorSeverity::Validation,
            Self::Network(err) => err.severity(),
            Self::Codec(err) => err.severity(),
            Self::Repository(RepositoryError::LockPoisoned) => ErrorSeverity::Internal,
            Self::Repository(_) => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CellOccupied(_) => "RUNTIME_CELL_OCCUPIED",
            Self::EmptyCell(_) => "RUNTIME_EMPTY_CELL",
            Self::Network(err) => err.error_code(),
            Self::Codec(err) => err.error_code(),
            Self::Repository(_) => "RUNTIME_REPOSITORY",
        }
    }
}
