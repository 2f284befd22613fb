//! Network access errors.

use crate::common::{BindingId, GroupId, NodeId};
use crate::error::{ErrorSeverity, StorageError};

/// Errors raised when a caller addresses something the network does not hold.
///
/// Capacity exhaustion and missing items are not errors; they surface as
/// `false`/`None` from give and take.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NetworkError {
    #[error("{0} is not part of this network")]
    UnknownNode(NodeId),

    #[error("{0} does not exist")]
    UnknownGroup(GroupId),

    #[error("binding {0:?} is detached")]
    DetachedBinding(BindingId),
}

impl StorageError for NetworkError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownNode(_) | Self::DetachedBinding(_) => ErrorSeverity::Validation,
            // Handles are only handed out by the arena; a dangling one is a bug.
            Self::UnknownGroup(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownNode(_) => "NETWORK_UNKNOWN_NODE",
            Self::UnknownGroup(_) => "NETWORK_UNKNOWN_GROUP",
            Self::DetachedBinding(_) => "NETWORK_DETACHED_BINDING",
        }
    }
}
