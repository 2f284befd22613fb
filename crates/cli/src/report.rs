//! Failure reporting for subcommands.
//!
//! Tags a failed command with the code and severity of the first storage
//! error in its cause chain, so logs can tell a retryable I/O hiccup from a
//! bad argument or a broken invariant.

use storage_core::{CodecError, ErrorSeverity, NetworkError, StorageError};
use storage_runtime::RuntimeError;

/// Code and severity of the first storage error in the cause chain.
pub fn classify(err: &anyhow::Error) -> Option<(&'static str, ErrorSeverity)> {
    err.chain().find_map(|cause| {
        if let Some(err) = cause.downcast_ref::<RuntimeError>() {
            Some((err.error_code(), err.severity()))
        } else if let Some(err) = cause.downcast_ref::<NetworkError>() {
            Some((err.error_code(), err.severity()))
        } else {
            cause
                .downcast_ref::<CodecError>()
                .map(|err| (err.error_code(), err.severity()))
        }
    })
}

pub fn hint(severity: ErrorSeverity) -> Option<&'static str> {
    if severity.is_recoverable() {
        Some("the failure may be transient; run the command again")
    } else if severity.is_internal() {
        Some("the storage network reached an inconsistent state; please report it")
    } else {
        None
    }
}

/// Logs a failed command before `main` returns the error.
pub fn log_failure(err: &anyhow::Error) {
    let Some((code, severity)) = classify(err) else {
        tracing::error!("{err:#}");
        return;
    };

    tracing::error!(code, severity = severity.as_str(), "{err:#}");
    if let Some(hint) = hint(severity) {
        tracing::info!("hint: {hint}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use storage_core::{NodeId, Position};
    use storage_runtime::RepositoryError;

    #[test]
    fn classifies_through_context_layers() {
        let err = Err::<(), _>(RuntimeError::EmptyCell(Position::ORIGIN))
            .context("Failed to remove node")
            .unwrap_err();
        assert_eq!(
            classify(&err),
            Some(("RUNTIME_EMPTY_CELL", ErrorSeverity::Validation))
        );
        assert_eq!(hint(ErrorSeverity::Validation), None);
    }

    #[test]
    fn repository_failures_are_retryable() {
        let io = std::io::Error::other("disk full");
        let err = anyhow::Error::new(RuntimeError::Repository(RepositoryError::Io(io)));
        let (code, severity) = classify(&err).unwrap();
        assert_eq!(code, "RUNTIME_REPOSITORY");
        assert_eq!(severity.as_str(), "recoverable");
        assert!(hint(severity).unwrap().contains("again"));
    }

    #[test]
    fn bare_network_and_codec_errors_are_classified() {
        let err = anyhow::Error::new(NetworkError::UnknownNode(NodeId(3)));
        assert!(classify(&err).is_some());

        let err = anyhow::Error::new(CodecError::TruncatedHeader);
        assert!(classify(&err).is_some());

        assert_eq!(classify(&anyhow::anyhow!("plain failure")), None);
    }

    #[test]
    fn internal_errors_ask_for_a_report() {
        let err = anyhow::Error::new(RuntimeError::Repository(RepositoryError::LockPoisoned));
        let (_, severity) = classify(&err).unwrap();
        assert!(severity.is_internal());
        assert!(hint(severity).unwrap().contains("report"));
    }
}
