//! Error types for chatscroll.
//!
//! # Error Hierarchy
//!
//! - [`ListError`] - failures inside the reconciliation core. None of them is
//!   fatal: each is produced as a `Result` by the component that detects it and
//!   recovered by [`ChatList`](crate::state::ChatList), which logs and degrades
//!   to a safe default.
//! - [`AppError`] - failures of the demo binary (config, logging, terminal).
//!
//! # Recovery Strategy
//!
//! | Variant | Recovery |
//! |---|---|
//! | `DuplicateId` | a fresh id is allocated with the same prefix |
//! | `AssetLoadFailure` | the square fallback box is applied |
//! | `MalformedSpec` | the message gets placeholder text |
//! | `ConcurrentMutation` | the request is queued behind the in-flight one |

use super::identifiers::EntryId;
use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::view::TuiError;
use thiserror::Error;

/// Recoverable failures of the list core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ListError {
    /// An id was issued or claimed twice.
    #[error("Duplicate entry id: {0}")]
    DuplicateId(EntryId),

    /// A media asset could not report a usable intrinsic size.
    #[error("Asset for {id} failed to load: {reason}")]
    AssetLoadFailure {
        /// Entry whose asset failed.
        id: EntryId,
        /// What went wrong.
        reason: String,
    },

    /// An insertion request was incomplete.
    #[error("Malformed entry spec: {0}")]
    MalformedSpec(String),

    /// A mutation was attempted while a reconciliation was in flight.
    #[error("Reconciliation already in flight (phase: {phase})")]
    ConcurrentMutation {
        /// Phase the reconciler was in.
        phase: String,
    },
}

/// Top-level error of the demo binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Terminal or TUI rendering error.
    #[error("Terminal error: {0}")]
    Terminal(#[from] TuiError),

    /// Report serialization failed.
    #[error("Report error: {0}")]
    Report(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn duplicate_id_display_names_the_id() {
        let err = ListError::DuplicateId(EntryId::new("msg-101").unwrap());
        assert_eq!(err.to_string(), "Duplicate entry id: msg-101");
    }

    #[test]
    fn asset_failure_display_includes_reason() {
        let err = ListError::AssetLoadFailure {
            id: EntryId::new("msg-7").unwrap(),
            reason: "timed out".to_string(),
        };
        assert_eq!(err.to_string(), "Asset for msg-7 failed to load: timed out");
    }

    #[test]
    fn concurrent_mutation_display_includes_phase() {
        let err = ListError::ConcurrentMutation {
            phase: "awaiting_settlement".to_string(),
        };
        assert!(err.to_string().contains("awaiting_settlement"));
    }

    #[test]
    fn app_error_from_tui_error() {
        let err: AppError = TuiError::from(std::io::Error::other("boom")).into();
        assert!(matches!(err, AppError::Terminal(_)));
    }

    #[test]
    fn app_error_from_config_error() {
        let err: AppError = ConfigError::ReadError {
            path: PathBuf::from("/x"),
            reason: "denied".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("denied"));
    }
}
