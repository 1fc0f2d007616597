use thiserror::Error;

use crate::platform::PlatformError;
use crate::store::StoreError;

/// Failures raised by the task ledger. None of them change state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(String),

    #[error("You are already assigned to task '{0}'!")]
    AlreadyAssigned(String),

    #[error("Task '{description}' has reached its maximum number of members ({max_members})!")]
    TaskFull {
        description: String,
        max_members: u32,
    },

    #[error("Task '{0}' is already completed!")]
    TaskCompleted(String),

    #[error("You are not assigned to task '{0}'!")]
    NotAssigned(String),

    #[error("Invalid task number {} (project has {len} tasks)", index + 1)]
    IndexError { index: usize, len: usize },
}

/// Command-level error. Every variant is reported to the caller and leaves
/// the document untouched.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// True for errors that are expected user mistakes rather than faults.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound(_) | Self::PermissionDenied(_) | Self::Ledger(_)
        ) || matches!(self, Self::Platform(PlatformError::Forbidden(_)))
    }
}
