//! Error types for scopelock.
//!
//! Uses thiserror for derive macros. Store-level failures live in
//! [`crate::store::StoreError`] and are wrapped here when they escape to a caller.

use crate::exit_codes;
use crate::store::StoreError;
use thiserror::Error;

/// Main error type for scopelock operations.
#[derive(Error, Debug)]
pub enum ScopeLockError {
    /// User provided invalid arguments or configuration.
    #[error("{0}")]
    UserError(String),

    /// `wait_lock` ran out of time before the lease could be acquired.
    #[error("timed out after {waited_ms}ms waiting for lock '{key}'")]
    Timeout { key: String, waited_ms: u64 },

    /// The lease store could not be reached.
    #[error("Lease store failure: {0}")]
    Store(#[from] StoreError),

    /// A command run under the lock exited unsuccessfully.
    #[error("command failed with exit code {code}")]
    CommandFailed { code: i32 },
}

impl ScopeLockError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ScopeLockError::UserError(_) => exit_codes::USER_ERROR,
            ScopeLockError::Timeout { .. } => exit_codes::LOCK_TIMEOUT,
            ScopeLockError::Store(_) => exit_codes::STORE_FAILURE,
            ScopeLockError::CommandFailed { .. } => exit_codes::COMMAND_FAILURE,
        }
    }

    /// Whether this error is the expected "did not get the lock in time" outcome.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScopeLockError::Timeout { .. })
    }
}

/// Result type alias for scopelock operations.
pub type Result<T> = std::result::Result<T, ScopeLockError>;
