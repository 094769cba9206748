//! Error types for contract operations.

use crate::types::RecordKind;
use ledger_ticketing_core::LedgerError;
use thiserror::Error;

/// Result type alias for contract operations.
pub type Result<T> = std::result::Result<T, ContractError>;

/// Every way a contract operation can fail.
///
/// Errors are returned to the caller as values; no operation retries or rolls back
/// its own writes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    // ═══════════════════════════════════════════════════════════
    // Record errors
    // ═══════════════════════════════════════════════════════════

    /// The requested key is absent.
    #[error("{kind} {id} does not exist")]
    NotFound {
        /// Kind of record that was looked up
        kind: RecordKind,
        /// Requested id
        id: String,
    },

    /// A record is already stored under the id (duplicate guard only).
    #[error("{kind} {id} already exists")]
    AlreadyExists {
        /// Kind of record being created
        kind: RecordKind,
        /// Conflicting id
        id: String,
    },

    /// Stored bytes do not decode into the expected shape.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The status change is not in the transition table (strict policy only).
    #[error("Invalid status transition from '{from}' to '{to}'")]
    InvalidTransition {
        /// Stored status
        from: String,
        /// Requested status
        to: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Ledger errors
    // ═══════════════════════════════════════════════════════════

    /// A get, put, delete, scan, emit or batch apply failed.
    #[error("Storage error: {0}")]
    Storage(#[from] LedgerError),

    // ═══════════════════════════════════════════════════════════
    // Invocation errors
    // ═══════════════════════════════════════════════════════════

    /// An argument could not be parsed or is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `invoke` was called with a function name the contract does not expose.
    #[error("Unknown function: {0}")]
    UnknownFunction(String),
}

impl ContractError {
    /// Shorthand for a missing event.
    #[must_use]
    pub fn event_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: RecordKind::Event,
            id: id.to_string(),
        }
    }

    /// Shorthand for a missing ticket.
    #[must_use]
    pub fn ticket_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: RecordKind::Ticket,
            id: id.to_string(),
        }
    }

    /// Returns `true` for [`ContractError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` for [`ContractError::Storage`].
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<serde_json::Error> for ContractError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
