//! Ledger store trait and related types.
//!
//! This module defines the abstraction over the external, versioned key-value ledger
//! that owns every Event and Ticket record. The contract layer never holds record
//! state between calls; everything it knows is read from and written to a
//! [`LedgerStore`] inside the transaction boundary supplied by the ledger.
//!
//! # Design
//!
//! The trait mirrors the minimum surface a ledger transaction context offers:
//!
//! - Point reads (`get`) and upserts (`put`)
//! - Idempotent removal (`delete`)
//! - Ordered range scans (`scan`), where empty bounds mean the full keyspace
//! - Fire-and-forget notifications (`emit`)
//! - Batched application of staged operations (`apply`)
//!
//! # Implementations
//!
//! - `InMemoryLedger` (in `ledger-ticketing-testing` crate): deterministic tests and demos
//! - Ledger adapters provided by the surrounding transport (out of this workspace)
//!
//! # Example
//!
//! ```no_run
//! use ledger_ticketing_core::ledger::{LedgerError, LedgerStore};
//!
//! fn example<L: LedgerStore>(ledger: &L) -> Result<(), LedgerError> {
//!     ledger.put("E1", br#"{"id":"E1"}"#.to_vec())?;
//!
//!     let value = ledger.get("E1")?;
//!     assert!(value.is_some());
//!
//!     // Empty bounds scan the whole keyspace
//!     let all = ledger.scan("", "")?;
//!     assert_eq!(all.len(), 1);
//!
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Errors surfaced by a ledger store.
///
/// Every variant maps to the contract layer's storage error kind; none of them are
/// retried by the contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The backing store failed to serve the request.
    #[error("Ledger backend error: {0}")]
    Backend(String),

    /// A concurrent writer touched the same key (optimistic concurrency check failed).
    #[error("Write conflict on key '{key}'")]
    Conflict {
        /// Key on which the conflict was detected.
        key: String,
    },

    /// The notification channel refused a notification.
    #[error("Failed to emit notification '{name}': {reason}")]
    EmitFailed {
        /// Notification name.
        name: String,
        /// The reason for failure.
        reason: String,
    },

    /// A staged batch could not be applied; nothing from the batch was committed
    /// when the store applies batches atomically.
    #[error("Batch rejected at operation {op_index}: {reason}")]
    BatchRejected {
        /// Zero-based index of the offending operation.
        op_index: usize,
        /// The reason for failure.
        reason: String,
    },
}

/// A single `(key, value)` pair returned by a range scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    /// Ledger key.
    pub key: String,
    /// Raw stored bytes.
    pub value: Vec<u8>,
}

impl KeyValue {
    /// Creates a new `KeyValue`
    #[must_use]
    pub fn new(key: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// One staged ledger operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerOp {
    /// Upsert `value` at `key`.
    Put {
        /// Target key.
        key: String,
        /// Bytes to store.
        value: Vec<u8>,
    },
    /// Remove `key` if present.
    Delete {
        /// Target key.
        key: String,
    },
    /// Post a notification on the ledger's event channel.
    Emit {
        /// Notification name.
        name: String,
        /// Notification payload.
        payload: Vec<u8>,
    },
}

impl LedgerOp {
    /// Returns the key this operation writes, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Put { key, .. } | Self::Delete { key } => Some(key),
            Self::Emit { .. } => None,
        }
    }
}

/// Versioned key-value ledger abstraction.
///
/// # Ordering
///
/// `scan` returns entries in lexicographic key order. The start bound is inclusive and
/// the end bound exclusive; an empty string for either bound leaves that side open, so
/// `scan("", "")` walks the whole world state.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: a single contract value is shared by every
/// caller. Methods take `&self`; stores use interior mutability the way a transaction
/// context does.
///
/// # Dyn Compatibility
///
/// The trait is object safe so components can hold an `Arc<dyn LedgerStore>`.
pub trait LedgerStore: Send + Sync {
    /// Fetch the value stored at `key`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the backend cannot serve the read.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Upsert `value` at `key` (last write wins at commit).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the write is refused.
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;

    /// Remove `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the removal is refused.
    fn delete(&self, key: &str) -> Result<(), LedgerError>;

    /// Scan `[start_key, end_key)` in key order.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the backend cannot serve the scan.
    fn scan(&self, start_key: &str, end_key: &str) -> Result<Vec<KeyValue>, LedgerError>;

    /// Post a notification for external subscribers.
    ///
    /// Delivery and ordering are owned by the ledger; the contract never reads its
    /// own notifications back.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the notification is refused.
    fn emit(&self, name: &str, payload: Vec<u8>) -> Result<(), LedgerError>;

    /// Apply staged operations in order.
    ///
    /// The default implementation applies them one by one and stops at the first
    /// failure, leaving earlier operations applied. Stores able to commit a batch as a
    /// unit override this so a failure leaves nothing applied.
    ///
    /// # Errors
    ///
    /// Returns the first [`LedgerError`] hit while applying.
    fn apply(&self, ops: Vec<LedgerOp>) -> Result<(), LedgerError> {
        for op in ops {
            match op {
                LedgerOp::Put { key, value } => self.put(&key, value)?,
                LedgerOp::Delete { key } => self.delete(&key)?,
                LedgerOp::Emit { name, payload } => self.emit(&name, payload)?,
            }
        }
        Ok(())
    }
}

impl<L: LedgerStore + ?Sized> LedgerStore for std::sync::Arc<L> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), LedgerError> {
        (**self).delete(key)
    }

    fn scan(&self, start_key: &str, end_key: &str) -> Result<Vec<KeyValue>, LedgerError> {
        (**self).scan(start_key, end_key)
    }

    fn emit(&self, name: &str, payload: Vec<u8>) -> Result<(), LedgerError> {
        (**self).emit(name, payload)
    }

    fn apply(&self, ops: Vec<LedgerOp>) -> Result<(), LedgerError> {
        (**self).apply(ops)
    }
}

/// Returns `true` if `key` falls inside the scan range `[start_key, end_key)`.
///
/// Empty bounds are open, matching [`LedgerStore::scan`].
#[must_use]
pub fn in_range(key: &str, start_key: &str, end_key: &str) -> bool {
    (start_key.is_empty() || key >= start_key) && (end_key.is_empty() || key < end_key)
}
