//! Scoped write batches over a [`LedgerStore`].
//!
//! A [`WriteBatch`] stages puts, deletes and notifications in memory and hands them
//! to [`LedgerStore::apply`] in a single call on [`WriteBatch::commit`]. Dropping a
//! batch without committing discards everything staged, so an early return with `?`
//! aborts the batch.
//!
//! Reads through the batch see staged writes first, then the store.
//!
//! ```no_run
//! use ledger_ticketing_core::batch::WriteBatch;
//! use ledger_ticketing_core::ledger::{LedgerError, LedgerStore};
//!
//! fn issue_pair(ledger: &dyn LedgerStore) -> Result<(), LedgerError> {
//!     let mut batch = WriteBatch::new(ledger);
//!     batch.put("T-1", b"{}".to_vec());
//!     batch.put("T-2", b"{}".to_vec());
//!     batch.emit("Issued", b"T-1,T-2".to_vec());
//!     batch.commit()?;
//!     Ok(())
//! }
//! ```

use crate::ledger::{LedgerError, LedgerOp, LedgerStore};

/// Staged set of ledger operations committed as one unit.
pub struct WriteBatch<'a> {
    store: &'a dyn LedgerStore,
    ops: Vec<LedgerOp>,
    finished: bool,
}

impl<'a> WriteBatch<'a> {
    /// Opens an empty batch against `store`.
    #[must_use]
    pub fn new(store: &'a dyn LedgerStore) -> Self {
        Self {
            store,
            ops: Vec::new(),
            finished: false,
        }
    }

    /// Stages an upsert.
    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.ops.push(LedgerOp::Put {
            key: key.into(),
            value,
        });
    }

    /// Stages a removal.
    pub fn delete(&mut self, key: impl Into<String>) {
        self.ops.push(LedgerOp::Delete { key: key.into() });
    }

    /// Stages a notification.
    pub fn emit(&mut self, name: impl Into<String>, payload: Vec<u8>) {
        self.ops.push(LedgerOp::Emit {
            name: name.into(),
            payload,
        });
    }

    /// Reads `key`, seeing staged writes before the store.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the key is not staged and the store read fails.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let staged = self.ops.iter().rev().find(|op| op.key() == Some(key));
        match staged {
            Some(LedgerOp::Put { value, .. }) => Ok(Some(value.clone())),
            Some(LedgerOp::Delete { .. }) => Ok(None),
            Some(LedgerOp::Emit { .. }) | None => self.store.get(key),
        }
    }

    /// Number of staged operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Staged operations, in order.
    #[must_use]
    pub fn ops(&self) -> &[LedgerOp] {
        &self.ops
    }

    /// Applies every staged operation with one [`LedgerStore::apply`] call.
    ///
    /// Returns the number of operations handed to the store.
    ///
    /// # Errors
    ///
    /// Returns the store's [`LedgerError`]. Whether a failed batch left partial
    /// effects depends on the store's `apply`.
    pub fn commit(mut self) -> Result<usize, LedgerError> {
        self.finished = true;
        let ops = std::mem::take(&mut self.ops);
        let count = ops.len();
        if count == 0 {
            return Ok(0);
        }
        self.store.apply(ops)?;
        tracing::debug!(ops = count, "Write batch committed");
        Ok(count)
    }

    /// Discards every staged operation.
    pub fn abort(mut self) {
        self.finished = true;
        let discarded = self.ops.len();
        self.ops.clear();
        tracing::debug!(discarded, "Write batch aborted");
    }
}

impl Drop for WriteBatch<'_> {
    fn drop(&mut self) {
        if !self.finished && !self.ops.is_empty() {
            tracing::debug!(
                discarded = self.ops.len(),
                "Write batch dropped without commit"
            );
        }
    }
}

impl std::fmt::Debug for WriteBatch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteBatch")
            .field("ops", &self.ops)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
