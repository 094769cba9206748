//! # Ledger Ticketing Core
//!
//! Storage abstractions shared by the ledger ticketing contract.
//!
//! The contract keeps no record state of its own. Every Event and Ticket lives in an
//! external, versioned key-value ledger, reached through the [`LedgerStore`] trait.
//! This crate provides that trait and the [`WriteBatch`] scope used when several writes
//! must commit together.
//!
//! ## Modules
//!
//! - [`ledger`]: the store trait, its error type, scan results and staged operations
//! - [`batch`]: scoped write batches committed through [`LedgerStore::apply`]
//!
//! ## Example
//!
//! ```ignore
//! use ledger_ticketing_core::{LedgerStore, WriteBatch};
//!
//! fn issue(ledger: &dyn LedgerStore) -> Result<(), ledger_ticketing_core::LedgerError> {
//!     let mut batch = WriteBatch::new(ledger);
//!     batch.put("E1-alice-1", ticket_json);
//!     batch.emit("CreateTicket", b"Created ticket: E1-alice-1".to_vec());
//!     batch.commit()?;
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod ledger;

pub use batch::WriteBatch;
pub use ledger::{KeyValue, LedgerError, LedgerOp, LedgerStore, in_range};
