//! Event Ticketing Contract - event and ticket records on a shared key-value ledger
//!
//! The contract manages two record kinds, events and the tickets issued for them,
//! through a small set of components that all talk to one [`LedgerStore`]:
//!
//! - **`EventRegistry`**: create, store, read, update and delete events
//! - **`TicketIssuer`**: issue numbered ticket batches for an existing event
//! - **`TicketLifecycle`**: read tickets, change their status, delete them
//! - **`QueryService`**: range-scan listings
//! - **`Notifier`**: `CreateEvent` / `CreateTicket` notifications
//!
//! # Architecture
//!
//! ```text
//!                    invoke(name, args) / typed methods
//!                                 │
//!                                 ▼
//!                       ┌───────────────────┐
//!                       │ TicketingContract │
//!                       └───────────────────┘
//!                                 │
//!        ┌────────────────┬───────┴────────┬─────────────────┐
//!        ▼                ▼                ▼                 ▼
//! ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐
//! │EventRegistry │ │ TicketIssuer │ │TicketLifecycle│ │ QueryService │
//! └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘
//!        │   Notifier     │   Notifier      │                │
//!        └────────────────┴────────┬────────┴────────────────┘
//!                                  ▼
//!                          ┌──────────────┐
//!                          │ LedgerStore  │  get / put / delete / scan / emit / apply
//!                          └──────────────┘
//! ```
//!
//! # Modes
//!
//! [`ContractConfig::default()`] reads and writes ledgers exactly as they have always
//! been written: bare-id keys, untagged JSON, free-form statuses, one put per ticket
//! and silent overwrites. Each safeguard can be switched on separately, or all of
//! them at once with [`ContractConfig::strict()`]:
//!
//! | Setting | Default | Safeguard |
//! |---|---|---|
//! | [`KeyLayout`] | `Flat` | `Namespaced`: `event:`/`ticket:` keys, tagged records |
//! | [`StatusPolicy`] | `Permissive` | `Strict`: known statuses, forward-only transitions |
//! | [`BatchMode`] | `Sequential` | `Atomic`: ticket batches all-or-nothing |
//! | [`DuplicatePolicy`] | `Overwrite` | `Reject`: creation fails on a taken id |
//!
//! # Example
//!
//! ```ignore
//! use ledger_ticketing_testing::{InMemoryLedger, concert_date};
//! use std::sync::Arc;
//! use ticketing::{ContractConfig, TicketingContract};
//!
//! let contract = TicketingContract::new(Arc::new(InMemoryLedger::new()), ContractConfig::default());
//! contract.create_event("E1", "Concert", concert_date(), "Arena")?;
//! let ids = contract.create_ticket("E1", "Concert", 3, "alice", "valid")?;
//! assert_eq!(ids, ["E1-alice-1", "E1-alice-2", "E1-alice-3"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod contract;
pub mod error;
pub mod issuer;
pub mod layout;
pub mod lifecycle;
pub mod metrics;
pub mod notifier;
pub mod query;
pub mod registry;
pub mod types;

pub use config::{BatchMode, ContractConfig, DuplicatePolicy};
pub use contract::{ContractFunction, TicketingContract};
pub use error::{ContractError, Result};
pub use issuer::{IssueRequest, TicketIssuer};
pub use layout::{KeyLayout, LedgerRecord};
pub use ledger_ticketing_core::LedgerStore;
pub use lifecycle::TicketLifecycle;
pub use notifier::{Notification, Notifier};
pub use query::QueryService;
pub use registry::EventRegistry;
pub use types::{Event, RecordKind, StatusPolicy, Ticket, TicketStatus, ticket_id};
