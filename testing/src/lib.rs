//! # Ledger Ticketing Testing
//!
//! Testing utilities and helpers for the ledger ticketing contract.
//!
//! This crate provides:
//! - An in-memory [`LedgerStore`](ledger_ticketing_core::LedgerStore) with fault injection
//! - Deterministic date fixtures
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```ignore
//! use ledger_ticketing_testing::{InMemoryLedger, concert_date};
//! use std::sync::Arc;
//!
//! #[test]
//! fn create_and_read() {
//!     let ledger = Arc::new(InMemoryLedger::new());
//!     let contract = TicketingContract::new(ledger.clone(), ContractConfig::default());
//!
//!     contract.create_event("E1", "Concert", concert_date(), "Arena").unwrap();
//!     assert_eq!(ledger.notifications().len(), 1);
//! }
//! ```

pub mod ledger_mocks;

/// Deterministic fixtures.
pub mod fixtures {
    use chrono::{DateTime, Utc};

    /// Date used by most tests (2025-06-21 19:30:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn concert_date() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-21T19:30:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc)
    }

    /// A second, later date for update tests (2025-09-13 18:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn rescheduled_date() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-09-13T18:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc)
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use chrono::{DateTime, Utc};
    use proptest::prelude::*;

    /// Caller-supplied record ids (no `:` so they stay valid under namespaced keys)
    pub fn record_id() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_]{1,16}"
    }

    /// Free-form display text, including spaces and non-ASCII
    pub fn display_text() -> impl Strategy<Value = String> {
        "\\PC{0,32}"
    }

    /// Ticket holder names
    pub fn holder() -> impl Strategy<Value = String> {
        "[a-z]{1,12}"
    }

    /// Status strings, mixing known lifecycle words and arbitrary text
    pub fn status_text() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("valid".to_string()),
            Just("used".to_string()),
            Just("refunded".to_string()),
            Just("cancelled".to_string()),
            "[a-z]{1,10}",
        ]
    }

    /// UTC timestamps with second precision between 1970 and 2100
    pub fn utc_date() -> impl Strategy<Value = DateTime<Utc>> {
        (0_i64..4_102_444_800).prop_filter_map("timestamp in range", |secs| {
            DateTime::<Utc>::from_timestamp(secs, 0)
        })
    }
}

pub use fixtures::{concert_date, rescheduled_date};
pub use ledger_mocks::{InMemoryLedger, RecordedNotification};
