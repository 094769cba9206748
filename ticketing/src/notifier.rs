//! Domain notifications.
//!
//! Creation operations post a notification on the ledger's event channel for
//! external subscribers. The contract never reads them back. A refused notification
//! fails the call that triggered it, but the write that preceded it stays in place.
//!
//! Notifications staged in a [`WriteBatch`] are only counted once the batch has
//! committed; see [`Notifier::confirm_staged`].

use crate::error::Result;
use crate::metrics;
use ledger_ticketing_core::{LedgerStore, WriteBatch};
use std::fmt;
use std::sync::Arc;

/// A notification the contract emits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// An event record was created
    EventCreated {
        /// Event id
        id: String,
    },
    /// A ticket record was created
    TicketCreated {
        /// Ticket id
        id: String,
    },
}

impl Notification {
    /// Name of [`Notification::EventCreated`]
    pub const EVENT_CREATED: &'static str = "CreateEvent";
    /// Name of [`Notification::TicketCreated`]
    pub const TICKET_CREATED: &'static str = "CreateTicket";

    /// Name subscribers filter on
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EventCreated { .. } => Self::EVENT_CREATED,
            Self::TicketCreated { .. } => Self::TICKET_CREATED,
        }
    }

    /// Human-readable payload, e.g. `Created event: E1`
    #[must_use]
    pub fn payload(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EventCreated { id } => write!(f, "Created event: {id}"),
            Self::TicketCreated { id } => write!(f, "Created ticket: {id}"),
        }
    }
}

/// Posts [`Notification`]s to the ledger.
#[derive(Clone)]
pub struct Notifier {
    ledger: Arc<dyn LedgerStore>,
}

impl Notifier {
    /// Creates a new `Notifier`
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    /// Emits `notification` immediately.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the ledger refuses the notification.
    pub fn emit(&self, notification: &Notification) -> Result<()> {
        self.ledger
            .emit(notification.name(), notification.payload())?;
        metrics::record_notification(notification.name());
        tracing::debug!(name = notification.name(), payload = %notification, "Notification emitted");
        Ok(())
    }

    /// Stages `notification` in `batch`, to be emitted when the batch commits.
    ///
    /// Nothing is counted here: call [`Notifier::confirm_staged`] after the commit.
    pub fn stage(&self, batch: &mut WriteBatch<'_>, notification: &Notification) {
        batch.emit(notification.name(), notification.payload());
        tracing::debug!(name = notification.name(), payload = %notification, "Notification staged");
    }

    /// Counts `count` staged notifications named `name` whose batch has committed.
    pub fn confirm_staged(&self, name: &'static str, count: u32) {
        metrics::record_notifications(name, count);
        tracing::debug!(name, count, "Staged notifications committed");
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier").finish_non_exhaustive()
    }
}
