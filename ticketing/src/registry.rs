//! Event records: creation, lookup, update and deletion.
//!
//! Creation writes unconditionally unless the duplicate guard is on, so creating the
//! same id twice keeps the second call's data. Deletion never checks for existence
//! and never touches the event's tickets.

use crate::config::{ContractConfig, DuplicatePolicy};
use crate::error::{ContractError, Result};
use crate::layout::KeyLayout;
use crate::metrics;
use crate::notifier::{Notification, Notifier};
use crate::types::{Event, RecordKind};
use chrono::{DateTime, Utc};
use ledger_ticketing_core::LedgerStore;
use std::fmt;
use std::sync::Arc;

/// Creates, reads, updates and deletes [`Event`] records.
#[derive(Clone)]
pub struct EventRegistry {
    ledger: Arc<dyn LedgerStore>,
    layout: KeyLayout,
    duplicate_policy: DuplicatePolicy,
    notifier: Notifier,
}

impl EventRegistry {
    /// Creates a new `EventRegistry`
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerStore>, config: &ContractConfig) -> Self {
        Self {
            notifier: Notifier::new(Arc::clone(&ledger)),
            ledger,
            layout: config.key_layout,
            duplicate_policy: config.duplicate_policy,
        }
    }

    /// Writes a new event and emits `CreateEvent`.
    ///
    /// Any record already stored under `id` is overwritten, unless duplicates are
    /// rejected.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists`: `id` is taken and duplicates are rejected
    /// - `Storage`: the write or the notification failed (a failed notification
    ///   leaves the event written)
    pub fn create_event(
        &self,
        id: &str,
        name: &str,
        date: DateTime<Utc>,
        location: &str,
    ) -> Result<Event> {
        let event = Event::new(id, name, date, location);
        self.write_new(&event)?;
        metrics::record_event_created();
        tracing::info!(event_id = %id, name = %name, "Event created");

        self.notifier.emit(&Notification::EventCreated { id: id.to_string() })?;
        Ok(event)
    }

    /// Writes an event carrying only its id and name, without a notification.
    ///
    /// The date is left unset and the location empty.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists`: `id` is taken and duplicates are rejected
    /// - `Storage`: the write failed
    pub fn store_event(&self, id: &str, name: &str) -> Result<Event> {
        let event = Event::stub(id, name);
        self.write_new(&event)?;
        metrics::record_event_created();
        tracing::info!(event_id = %id, name = %name, "Event stored");
        Ok(event)
    }

    /// Reads and decodes event `id`.
    ///
    /// # Errors
    ///
    /// - `NotFound`: nothing is stored under `id`
    /// - `Serialization`: the stored bytes are not an event
    /// - `Storage`: the read failed
    pub fn read_event(&self, id: &str) -> Result<Event> {
        let Some(bytes) = self.ledger.get(&self.layout.event_key(id))? else {
            return Err(ContractError::event_not_found(id));
        };
        let event = self.layout.decode_event(&bytes)?;
        tracing::debug!(event_id = %id, "Event read");
        Ok(event)
    }

    /// Returns `true` if anything is stored under event `id`.
    ///
    /// Only presence is checked; the value is not decoded.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the read failed.
    pub fn event_exists(&self, id: &str) -> Result<bool> {
        Ok(self.ledger.get(&self.layout.event_key(id))?.is_some())
    }

    /// Replaces name, date and location of an existing event.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `Serialization`: as for [`read_event`](Self::read_event)
    /// - `Storage`: the read or write failed
    pub fn update_event(
        &self,
        id: &str,
        name: &str,
        date: DateTime<Utc>,
        location: &str,
    ) -> Result<Event> {
        let mut event = self.read_event(id)?;
        event.name = name.to_string();
        event.date = date;
        event.location = location.to_string();

        let bytes = self.layout.encode_event(&event)?;
        self.ledger.put(&self.layout.event_key(id), bytes)?;
        metrics::record_event_updated();
        tracing::info!(event_id = %id, "Event updated");
        Ok(event)
    }

    /// Deletes event `id`. Succeeds whether or not it existed.
    ///
    /// Tickets issued for the event are left in place.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the delete failed.
    pub fn delete_event(&self, id: &str) -> Result<()> {
        self.ledger.delete(&self.layout.event_key(id))?;
        metrics::record_deleted(RecordKind::Event);
        tracing::info!(event_id = %id, "Event deleted");
        Ok(())
    }

    fn write_new(&self, event: &Event) -> Result<()> {
        let key = self.layout.event_key(&event.id);
        if self.duplicate_policy == DuplicatePolicy::Reject && self.ledger.get(&key)?.is_some() {
            return Err(ContractError::AlreadyExists {
                kind: RecordKind::Event,
                id: event.id.clone(),
            });
        }
        let bytes = self.layout.encode_event(event)?;
        self.ledger.put(&key, bytes)?;
        Ok(())
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("layout", &self.layout)
            .field("duplicate_policy", &self.duplicate_policy)
            .finish_non_exhaustive()
    }
}
