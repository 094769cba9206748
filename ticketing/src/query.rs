//! Range-scan queries over the ledger.
//!
//! In the flat layout the event listing cannot tell events from tickets: every stored
//! value that decodes as an event-shaped JSON object is returned, tickets included,
//! with the fields a ticket lacks left at their zero value. Callers relying on that
//! listing have always seen this; it is kept as is. A value that is not JSON at all
//! fails the whole listing, and a stored `null` lists as an empty event.
//!
//! The namespaced layout scans only the `event:` range and decodes strictly,
//! skipping records that do not decode.

use crate::config::ContractConfig;
use crate::error::Result;
use crate::layout::{KeyLayout, LedgerRecord};
use crate::metrics;
use crate::types::{Event, RecordKind, Ticket};
use ledger_ticketing_core::LedgerStore;
use std::fmt;
use std::sync::Arc;

/// Read-only listings built from range scans.
#[derive(Clone)]
pub struct QueryService {
    ledger: Arc<dyn LedgerStore>,
    layout: KeyLayout,
}

impl QueryService {
    /// Creates a new `QueryService`
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerStore>, config: &ContractConfig) -> Self {
        Self {
            ledger,
            layout: config.key_layout,
        }
    }

    /// Lists events in key order.
    ///
    /// # Errors
    ///
    /// - `Storage`: the scan failed
    /// - `Serialization`: a flat-layout value did not decode (namespaced values that do
    ///   not decode are skipped with a warning)
    pub fn get_available_events(&self) -> Result<Vec<Event>> {
        let (start, end) = self.layout.scan_range(RecordKind::Event);
        let entries = self.ledger.scan(&start, &end)?;
        let scanned = entries.len();

        let mut events = Vec::with_capacity(scanned);
        for entry in entries {
            match self.layout.decode_event(&entry.value) {
                Ok(event) => events.push(event),
                Err(error) if self.layout == KeyLayout::Namespaced => {
                    metrics::record_scan_skipped();
                    tracing::warn!(key = %entry.key, %error, "Skipping undecodable record in event scan");
                }
                Err(error) => {
                    tracing::warn!(key = %entry.key, %error, "Undecodable value in event scan");
                    return Err(error);
                }
            }
        }

        tracing::debug!(scanned, returned = events.len(), "Event scan complete");
        Ok(events)
    }

    /// Lists the tickets issued for `event_id`, in key order.
    ///
    /// Tickets are matched on their stored `eventId`, so tickets of a deleted event are
    /// still found. Records that are not complete tickets are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the scan failed.
    pub fn get_tickets_for_event(&self, event_id: &str) -> Result<Vec<Ticket>> {
        let (start, end) = self.layout.scan_range(RecordKind::Ticket);
        let tickets: Vec<Ticket> = self
            .ledger
            .scan(&start, &end)?
            .into_iter()
            .filter_map(|entry| self.decode_complete_ticket(&entry.value))
            .filter(|ticket| ticket.event_id == event_id)
            .collect();

        tracing::debug!(event_id = %event_id, returned = tickets.len(), "Ticket scan complete");
        Ok(tickets)
    }

    fn decode_complete_ticket(&self, bytes: &[u8]) -> Option<Ticket> {
        match self.layout {
            // Events share the flat keyspace; only accept values with every ticket field
            KeyLayout::Flat => serde_json::from_slice::<Ticket>(bytes).ok(),
            KeyLayout::Namespaced => match LedgerRecord::decode(bytes) {
                Ok(LedgerRecord::Ticket(ticket)) => Some(ticket),
                Ok(LedgerRecord::Event(_)) | Err(_) => None,
            },
        }
    }
}

impl fmt::Debug for QueryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryService")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}
