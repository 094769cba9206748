//! Ticket issuance.
//!
//! A call issues `count` tickets for one event and one holder, with ids
//! `<eventId>-<holder>-1` through `<eventId>-<holder>-<count>`. The event is only
//! checked for presence; its stored value is never decoded here.
//!
//! # Batch modes
//!
//! ```text
//! Sequential:  put T1 → emit T1 → put T2 → emit T2 → ...   (failure keeps T1..Tn-1)
//! Atomic:      stage T1, T2, ... → apply once               (failure keeps nothing)
//! ```
//!
//! Tickets are built one at a time, so a sequential call that fails early costs no
//! more than the tickets it got through. An atomic call holds the whole batch in
//! memory until it is applied.

use crate::config::{BatchMode, ContractConfig, DuplicatePolicy};
use crate::error::{ContractError, Result};
use crate::layout::KeyLayout;
use crate::metrics;
use crate::notifier::{Notification, Notifier};
use crate::registry::EventRegistry;
use crate::types::{RecordKind, StatusPolicy, Ticket, ticket_id};
use ledger_ticketing_core::{LedgerStore, WriteBatch};
use std::fmt;
use std::sync::Arc;

/// Request to issue a batch of tickets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueRequest {
    /// Event the tickets are for
    pub event_id: String,
    /// Event name copied onto every ticket
    pub event_name: String,
    /// Number of tickets to issue
    pub count: u32,
    /// Holder of every ticket in the batch
    pub holder: String,
    /// Initial status, stored verbatim
    pub status: String,
}

impl IssueRequest {
    /// Creates a new `IssueRequest`
    #[must_use]
    pub fn new(
        event_id: impl Into<String>,
        event_name: impl Into<String>,
        count: u32,
        holder: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_name: event_name.into(),
            count,
            holder: holder.into(),
            status: status.into(),
        }
    }

    /// Ticket number `sequence` of this request
    #[must_use]
    pub fn ticket(&self, sequence: u32) -> Ticket {
        Ticket::new(
            ticket_id(&self.event_id, &self.holder, sequence),
            self.event_id.clone(),
            self.event_name.clone(),
            self.holder.clone(),
            self.status.clone(),
        )
    }

    /// The tickets this request produces, in issuance order, built as they are pulled
    pub fn tickets(&self) -> impl Iterator<Item = Ticket> + '_ {
        (1..=self.count).map(|sequence| self.ticket(sequence))
    }
}

/// Issues [`Ticket`] batches for existing events.
#[derive(Clone)]
pub struct TicketIssuer {
    ledger: Arc<dyn LedgerStore>,
    registry: EventRegistry,
    notifier: Notifier,
    layout: KeyLayout,
    batch_mode: BatchMode,
    duplicate_policy: DuplicatePolicy,
    status_policy: StatusPolicy,
}

impl TicketIssuer {
    /// Creates a new `TicketIssuer`
    #[must_use]
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        registry: EventRegistry,
        config: &ContractConfig,
    ) -> Self {
        Self {
            notifier: Notifier::new(Arc::clone(&ledger)),
            ledger,
            registry,
            layout: config.key_layout,
            batch_mode: config.batch_mode,
            duplicate_policy: config.duplicate_policy,
            status_policy: config.status_policy,
        }
    }

    /// Issues the tickets described by `request` and returns their ids.
    ///
    /// Each written ticket emits one `CreateTicket` notification. A `count` of zero
    /// still performs the existence check and then writes nothing.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: unknown status under the strict status policy
    /// - `NotFound`: nothing is stored under the event id (nothing written)
    /// - `AlreadyExists`: a ticket id is taken and duplicates are rejected
    /// - `Storage`: a read, write or notification failed; in sequential mode the
    ///   tickets written before the failure stay written
    pub fn create_ticket(&self, request: &IssueRequest) -> Result<Vec<String>> {
        self.status_policy.check_initial(&request.status)?;

        if !self.registry.event_exists(&request.event_id)? {
            tracing::warn!(event_id = %request.event_id, "Ticket issuance for missing event");
            return Err(ContractError::event_not_found(&request.event_id));
        }

        let ids = match self.batch_mode {
            BatchMode::Sequential => self.issue_sequential(request)?,
            BatchMode::Atomic => self.issue_atomic(request)?,
        };

        tracing::info!(
            event_id = %request.event_id,
            holder = %request.holder,
            count = request.count,
            mode = ?self.batch_mode,
            "Tickets issued"
        );
        Ok(ids)
    }

    fn issue_sequential(&self, request: &IssueRequest) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for ticket in request.tickets() {
            if let Err(error) = self.write_ticket(&ticket) {
                tracing::warn!(
                    ticket_id = %ticket.id,
                    written = ids.len(),
                    %error,
                    "Ticket issuance stopped part way"
                );
                return Err(error);
            }
            ids.push(ticket.id);
        }
        Ok(ids)
    }

    fn write_ticket(&self, ticket: &Ticket) -> Result<()> {
        let key = self.layout.ticket_key(&ticket.id);
        if self.duplicate_policy == DuplicatePolicy::Reject && self.ledger.get(&key)?.is_some() {
            return Err(already_exists(&ticket.id));
        }

        let bytes = self.layout.encode_ticket(ticket)?;
        self.ledger.put(&key, bytes)?;
        metrics::record_tickets_issued(1);
        self.notifier.emit(&Notification::TicketCreated {
            id: ticket.id.clone(),
        })
    }

    fn issue_atomic(&self, request: &IssueRequest) -> Result<Vec<String>> {
        let mut batch = WriteBatch::new(self.ledger.as_ref());
        let mut ids = Vec::new();
        for ticket in request.tickets() {
            let key = self.layout.ticket_key(&ticket.id);
            if self.duplicate_policy == DuplicatePolicy::Reject && batch.get(&key)?.is_some() {
                return Err(already_exists(&ticket.id));
            }

            batch.put(key, self.layout.encode_ticket(&ticket)?);
            self.notifier.stage(
                &mut batch,
                &Notification::TicketCreated {
                    id: ticket.id.clone(),
                },
            );
            ids.push(ticket.id);
        }
        batch.commit()?;

        metrics::record_tickets_issued(request.count);
        self.notifier
            .confirm_staged(Notification::TICKET_CREATED, request.count);
        Ok(ids)
    }
}

fn already_exists(id: &str) -> ContractError {
    ContractError::AlreadyExists {
        kind: RecordKind::Ticket,
        id: id.to_string(),
    }
}

impl fmt::Debug for TicketIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketIssuer")
            .field("layout", &self.layout)
            .field("batch_mode", &self.batch_mode)
            .field("duplicate_policy", &self.duplicate_policy)
            .field("status_policy", &self.status_policy)
            .finish_non_exhaustive()
    }
}
