//! Ticket reads, status changes and deletion.

use crate::config::ContractConfig;
use crate::error::{ContractError, Result};
use crate::layout::KeyLayout;
use crate::metrics;
use crate::types::{RecordKind, StatusPolicy, Ticket};
use ledger_ticketing_core::LedgerStore;
use std::fmt;
use std::sync::Arc;

/// Reads and mutates existing [`Ticket`] records.
#[derive(Clone)]
pub struct TicketLifecycle {
    ledger: Arc<dyn LedgerStore>,
    layout: KeyLayout,
    status_policy: StatusPolicy,
}

impl TicketLifecycle {
    /// Creates a new `TicketLifecycle`
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerStore>, config: &ContractConfig) -> Self {
        Self {
            ledger,
            layout: config.key_layout,
            status_policy: config.status_policy,
        }
    }

    /// Reads and decodes ticket `id`.
    ///
    /// # Errors
    ///
    /// - `NotFound`: nothing is stored under `id`
    /// - `Serialization`: the stored bytes are not a ticket
    /// - `Storage`: the read failed
    pub fn read_ticket(&self, id: &str) -> Result<Ticket> {
        let Some(bytes) = self.ledger.get(&self.layout.ticket_key(id))? else {
            return Err(ContractError::ticket_not_found(id));
        };
        let ticket = self.layout.decode_ticket(&bytes)?;
        tracing::debug!(ticket_id = %id, "Ticket read");
        Ok(ticket)
    }

    /// Replaces the status of ticket `id`, leaving every other field as stored.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `Serialization`: as for [`read_ticket`](Self::read_ticket)
    /// - `InvalidArgument` / `InvalidTransition`: rejected by the strict status policy
    /// - `Storage`: the read or write failed
    pub fn update_ticket_status(&self, id: &str, status: &str) -> Result<Ticket> {
        let mut ticket = self.read_ticket(id)?;
        self.status_policy.check_transition(&ticket.status, status)?;

        let previous = std::mem::replace(&mut ticket.status, status.to_string());
        let bytes = self.layout.encode_ticket(&ticket)?;
        self.ledger.put(&self.layout.ticket_key(id), bytes)?;

        metrics::record_status_updated();
        tracing::info!(ticket_id = %id, from = %previous, to = %status, "Ticket status updated");
        Ok(ticket)
    }

    /// Deletes ticket `id`. Succeeds whether or not it existed.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the delete failed.
    pub fn delete_ticket(&self, id: &str) -> Result<()> {
        self.ledger.delete(&self.layout.ticket_key(id))?;
        metrics::record_deleted(RecordKind::Ticket);
        tracing::info!(ticket_id = %id, "Ticket deleted");
        Ok(())
    }
}

impl fmt::Debug for TicketLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketLifecycle")
            .field("layout", &self.layout)
            .field("status_policy", &self.status_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use ledger_ticketing_testing::InMemoryLedger;

    fn seeded(config: &ContractConfig) -> (Arc<InMemoryLedger>, TicketLifecycle) {
        let ledger = Arc::new(InMemoryLedger::new());
        let ticket = Ticket::new("E1-alice-1", "E1", "Concert", "alice", "valid");
        ledger.seed(
            config.key_layout.ticket_key(&ticket.id),
            config.key_layout.encode_ticket(&ticket).unwrap(),
        );
        let lifecycle = TicketLifecycle::new(ledger.clone(), config);
        (ledger, lifecycle)
    }

    #[test]
    fn status_update_changes_only_status() {
        let (_, lifecycle) = seeded(&ContractConfig::default());
        lifecycle.update_ticket_status("E1-alice-1", "used").unwrap();

        let ticket = lifecycle.read_ticket("E1-alice-1").unwrap();
        assert_eq!(
            ticket,
            Ticket::new("E1-alice-1", "E1", "Concert", "alice", "used")
        );
    }

    #[test]
    fn permissive_policy_allows_any_move() {
        let (_, lifecycle) = seeded(&ContractConfig::default());
        lifecycle.update_ticket_status("E1-alice-1", "used").unwrap();
        lifecycle.update_ticket_status("E1-alice-1", "valid").unwrap();
        lifecycle.update_ticket_status("E1-alice-1", "").unwrap();
        assert_eq!(lifecycle.read_ticket("E1-alice-1").unwrap().status, "");
    }

    #[test]
    fn strict_policy_blocks_backwards_move() {
        let config = ContractConfig {
            status_policy: StatusPolicy::Strict,
            ..ContractConfig::default()
        };
        let (_, lifecycle) = seeded(&config);
        lifecycle.update_ticket_status("E1-alice-1", "used").unwrap();

        let error = lifecycle
            .update_ticket_status("E1-alice-1", "valid")
            .unwrap_err();
        assert_eq!(
            error,
            ContractError::InvalidTransition {
                from: "used".to_string(),
                to: "valid".to_string(),
            }
        );
        assert_eq!(lifecycle.read_ticket("E1-alice-1").unwrap().status, "used");
    }

    #[test]
    fn update_missing_ticket_is_not_found() {
        let (ledger, lifecycle) = seeded(&ContractConfig::default());
        let error = lifecycle.update_ticket_status("E1-bob-1", "used").unwrap_err();
        assert_eq!(error, ContractError::ticket_not_found("E1-bob-1"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn read_garbage_is_serialization_error() {
        let (ledger, lifecycle) = seeded(&ContractConfig::default());
        ledger.seed("broken", vec![0xff_u8, 0xfe]);
        assert!(matches!(
            lifecycle.read_ticket("broken"),
            Err(ContractError::Serialization(_))
        ));
    }

    #[test]
    fn failed_write_leaves_status_untouched() {
        let (ledger, lifecycle) = seeded(&ContractConfig::default());
        ledger.fail_put_on("E1-alice-1");

        assert!(lifecycle
            .update_ticket_status("E1-alice-1", "used")
            .unwrap_err()
            .is_storage());
        ledger.clear_faults();
        assert_eq!(lifecycle.read_ticket("E1-alice-1").unwrap().status, "valid");
    }

    #[test]
    fn delete_is_idempotent() {
        let (ledger, lifecycle) = seeded(&ContractConfig::default());
        lifecycle.delete_ticket("E1-alice-1").unwrap();
        lifecycle.delete_ticket("E1-alice-1").unwrap();
        assert!(ledger.is_empty());
        assert!(lifecycle.read_ticket("E1-alice-1").unwrap_err().is_not_found());
    }

    #[test]
    fn namespaced_read_rejects_event_records() {
        let config = ContractConfig {
            key_layout: KeyLayout::Namespaced,
            ..ContractConfig::default()
        };
        let (ledger, lifecycle) = seeded(&config);
        ledger.seed("ticket:odd", r#"{"kind":"event","id":"odd","name":"x","date":"2025-01-01T00:00:00Z","location":"y"}"#);

        assert!(lifecycle.read_ticket("E1-alice-1").is_ok());
        assert!(matches!(
            lifecycle.read_ticket("odd"),
            Err(ContractError::Serialization(_))
        ));
    }
}
