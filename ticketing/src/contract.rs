//! The contract facade.
//!
//! [`TicketingContract`] wires the components to one ledger and exposes every
//! operation twice: as a typed method, and through [`TicketingContract::invoke`],
//! which takes a function name plus string arguments the way a transaction router
//! delivers them and answers with JSON bytes.
//!
//! ```text
//! invoke("CreateTicket", ["E1", "Concert", "3", "alice", "valid"])
//!    │
//!    ├─ ContractFunction::from_str ── arity check ── argument parsing
//!    │
//!    └─ create_ticket(..) ──▶ TicketIssuer ──▶ LedgerStore
//!                                   │
//!                                   └──▶ ["E1-alice-1","E1-alice-2","E1-alice-3"]
//! ```

use crate::config::ContractConfig;
use crate::error::{ContractError, Result};
use crate::issuer::{IssueRequest, TicketIssuer};
use crate::lifecycle::TicketLifecycle;
use crate::query::QueryService;
use crate::registry::EventRegistry;
use crate::types::{Event, Ticket};
use chrono::{DateTime, Utc};
use ledger_ticketing_core::LedgerStore;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// ============================================================================
// Function names
// ============================================================================

/// Functions reachable through [`TicketingContract::invoke`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContractFunction {
    /// `CreateEvent(id, name, date, location)`
    CreateEvent,
    /// `StoreEvent(id, name)`
    StoreEvent,
    /// `ReadEvent(id)`
    ReadEvent,
    /// `UpdateEvent(id, name, date, location)`
    UpdateEvent,
    /// `DeleteEvent(id)`
    DeleteEvent,
    /// `CreateTicket(eventId, eventName, count, holder, status)`
    CreateTicket,
    /// `ReadTicket(id)`
    ReadTicket,
    /// `UpdateTicketStatus(id, status)`
    UpdateTicketStatus,
    /// `DeleteTicket(id)`
    DeleteTicket,
    /// `GetAvailableEvents()`
    GetAvailableEvents,
    /// `GetTicketsForEvent(eventId)`
    GetTicketsForEvent,
}

impl ContractFunction {
    /// Every function, in declaration order
    pub const ALL: [Self; 11] = [
        Self::CreateEvent,
        Self::StoreEvent,
        Self::ReadEvent,
        Self::UpdateEvent,
        Self::DeleteEvent,
        Self::CreateTicket,
        Self::ReadTicket,
        Self::UpdateTicketStatus,
        Self::DeleteTicket,
        Self::GetAvailableEvents,
        Self::GetTicketsForEvent,
    ];

    /// Name as callers spell it
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CreateEvent => "CreateEvent",
            Self::StoreEvent => "StoreEvent",
            Self::ReadEvent => "ReadEvent",
            Self::UpdateEvent => "UpdateEvent",
            Self::DeleteEvent => "DeleteEvent",
            Self::CreateTicket => "CreateTicket",
            Self::ReadTicket => "ReadTicket",
            Self::UpdateTicketStatus => "UpdateTicketStatus",
            Self::DeleteTicket => "DeleteTicket",
            Self::GetAvailableEvents => "GetAvailableEvents",
            Self::GetTicketsForEvent => "GetTicketsForEvent",
        }
    }

    /// Number of string arguments the function takes
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::GetAvailableEvents => 0,
            Self::ReadEvent
            | Self::DeleteEvent
            | Self::ReadTicket
            | Self::DeleteTicket
            | Self::GetTicketsForEvent => 1,
            Self::StoreEvent | Self::UpdateTicketStatus => 2,
            Self::CreateEvent | Self::UpdateEvent => 4,
            Self::CreateTicket => 5,
        }
    }
}

impl fmt::Display for ContractFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContractFunction {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|function| function.name() == s)
            .ok_or_else(|| ContractError::UnknownFunction(s.to_string()))
    }
}

// ============================================================================
// Contract
// ============================================================================

/// Event ticketing contract bound to one ledger.
///
/// Cloning is cheap; every clone shares the same ledger.
#[derive(Clone)]
pub struct TicketingContract {
    config: ContractConfig,
    registry: EventRegistry,
    issuer: TicketIssuer,
    lifecycle: TicketLifecycle,
    query: QueryService,
}

impl TicketingContract {
    /// Creates a contract over `ledger`.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerStore>, config: ContractConfig) -> Self {
        let registry = EventRegistry::new(Arc::clone(&ledger), &config);
        let issuer = TicketIssuer::new(Arc::clone(&ledger), registry.clone(), &config);
        let lifecycle = TicketLifecycle::new(Arc::clone(&ledger), &config);
        let query = QueryService::new(ledger, &config);

        tracing::debug!(?config, "Ticketing contract ready");
        Self {
            config,
            registry,
            issuer,
            lifecycle,
            query,
        }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// See [`EventRegistry::create_event`].
    ///
    /// # Errors
    ///
    /// See [`EventRegistry::create_event`].
    #[tracing::instrument(skip(self))]
    pub fn create_event(
        &self,
        id: &str,
        name: &str,
        date: DateTime<Utc>,
        location: &str,
    ) -> Result<Event> {
        self.registry.create_event(id, name, date, location)
    }

    /// See [`EventRegistry::store_event`].
    ///
    /// # Errors
    ///
    /// See [`EventRegistry::store_event`].
    #[tracing::instrument(skip(self))]
    pub fn store_event(&self, id: &str, name: &str) -> Result<Event> {
        self.registry.store_event(id, name)
    }

    /// See [`EventRegistry::read_event`].
    ///
    /// # Errors
    ///
    /// See [`EventRegistry::read_event`].
    #[tracing::instrument(skip(self))]
    pub fn read_event(&self, id: &str) -> Result<Event> {
        self.registry.read_event(id)
    }

    /// See [`EventRegistry::update_event`].
    ///
    /// # Errors
    ///
    /// See [`EventRegistry::update_event`].
    #[tracing::instrument(skip(self))]
    pub fn update_event(
        &self,
        id: &str,
        name: &str,
        date: DateTime<Utc>,
        location: &str,
    ) -> Result<Event> {
        self.registry.update_event(id, name, date, location)
    }

    /// See [`EventRegistry::delete_event`].
    ///
    /// # Errors
    ///
    /// See [`EventRegistry::delete_event`].
    #[tracing::instrument(skip(self))]
    pub fn delete_event(&self, id: &str) -> Result<()> {
        self.registry.delete_event(id)
    }

    /// Issues `count` tickets for `event_id`. See [`TicketIssuer::create_ticket`].
    ///
    /// # Errors
    ///
    /// See [`TicketIssuer::create_ticket`].
    #[tracing::instrument(skip(self))]
    pub fn create_ticket(
        &self,
        event_id: &str,
        event_name: &str,
        count: u32,
        holder: &str,
        status: &str,
    ) -> Result<Vec<String>> {
        let request = IssueRequest::new(event_id, event_name, count, holder, status);
        self.issuer.create_ticket(&request)
    }

    /// See [`TicketLifecycle::read_ticket`].
    ///
    /// # Errors
    ///
    /// See [`TicketLifecycle::read_ticket`].
    #[tracing::instrument(skip(self))]
    pub fn read_ticket(&self, id: &str) -> Result<Ticket> {
        self.lifecycle.read_ticket(id)
    }

    /// See [`TicketLifecycle::update_ticket_status`].
    ///
    /// # Errors
    ///
    /// See [`TicketLifecycle::update_ticket_status`].
    #[tracing::instrument(skip(self))]
    pub fn update_ticket_status(&self, id: &str, status: &str) -> Result<Ticket> {
        self.lifecycle.update_ticket_status(id, status)
    }

    /// See [`TicketLifecycle::delete_ticket`].
    ///
    /// # Errors
    ///
    /// See [`TicketLifecycle::delete_ticket`].
    #[tracing::instrument(skip(self))]
    pub fn delete_ticket(&self, id: &str) -> Result<()> {
        self.lifecycle.delete_ticket(id)
    }

    /// See [`QueryService::get_available_events`].
    ///
    /// # Errors
    ///
    /// See [`QueryService::get_available_events`].
    #[tracing::instrument(skip(self))]
    pub fn get_available_events(&self) -> Result<Vec<Event>> {
        self.query.get_available_events()
    }

    /// See [`QueryService::get_tickets_for_event`].
    ///
    /// # Errors
    ///
    /// See [`QueryService::get_tickets_for_event`].
    #[tracing::instrument(skip(self))]
    pub fn get_tickets_for_event(&self, event_id: &str) -> Result<Vec<Ticket>> {
        self.query.get_tickets_for_event(event_id)
    }

    /// Calls `function` with string `args` and returns its result as JSON bytes.
    ///
    /// Dates are RFC 3339 strings and `count` a non-negative integer. Functions with
    /// no result return an empty vector.
    ///
    /// # Errors
    ///
    /// - `UnknownFunction`: `function` is not exposed
    /// - `InvalidArgument`: wrong argument count or an unparseable argument
    /// - anything the called operation returns
    #[tracing::instrument(skip(self, args), fields(args = args.len()))]
    pub fn invoke<S: AsRef<str>>(&self, function: &str, args: &[S]) -> Result<Vec<u8>> {
        let function: ContractFunction = function.parse()?;
        if args.len() != function.arity() {
            return Err(ContractError::InvalidArgument(format!(
                "{function} takes {} argument(s), got {}",
                function.arity(),
                args.len()
            )));
        }
        let arg = |index: usize| args[index].as_ref();

        match function {
            ContractFunction::CreateEvent => to_json(&self.create_event(
                arg(0),
                arg(1),
                parse_date(arg(2))?,
                arg(3),
            )?),
            ContractFunction::StoreEvent => to_json(&self.store_event(arg(0), arg(1))?),
            ContractFunction::ReadEvent => to_json(&self.read_event(arg(0))?),
            ContractFunction::UpdateEvent => to_json(&self.update_event(
                arg(0),
                arg(1),
                parse_date(arg(2))?,
                arg(3),
            )?),
            ContractFunction::DeleteEvent => {
                self.delete_event(arg(0))?;
                Ok(Vec::new())
            }
            ContractFunction::CreateTicket => to_json(&self.create_ticket(
                arg(0),
                arg(1),
                parse_count(arg(2))?,
                arg(3),
                arg(4),
            )?),
            ContractFunction::ReadTicket => to_json(&self.read_ticket(arg(0))?),
            ContractFunction::UpdateTicketStatus => {
                to_json(&self.update_ticket_status(arg(0), arg(1))?)
            }
            ContractFunction::DeleteTicket => {
                self.delete_ticket(arg(0))?;
                Ok(Vec::new())
            }
            ContractFunction::GetAvailableEvents => to_json(&self.get_available_events()?),
            ContractFunction::GetTicketsForEvent => {
                to_json(&self.get_tickets_for_event(arg(0))?)
            }
        }
    }
}

impl fmt::Debug for TicketingContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketingContract")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Argument parsing
// ============================================================================

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|error| ContractError::InvalidArgument(format!("date '{raw}': {error}")))
}

fn parse_count(raw: &str) -> Result<u32> {
    raw.trim()
        .parse()
        .map_err(|error| ContractError::InvalidArgument(format!("count '{raw}': {error}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use ledger_ticketing_testing::InMemoryLedger;

    fn contract() -> (Arc<InMemoryLedger>, TicketingContract) {
        let ledger = Arc::new(InMemoryLedger::new());
        let contract = TicketingContract::new(ledger.clone(), ContractConfig::default());
        (ledger, contract)
    }

    #[test]
    fn function_names_round_trip() {
        for function in ContractFunction::ALL {
            assert_eq!(function.name().parse::<ContractFunction>().unwrap(), function);
        }
    }

    #[test]
    fn unknown_function_is_rejected() {
        let (_, contract) = contract();
        let error = contract.invoke::<&str>("createEvent", &[]).unwrap_err();
        assert_eq!(error, ContractError::UnknownFunction("createEvent".to_string()));
    }

    #[test]
    fn wrong_arity_is_invalid_argument() {
        let (ledger, contract) = contract();
        let error = contract.invoke("CreateEvent", &["E1", "Concert"]).unwrap_err();
        assert!(matches!(error, ContractError::InvalidArgument(_)));
        assert!(error.to_string().contains("takes 4 argument(s), got 2"));
        assert!(ledger.is_empty());
    }

    #[test]
    fn bad_date_is_invalid_argument() {
        let (ledger, contract) = contract();
        let error = contract
            .invoke("CreateEvent", &["E1", "Concert", "next friday", "Arena"])
            .unwrap_err();
        assert!(matches!(error, ContractError::InvalidArgument(_)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn offset_dates_are_normalised_to_utc() {
        let (_, contract) = contract();
        contract
            .invoke("CreateEvent", &["E1", "Concert", "2025-06-21T21:30:00+02:00", "Arena"])
            .unwrap();
        assert_eq!(
            contract.read_event("E1").unwrap().date,
            ledger_ticketing_testing::concert_date()
        );
    }

    #[test]
    fn negative_or_textual_count_is_invalid_argument() {
        let (_, contract) = contract();
        contract.store_event("E1", "Concert").unwrap();

        for count in ["-1", "three", ""] {
            let error = contract
                .invoke("CreateTicket", &["E1", "Concert", count, "alice", "valid"])
                .unwrap_err();
            assert!(
                matches!(error, ContractError::InvalidArgument(_)),
                "count {count:?}"
            );
        }
    }

    #[test]
    fn unit_results_are_empty() {
        let (_, contract) = contract();
        assert!(contract.invoke("DeleteEvent", &["E1"]).unwrap().is_empty());
        assert!(contract.invoke("DeleteTicket", &["E1-a-1"]).unwrap().is_empty());
    }

    #[test]
    fn create_ticket_returns_ids_as_json() {
        let (_, contract) = contract();
        contract.store_event("E1", "Concert").unwrap();

        let bytes = contract
            .invoke("CreateTicket", &["E1", "Concert", "2", "alice", "valid"])
            .unwrap();
        let ids: Vec<String> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ids, vec!["E1-alice-1", "E1-alice-2"]);
    }

    #[test]
    fn owned_string_arguments_are_accepted() {
        let (_, contract) = contract();
        let args = vec!["E1".to_string(), "Concert".to_string()];
        let bytes = contract.invoke("StoreEvent", &args).unwrap();
        let event: Event = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event.name, "Concert");
    }
}
