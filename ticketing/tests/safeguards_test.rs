//! Behaviour with the opt-in safeguards switched on.
//!
//! Each safeguard is exercised on its own first, then all of them together through
//! `ContractConfig::strict()`.
//!
//! Run with: `cargo test --test safeguards_test`

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

use ledger_ticketing_testing::{InMemoryLedger, concert_date};
use std::sync::Arc;
use ticketing::{
    BatchMode, ContractConfig, ContractError, DuplicatePolicy, Event, KeyLayout, RecordKind,
    StatusPolicy, TicketingContract,
};

fn setup(config: ContractConfig) -> (Arc<InMemoryLedger>, TicketingContract) {
    let ledger = Arc::new(InMemoryLedger::new());
    let contract = TicketingContract::new(ledger.clone(), config);
    (ledger, contract)
}

fn with_layout(key_layout: KeyLayout) -> ContractConfig {
    ContractConfig {
        key_layout,
        ..ContractConfig::default()
    }
}

// ============================================================================
// Namespaced layout
// ============================================================================

#[test]
fn namespaced_listing_returns_only_events() {
    let (ledger, contract) = setup(with_layout(KeyLayout::Namespaced));
    contract
        .create_event("E1", "Concert", concert_date(), "Arena")
        .unwrap();
    contract
        .create_ticket("E1", "Concert", 3, "alice", "valid")
        .unwrap();

    assert_eq!(ledger.len(), 4);
    assert_eq!(
        contract.get_available_events().unwrap(),
        vec![Event::new("E1", "Concert", concert_date(), "Arena")]
    );
}

#[test]
fn namespaced_records_carry_their_kind() {
    let (ledger, contract) = setup(with_layout(KeyLayout::Namespaced));
    contract.store_event("E1", "Concert").unwrap();
    contract
        .create_ticket("E1", "Concert", 1, "alice", "valid")
        .unwrap();

    let event: serde_json::Value = serde_json::from_slice(&ledger.raw("event:E1").unwrap()).unwrap();
    assert_eq!(event["kind"], "event");
    let ticket: serde_json::Value =
        serde_json::from_slice(&ledger.raw("ticket:E1-alice-1").unwrap()).unwrap();
    assert_eq!(ticket["kind"], "ticket");
    assert_eq!(ticket["eventId"], "E1");
}

#[test]
fn namespaced_ids_cannot_collide_across_kinds() {
    let (ledger, contract) = setup(with_layout(KeyLayout::Namespaced));
    // An event whose id looks like a ticket id
    contract.store_event("E1-alice-1", "Odd Name").unwrap();
    contract.store_event("E1", "Concert").unwrap();
    contract
        .create_ticket("E1", "Concert", 1, "alice", "valid")
        .unwrap();

    assert_eq!(contract.read_event("E1-alice-1").unwrap().name, "Odd Name");
    assert_eq!(contract.read_ticket("E1-alice-1").unwrap().holder, "alice");
    assert_eq!(ledger.len(), 3);
}

#[test]
fn namespaced_read_rejects_untagged_values() {
    let (ledger, contract) = setup(with_layout(KeyLayout::Namespaced));
    ledger.seed(
        "event:E1",
        r#"{"id":"E1","name":"Concert","date":"2025-06-21T19:30:00Z","location":"Arena"}"#,
    );

    assert!(matches!(
        contract.read_event("E1"),
        Err(ContractError::Serialization(_))
    ));
}

// ============================================================================
// Strict status policy
// ============================================================================

fn strict_status() -> ContractConfig {
    ContractConfig {
        status_policy: StatusPolicy::Strict,
        ..ContractConfig::default()
    }
}

#[test]
fn strict_status_rejects_used_to_valid() {
    let (_, contract) = setup(strict_status());
    contract.store_event("E1", "Concert").unwrap();
    contract
        .create_ticket("E1", "Concert", 1, "alice", "valid")
        .unwrap();
    contract.update_ticket_status("E1-alice-1", "used").unwrap();

    let error = contract
        .update_ticket_status("E1-alice-1", "valid")
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Invalid status transition from 'used' to 'valid'"
    );
    assert_eq!(contract.read_ticket("E1-alice-1").unwrap().status, "used");
}

#[test]
fn strict_status_walks_the_table_forward() {
    let (_, contract) = setup(strict_status());
    contract.store_event("E1", "Concert").unwrap();
    contract
        .create_ticket("E1", "Concert", 1, "alice", "valid")
        .unwrap();

    contract.update_ticket_status("E1-alice-1", "used").unwrap();
    contract.update_ticket_status("E1-alice-1", "refunded").unwrap();
    assert!(matches!(
        contract.update_ticket_status("E1-alice-1", "cancelled"),
        Err(ContractError::InvalidTransition { .. })
    ));
}

#[test]
fn strict_status_rejects_unknown_values() {
    let (ledger, contract) = setup(strict_status());
    contract.store_event("E1", "Concert").unwrap();

    assert!(matches!(
        contract.create_ticket("E1", "Concert", 1, "alice", "VIP"),
        Err(ContractError::InvalidArgument(_))
    ));
    assert_eq!(ledger.len(), 1);
}

#[test]
fn strict_status_blocks_tickets_with_legacy_statuses() {
    let (ledger, contract) = setup(strict_status());
    ledger.seed(
        "E1-alice-1",
        r#"{"id":"E1-alice-1","eventId":"E1","eventName":"Concert","holder":"alice","status":"golden"}"#,
    );

    assert!(matches!(
        contract.update_ticket_status("E1-alice-1", "used"),
        Err(ContractError::InvalidTransition { .. })
    ));
}

// ============================================================================
// Atomic batches
// ============================================================================

fn atomic() -> ContractConfig {
    ContractConfig {
        batch_mode: BatchMode::Atomic,
        ..ContractConfig::default()
    }
}

#[test]
fn atomic_batch_failing_mid_way_leaves_no_tickets() {
    let (ledger, contract) = setup(atomic());
    contract.store_event("E1", "Concert").unwrap();
    ledger.fail_put_on("E1-alice-2");

    let error = contract
        .create_ticket("E1", "Concert", 3, "alice", "valid")
        .unwrap_err();
    assert!(error.is_storage());
    assert_eq!(ledger.keys(), vec!["E1"]);
    assert!(ledger.notifications().is_empty());
}

#[test]
fn atomic_batch_failing_on_notification_leaves_no_tickets() {
    let (ledger, contract) = setup(atomic());
    contract.store_event("E1", "Concert").unwrap();
    ledger.fail_emits();

    assert!(contract
        .create_ticket("E1", "Concert", 2, "alice", "valid")
        .unwrap_err()
        .is_storage());
    assert_eq!(ledger.keys(), vec!["E1"]);
}

#[test]
fn atomic_batch_commits_in_one_apply() {
    let (ledger, contract) = setup(atomic());
    contract.store_event("E1", "Concert").unwrap();

    let ids = contract
        .create_ticket("E1", "Concert", 3, "alice", "valid")
        .unwrap();
    assert_eq!(ids.len(), 3);
    assert_eq!(ledger.put_count(), 4);
    assert_eq!(ledger.notifications().len(), 3);
}

// ============================================================================
// Duplicate guard
// ============================================================================

#[test]
fn duplicate_guard_protects_events() {
    let (_, contract) = setup(ContractConfig {
        duplicate_policy: DuplicatePolicy::Reject,
        ..ContractConfig::default()
    });
    contract
        .create_event("E1", "Concert", concert_date(), "Arena")
        .unwrap();

    let error = contract.store_event("E1", "Other").unwrap_err();
    assert_eq!(
        error,
        ContractError::AlreadyExists {
            kind: RecordKind::Event,
            id: "E1".to_string(),
        }
    );
    assert_eq!(contract.read_event("E1").unwrap().name, "Concert");
}

#[test]
fn sequential_duplicate_guard_stops_at_first_taken_id() {
    let (ledger, contract) = setup(ContractConfig {
        duplicate_policy: DuplicatePolicy::Reject,
        ..ContractConfig::default()
    });
    contract.store_event("E1", "Concert").unwrap();
    contract
        .create_ticket("E1", "Concert", 1, "bob", "valid")
        .unwrap();
    ledger.seed("E1-alice-2", "taken");

    let error = contract
        .create_ticket("E1", "Concert", 3, "alice", "valid")
        .unwrap_err();
    assert!(matches!(error, ContractError::AlreadyExists { .. }));
    // Sequential mode keeps what was written before the clash
    assert!(ledger.contains("E1-alice-1"));
    assert!(!ledger.contains("E1-alice-3"));
}

// ============================================================================
// Everything on
// ============================================================================

#[test]
fn strict_configuration_end_to_end() {
    let (ledger, contract) = setup(ContractConfig::strict());
    contract
        .create_event("E1", "Concert", concert_date(), "Arena")
        .unwrap();
    contract
        .create_ticket("E1", "Concert", 2, "alice", "valid")
        .unwrap();

    assert!(matches!(
        contract.create_ticket("E1", "Concert", 2, "alice", "valid"),
        Err(ContractError::AlreadyExists { .. })
    ));
    contract.update_ticket_status("E1-alice-1", "used").unwrap();
    assert!(contract.update_ticket_status("E1-alice-1", "valid").is_err());

    assert_eq!(contract.get_available_events().unwrap().len(), 1);
    assert_eq!(contract.get_tickets_for_event("E1").unwrap().len(), 2);
    assert_eq!(
        ledger.keys(),
        vec!["event:E1", "ticket:E1-alice-1", "ticket:E1-alice-2"]
    );
}
