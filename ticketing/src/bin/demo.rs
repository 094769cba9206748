//! Ticketing Contract Demo
//!
//! Runs a short scenario through the contract's string dispatcher against an
//! in-memory ledger:
//! - Event creation and listing
//! - Ticket issuance and status changes
//! - Failure paths (missing event, unknown function)
//!
//! # Usage
//!
//! ```bash
//! # Legacy behaviour
//! cargo run --bin demo
//!
//! # Every safeguard on
//! TICKETING_KEY_LAYOUT=namespaced TICKETING_STATUS_POLICY=strict \
//! TICKETING_BATCH_MODE=atomic TICKETING_DUPLICATE_POLICY=reject cargo run --bin demo
//! ```

use ledger_ticketing_testing::InMemoryLedger;
use std::sync::Arc;
use ticketing::{ContractConfig, TicketingContract, metrics};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ticketing=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    metrics::register_business_metrics();

    println!("\n🎫 ============================================");
    println!("   Ticketing Contract - Live Demo");
    println!("============================================\n");

    let config = ContractConfig::from_env();
    println!("⚙️  Configuration: {}\n", serde_json::to_string(&config)?);

    let ledger = Arc::new(InMemoryLedger::new());
    let contract = TicketingContract::new(ledger.clone(), config);

    // ========== Demo Scenario ==========

    println!("1️⃣  Creating events...");
    call(&contract, "CreateEvent", &["E1", "Summer Festival", "2025-06-21T19:30:00Z", "Arena"])?;
    call(&contract, "StoreEvent", &["E2", "Winter Gala"])?;

    println!("\n2️⃣  Issuing tickets...");
    call(&contract, "CreateTicket", &["E1", "Summer Festival", "3", "alice", "valid"])?;
    call(&contract, "CreateTicket", &["E2", "Winter Gala", "1", "bob", "valid"])?;

    println!("\n3️⃣  Using a ticket...");
    call(&contract, "UpdateTicketStatus", &["E1-alice-1", "used"])?;
    call(&contract, "ReadTicket", &["E1-alice-1"])?;

    println!("\n4️⃣  Rescheduling...");
    call(&contract, "UpdateEvent", &["E1", "Summer Festival", "2025-09-13T18:00:00Z", "Stadium"])?;

    println!("\n5️⃣  Listing...");
    call(&contract, "GetAvailableEvents", &[])?;
    call(&contract, "GetTicketsForEvent", &["E1"])?;

    println!("\n6️⃣  Expected failures...");
    for (function, args) in [
        ("CreateTicket", vec!["E404", "Ghost Show", "2", "carol", "valid"]),
        ("UpdateTicketStatus", vec!["E1-alice-1", "valid"]),
        ("ReadEvent", vec!["E404"]),
        ("TransferTicket", vec!["E1-alice-2", "dave"]),
    ] {
        match contract.invoke(function, &args) {
            Ok(bytes) => println!("   ✓ {function} → {}", String::from_utf8_lossy(&bytes)),
            Err(error) => println!("   ✗ {function} → {error}"),
        }
    }

    println!("\n7️⃣  Cleaning up E2...");
    call(&contract, "DeleteTicket", &["E2-bob-1"])?;
    call(&contract, "DeleteEvent", &["E2"])?;

    println!("\n📊 Ledger: {} keys, {} notifications", ledger.len(), ledger.notifications().len());
    for notification in ledger.notifications() {
        println!("   {} → {}", notification.name, notification.payload_text());
    }

    println!("\n✅ Demo complete\n");
    Ok(())
}

fn call(
    contract: &TicketingContract,
    function: &str,
    args: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = contract.invoke(function, args)?;
    if bytes.is_empty() {
        println!("   ✓ {function}");
    } else {
        println!("   ✓ {function} → {}", String::from_utf8_lossy(&bytes));
    }
    Ok(())
}
