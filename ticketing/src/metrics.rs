//! Business metrics for the ticketing contract.
//!
//! Recorded through the `metrics` facade; exporting them is left to whatever hosts
//! the contract.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `ticketing_events_created_total` - Events written by `CreateEvent`/`StoreEvent`
//! - `ticketing_events_updated_total` - Events rewritten by `UpdateEvent`
//! - `ticketing_tickets_issued_total` - Tickets written by `CreateTicket`
//! - `ticketing_ticket_status_updates_total` - Status changes
//! - `ticketing_records_deleted_total{kind}` - Delete calls by record kind
//! - `ticketing_notifications_total{name}` - Notifications that reached the ledger
//! - `ticketing_scan_skipped_total` - Namespaced scan values that did not decode

use crate::types::RecordKind;
use metrics::describe_counter;

/// Register descriptions for every contract metric.
///
/// Call once at startup, before anything is recorded.
pub fn register_business_metrics() {
    describe_counter!(
        "ticketing_events_created_total",
        "Total number of event records written on creation"
    );
    describe_counter!(
        "ticketing_events_updated_total",
        "Total number of event records rewritten by updates"
    );
    describe_counter!(
        "ticketing_tickets_issued_total",
        "Total number of ticket records written on issuance"
    );
    describe_counter!(
        "ticketing_ticket_status_updates_total",
        "Total number of ticket status changes"
    );
    describe_counter!(
        "ticketing_records_deleted_total",
        "Total number of delete calls by record kind"
    );
    describe_counter!(
        "ticketing_notifications_total",
        "Total number of notifications by name"
    );
    describe_counter!(
        "ticketing_scan_skipped_total",
        "Total number of namespaced scan values skipped because they did not decode"
    );

    tracing::info!("Business metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record an event written on creation.
pub fn record_event_created() {
    metrics::counter!("ticketing_events_created_total").increment(1);
}

/// Record an event rewritten by an update.
pub fn record_event_updated() {
    metrics::counter!("ticketing_events_updated_total").increment(1);
}

/// Record tickets written to the ledger.
pub fn record_tickets_issued(count: u32) {
    metrics::counter!("ticketing_tickets_issued_total").increment(u64::from(count));
}

/// Record a ticket status change.
pub fn record_status_updated() {
    metrics::counter!("ticketing_ticket_status_updates_total").increment(1);
}

/// Record a delete call.
pub fn record_deleted(kind: RecordKind) {
    metrics::counter!("ticketing_records_deleted_total", "kind" => kind.as_str()).increment(1);
}

/// Record a notification.
pub fn record_notification(name: &'static str) {
    record_notifications(name, 1);
}

/// Record `count` notifications of one name, e.g. from a committed batch.
pub fn record_notifications(name: &'static str, count: u32) {
    metrics::counter!("ticketing_notifications_total", "name" => name).increment(u64::from(count));
}

/// Record a scanned value that was skipped.
pub fn record_scan_skipped() {
    metrics::counter!("ticketing_scan_skipped_total").increment(1);
}
