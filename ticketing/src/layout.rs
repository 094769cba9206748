//! Key layout and record encoding.
//!
//! Two layouts are supported:
//!
//! ```text
//! Flat        E1                  {"id":"E1","name":...}
//!             E1-alice-1          {"id":"E1-alice-1","eventId":...}
//!
//! Namespaced  event:E1            {"kind":"event","id":"E1","name":...}
//!             ticket:E1-alice-1   {"kind":"ticket","id":"E1-alice-1",...}
//! ```
//!
//! The flat layout is what existing ledgers hold. Events and tickets share one
//! keyspace with nothing telling them apart, and decoding is lenient: missing fields
//! take their zero value and a JSON `null` is the zero record, the way the records
//! were always read. The namespaced layout
//! prefixes keys by kind and wraps values in a tagged [`LedgerRecord`], decoded strictly.

use crate::error::{ContractError, Result};
use crate::types::{Event, RecordKind, Ticket, unset_date};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How records are addressed and encoded in the ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyLayout {
    /// Bare ids, untagged JSON
    #[default]
    Flat,
    /// `<kind>:<id>` keys, tagged JSON
    Namespaced,
}

impl KeyLayout {
    /// Ledger key of the record `id` of `kind`
    #[must_use]
    pub fn key(self, kind: RecordKind, id: &str) -> String {
        match self {
            Self::Flat => id.to_string(),
            Self::Namespaced => format!("{}:{id}", kind.as_str()),
        }
    }

    /// Ledger key of event `id`
    #[must_use]
    pub fn event_key(self, id: &str) -> String {
        self.key(RecordKind::Event, id)
    }

    /// Ledger key of ticket `id`
    #[must_use]
    pub fn ticket_key(self, id: &str) -> String {
        self.key(RecordKind::Ticket, id)
    }

    /// Scan bounds `[start, end)` covering every record of `kind`.
    ///
    /// The flat layout cannot separate kinds, so both bounds are open.
    #[must_use]
    pub fn scan_range(self, kind: RecordKind) -> (String, String) {
        match self {
            Self::Flat => (String::new(), String::new()),
            // ';' is the byte after ':', so this covers exactly the "<kind>:" prefix
            Self::Namespaced => (format!("{}:", kind.as_str()), format!("{};", kind.as_str())),
        }
    }

    /// Encodes an event for storage.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if JSON encoding fails.
    pub fn encode_event(self, event: &Event) -> Result<Vec<u8>> {
        match self {
            Self::Flat => Ok(serde_json::to_vec(event)?),
            Self::Namespaced => Ok(serde_json::to_vec(&LedgerRecordRef::Event(event))?),
        }
    }

    /// Encodes a ticket for storage.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if JSON encoding fails.
    pub fn encode_ticket(self, ticket: &Ticket) -> Result<Vec<u8>> {
        match self {
            Self::Flat => Ok(serde_json::to_vec(ticket)?),
            Self::Namespaced => Ok(serde_json::to_vec(&LedgerRecordRef::Ticket(ticket))?),
        }
    }

    /// Decodes stored bytes as an event.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the bytes are not an event of this layout.
    pub fn decode_event(self, bytes: &[u8]) -> Result<Event> {
        match self {
            Self::Flat => match serde_json::from_slice::<Option<FlatEvent>>(bytes)? {
                Some(flat) => Ok(flat.into()),
                None => Ok(Event::stub("", "")),
            },
            Self::Namespaced => match LedgerRecord::decode(bytes)? {
                LedgerRecord::Event(event) => Ok(event),
                LedgerRecord::Ticket(ticket) => Err(kind_mismatch(
                    RecordKind::Event,
                    RecordKind::Ticket,
                    &ticket.id,
                )),
            },
        }
    }

    /// Decodes stored bytes as a ticket.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the bytes are not a ticket of this layout.
    pub fn decode_ticket(self, bytes: &[u8]) -> Result<Ticket> {
        match self {
            Self::Flat => Ok(serde_json::from_slice::<Option<FlatTicket>>(bytes)?
                .unwrap_or_default()
                .into()),
            Self::Namespaced => match LedgerRecord::decode(bytes)? {
                LedgerRecord::Ticket(ticket) => Ok(ticket),
                LedgerRecord::Event(event) => Err(kind_mismatch(
                    RecordKind::Ticket,
                    RecordKind::Event,
                    &event.id,
                )),
            },
        }
    }
}

impl FromStr for KeyLayout {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Ok(Self::Flat),
            "namespaced" => Ok(Self::Namespaced),
            other => Err(ContractError::InvalidArgument(format!(
                "unknown key layout '{other}'"
            ))),
        }
    }
}

fn kind_mismatch(expected: RecordKind, found: RecordKind, id: &str) -> ContractError {
    ContractError::Serialization(format!("expected {expected} record, found {found} '{id}'"))
}

// ============================================================================
// Tagged records (namespaced layout)
// ============================================================================

/// A stored record tagged with its kind.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LedgerRecord {
    /// Tagged event
    Event(Event),
    /// Tagged ticket
    Ticket(Ticket),
}

impl LedgerRecord {
    /// Strictly decodes a tagged record: the tag must be known and every field present.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for untagged, unknown or incomplete records.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Kind named by the tag
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Event(_) => RecordKind::Event,
            Self::Ticket(_) => RecordKind::Ticket,
        }
    }
}

/// Borrowing twin of [`LedgerRecord`] so encoding does not clone.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum LedgerRecordRef<'a> {
    Event(&'a Event),
    Ticket(&'a Ticket),
}

// ============================================================================
// Lenient decoding (flat layout)
// ============================================================================

/// Event shape with every field optional.
#[derive(Deserialize)]
struct FlatEvent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default = "unset_date")]
    date: DateTime<Utc>,
    #[serde(default)]
    location: String,
}

impl From<FlatEvent> for Event {
    fn from(flat: FlatEvent) -> Self {
        Self::new(flat.id, flat.name, flat.date, flat.location)
    }
}

/// Ticket shape with every field optional.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatTicket {
    #[serde(default)]
    id: String,
    #[serde(default)]
    event_id: String,
    #[serde(default)]
    event_name: String,
    #[serde(default)]
    holder: String,
    #[serde(default)]
    status: String,
}

impl From<FlatTicket> for Ticket {
    fn from(flat: FlatTicket) -> Self {
        Self::new(flat.id, flat.event_id, flat.event_name, flat.holder, flat.status)
    }
}
