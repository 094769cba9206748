//! Domain types for the ledger ticketing contract.
//!
//! Both record kinds are plain JSON documents in the ledger:
//!
//! ```text
//! Event:  {"id":"E1","name":"Concert","date":"2025-06-21T19:30:00Z","location":"Arena"}
//! Ticket: {"id":"E1-alice-1","eventId":"E1","eventName":"Concert","holder":"alice","status":"valid"}
//! ```

use crate::error::{ContractError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seconds from the Unix epoch to `0001-01-01T00:00:00Z`.
const UNSET_DATE_SECS: i64 = -62_135_596_800;

/// Timestamp written for events stored without a date (`0001-01-01T00:00:00Z`).
#[must_use]
pub fn unset_date() -> DateTime<Utc> {
    DateTime::from_timestamp(UNSET_DATE_SECS, 0).unwrap_or_default()
}

// ============================================================================
// Record kinds
// ============================================================================

/// The two record kinds sharing the ledger keyspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// An [`Event`] record
    Event,
    /// A [`Ticket`] record
    Ticket,
}

impl RecordKind {
    /// Lowercase name, also used as the namespaced key prefix
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Ticket => "ticket",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Domain Entities
// ============================================================================

/// A concert, match or conference that tickets are issued for
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Caller-supplied identifier, also the ledger key in the flat layout
    pub id: String,
    /// Display name
    pub name: String,
    /// Date and time of the event (RFC 3339 on the wire)
    pub date: DateTime<Utc>,
    /// Venue or address
    pub location: String,
}

impl Event {
    /// Creates a new `Event`
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        date: DateTime<Utc>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            date,
            location: location.into(),
        }
    }

    /// Creates an `Event` carrying only its id and name.
    ///
    /// The date is [`unset_date`] and the location empty.
    #[must_use]
    pub fn stub(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, unset_date(), String::new())
    }
}

/// A ticket held by someone for an event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Derived identifier (`<eventId>-<holder>-<sequence>`)
    pub id: String,
    /// Event the ticket was issued for (not kept in sync after issuance)
    pub event_id: String,
    /// Event name copied at issuance
    pub event_name: String,
    /// Ticket holder
    pub holder: String,
    /// Lifecycle status, stored verbatim
    pub status: String,
}

impl Ticket {
    /// Creates a new `Ticket`
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        event_id: impl Into<String>,
        event_name: impl Into<String>,
        holder: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            event_id: event_id.into(),
            event_name: event_name.into(),
            holder: holder.into(),
            status: status.into(),
        }
    }
}

/// Builds the id of the `sequence`-th ticket of a batch.
///
/// Ids are only unique within one issuance call: issuing again for the same event and
/// holder produces the same ids.
///
/// ```
/// assert_eq!(ticketing::types::ticket_id("E1", "alice", 2), "E1-alice-2");
/// ```
#[must_use]
pub fn ticket_id(event_id: &str, holder: &str, sequence: u32) -> String {
    format!("{event_id}-{holder}-{sequence}")
}

// ============================================================================
// Ticket status
// ============================================================================

/// Closed set of ticket lifecycle states.
///
/// Only enforced under [`StatusPolicy::Strict`]; the permissive policy stores any string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Issued and usable
    Valid,
    /// Scanned at the door
    Used,
    /// Money returned to the holder
    Refunded,
    /// Withdrawn before use
    Cancelled,
}

impl TicketStatus {
    /// Wire representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Used => "used",
            Self::Refunded => "refunded",
            Self::Cancelled => "cancelled",
        }
    }

    /// Transition table:
    ///
    /// ```text
    /// valid ──► used ──► refunded
    ///   ├─────────────► refunded
    ///   └─────────────► cancelled
    /// ```
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Valid, Self::Used | Self::Refunded | Self::Cancelled)
                | (Self::Used, Self::Refunded)
        )
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "valid" => Ok(Self::Valid),
            "used" => Ok(Self::Used),
            "refunded" => Ok(Self::Refunded),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ContractError::InvalidArgument(format!(
                "unknown ticket status '{other}'"
            ))),
        }
    }
}

/// How ticket status values are validated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPolicy {
    /// Any string is accepted, any change allowed
    #[default]
    Permissive,
    /// Values must be a [`TicketStatus`] and follow its transition table
    Strict,
}

impl StatusPolicy {
    /// Validates the status a ticket is issued with.
    ///
    /// # Errors
    ///
    /// Under [`StatusPolicy::Strict`], returns `InvalidArgument` for unknown values.
    pub fn check_initial(self, status: &str) -> Result<()> {
        match self {
            Self::Permissive => Ok(()),
            Self::Strict => status.parse::<TicketStatus>().map(|_| ()),
        }
    }

    /// Validates a status change.
    ///
    /// # Errors
    ///
    /// Under [`StatusPolicy::Strict`], returns `InvalidArgument` if `to` is unknown and
    /// `InvalidTransition` if `from` is unknown or the table forbids the move.
    pub fn check_transition(self, from: &str, to: &str) -> Result<()> {
        match self {
            Self::Permissive => Ok(()),
            Self::Strict => {
                let next = to.parse::<TicketStatus>()?;
                let allowed = from
                    .parse::<TicketStatus>()
                    .is_ok_and(|current| current.can_transition_to(next));
                if allowed {
                    Ok(())
                } else {
                    Err(ContractError::InvalidTransition {
                        from: from.to_string(),
                        to: to.to_string(),
                    })
                }
            }
        }
    }
}

impl FromStr for StatusPolicy {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "strict" => Ok(Self::Strict),
            other => Err(ContractError::InvalidArgument(format!(
                "unknown status policy '{other}'"
            ))),
        }
    }
}
