//! Configuration management for the ticketing contract.
//!
//! Loads configuration from environment variables with defaults that reproduce how
//! existing ledgers were written: flat keys, free-form status strings, sequential
//! ticket writes and silent overwrite of duplicates.

use crate::error::{ContractError, Result};
use crate::layout::KeyLayout;
use crate::types::StatusPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// How `CreateTicket` writes its batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    /// One put + notification per ticket; a failure keeps earlier tickets
    #[default]
    Sequential,
    /// Everything staged in a write batch and applied once; a failure keeps nothing
    Atomic,
}

impl FromStr for BatchMode {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "atomic" => Ok(Self::Atomic),
            other => Err(ContractError::InvalidArgument(format!(
                "unknown batch mode '{other}'"
            ))),
        }
    }
}

/// What creation does when the target key is already present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Overwrite the stored record without error
    #[default]
    Overwrite,
    /// Fail with `AlreadyExists`
    Reject,
}

impl FromStr for DuplicatePolicy {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "reject" => Ok(Self::Reject),
            other => Err(ContractError::InvalidArgument(format!(
                "unknown duplicate policy '{other}'"
            ))),
        }
    }
}

/// Contract configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Key layout and record encoding (`TICKETING_KEY_LAYOUT`)
    pub key_layout: KeyLayout,
    /// Ticket status validation (`TICKETING_STATUS_POLICY`)
    pub status_policy: StatusPolicy,
    /// Ticket batch write mode (`TICKETING_BATCH_MODE`)
    pub batch_mode: BatchMode,
    /// Behaviour on duplicate creation (`TICKETING_DUPLICATE_POLICY`)
    pub duplicate_policy: DuplicatePolicy,
}

impl ContractConfig {
    /// Every safeguard on: namespaced keys, strict statuses, atomic batches,
    /// duplicates rejected.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            key_layout: KeyLayout::Namespaced,
            status_policy: StatusPolicy::Strict,
            batch_mode: BatchMode::Atomic,
            duplicate_policy: DuplicatePolicy::Reject,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Missing variables take the default; unrecognised values are logged and also
    /// take the default.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            key_layout: parse_or_default(&lookup, "TICKETING_KEY_LAYOUT"),
            status_policy: parse_or_default(&lookup, "TICKETING_STATUS_POLICY"),
            batch_mode: parse_or_default(&lookup, "TICKETING_BATCH_MODE"),
            duplicate_policy: parse_or_default(&lookup, "TICKETING_DUPLICATE_POLICY"),
        }
    }
}

fn parse_or_default<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> T
where
    T: FromStr<Err = ContractError> + Default,
{
    let Some(raw) = lookup(name) else {
        return T::default();
    };
    raw.trim().parse().unwrap_or_else(|error| {
        tracing::warn!(variable = name, value = %raw, %error, "Ignoring invalid setting");
        T::default()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_match_existing_ledgers() {
        let config = ContractConfig::default();
        assert_eq!(config.key_layout, KeyLayout::Flat);
        assert_eq!(config.status_policy, StatusPolicy::Permissive);
        assert_eq!(config.batch_mode, BatchMode::Sequential);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Overwrite);
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = ContractConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, ContractConfig::default());
    }

    #[test]
    fn every_variable_is_read() {
        let config = ContractConfig::from_lookup(lookup_from(&[
            ("TICKETING_KEY_LAYOUT", "namespaced"),
            ("TICKETING_STATUS_POLICY", "STRICT"),
            ("TICKETING_BATCH_MODE", " atomic "),
            ("TICKETING_DUPLICATE_POLICY", "reject"),
        ]));
        assert_eq!(config, ContractConfig::strict());
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = ContractConfig::from_lookup(lookup_from(&[
            ("TICKETING_KEY_LAYOUT", "hierarchical"),
            ("TICKETING_BATCH_MODE", "atomic"),
        ]));
        assert_eq!(config.key_layout, KeyLayout::Flat);
        assert_eq!(config.batch_mode, BatchMode::Atomic);
    }

    #[test]
    fn config_serializes_lowercase() {
        let json = serde_json::to_value(ContractConfig::strict()).unwrap();
        assert_eq!(json["key_layout"], "namespaced");
        assert_eq!(json["status_policy"], "strict");
        assert_eq!(json["batch_mode"], "atomic");
        assert_eq!(json["duplicate_policy"], "reject");
    }
}
