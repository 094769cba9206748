//! In-memory ledger testing utilities
//!
//! Provides fast, deterministic ledger infrastructure for contract tests and demos:
//! - [`InMemoryLedger`]: `BTreeMap`-backed world state with ordered scans
//! - [`RecordedNotification`]: notifications captured instead of delivered
//! - Fault injection for reads, writes, scans, notifications and conflicts

use ledger_ticketing_core::ledger::{KeyValue, LedgerError, LedgerOp, LedgerStore, in_range};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A notification captured by [`InMemoryLedger`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedNotification {
    /// Notification name
    pub name: String,
    /// Raw payload
    pub payload: Vec<u8>,
}

impl RecordedNotification {
    /// Payload decoded as UTF-8 (lossy)
    #[must_use]
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Failures the ledger should inject.
#[derive(Clone, Debug, Default)]
struct Faults {
    get_keys: HashSet<String>,
    put_keys: HashSet<String>,
    conflict_keys: HashSet<String>,
    puts_allowed: Option<usize>,
    fail_scans: bool,
    fail_emits: bool,
    fail_deletes: bool,
}

#[derive(Debug, Default)]
struct LedgerInner {
    entries: BTreeMap<String, Vec<u8>>,
    notifications: Vec<RecordedNotification>,
    puts: usize,
    faults: Faults,
}

impl LedgerInner {
    /// Checks whether the `nth` successful put at `key` should fail.
    fn check_put(&self, key: &str, nth: usize) -> Result<(), LedgerError> {
        if self.faults.conflict_keys.contains(key) {
            return Err(LedgerError::Conflict {
                key: key.to_string(),
            });
        }
        if self.faults.put_keys.contains(key) {
            return Err(LedgerError::Backend(format!("injected put failure at '{key}'")));
        }
        if let Some(allowed) = self.faults.puts_allowed {
            if nth >= allowed {
                return Err(LedgerError::Backend(format!(
                    "injected put failure after {allowed} writes"
                )));
            }
        }
        Ok(())
    }

    fn check_delete(&self, key: &str) -> Result<(), LedgerError> {
        if self.faults.fail_deletes {
            return Err(LedgerError::Backend(format!("injected delete failure at '{key}'")));
        }
        Ok(())
    }

    fn check_emit(&self, name: &str) -> Result<(), LedgerError> {
        if self.faults.fail_emits {
            return Err(LedgerError::EmitFailed {
                name: name.to_string(),
                reason: "injected emit failure".to_string(),
            });
        }
        Ok(())
    }
}

/// In-memory ledger for fast, deterministic testing.
///
/// World state is a `BTreeMap`, so scans come back in lexicographic key order like a
/// real ledger range query. [`LedgerStore::apply`] is atomic: every operation is
/// checked against the injected faults before anything is written.
///
/// Clones share the same world state.
///
/// # Example
///
/// ```
/// use ledger_ticketing_testing::InMemoryLedger;
/// use ledger_ticketing_core::LedgerStore;
///
/// let ledger = InMemoryLedger::new();
/// ledger.put("E1", b"{}".to_vec()).unwrap();
/// assert_eq!(ledger.len(), 1);
/// assert_eq!(ledger.scan("", "").unwrap().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryLedger {
    inner: Arc<Mutex<LedgerInner>>,
}

impl InMemoryLedger {
    /// Create a new empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store raw bytes without going through fault checks (for seeding fixtures)
    pub fn seed(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.lock().entries.insert(key.into(), value.into());
    }

    /// Raw value at `key`, bypassing fault checks
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().entries.get(key).cloned()
    }

    /// Returns `true` if `key` is present
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// All keys in order
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.lock().entries.keys().cloned().collect()
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns `true` if the world state is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Notifications emitted so far, in order
    #[must_use]
    pub fn notifications(&self) -> Vec<RecordedNotification> {
        self.lock().notifications.clone()
    }

    /// Number of successful puts so far
    #[must_use]
    pub fn put_count(&self) -> usize {
        self.lock().puts
    }

    /// Make every read of `key` fail
    pub fn fail_get_on(&self, key: impl Into<String>) {
        self.lock().faults.get_keys.insert(key.into());
    }

    /// Make every write of `key` fail with a backend error
    pub fn fail_put_on(&self, key: impl Into<String>) {
        self.lock().faults.put_keys.insert(key.into());
    }

    /// Make every write of `key` fail with a write conflict
    pub fn conflict_on(&self, key: impl Into<String>) {
        self.lock().faults.conflict_keys.insert(key.into());
    }

    /// Allow `allowed` more successful puts, then fail every later one
    pub fn fail_puts_after(&self, allowed: usize) {
        let mut inner = self.lock();
        inner.faults.puts_allowed = Some(inner.puts + allowed);
    }

    /// Make every scan fail
    pub fn fail_scans(&self) {
        self.lock().faults.fail_scans = true;
    }

    /// Make every notification fail
    pub fn fail_emits(&self) {
        self.lock().faults.fail_emits = true;
    }

    /// Make every delete fail
    pub fn fail_deletes(&self) {
        self.lock().faults.fail_deletes = true;
    }

    /// Remove every injected fault
    pub fn clear_faults(&self) {
        self.lock().faults = Faults::default();
    }
}

impl LedgerStore for InMemoryLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let inner = self.lock();
        if inner.faults.get_keys.contains(key) {
            return Err(LedgerError::Backend(format!("injected get failure at '{key}'")));
        }
        Ok(inner.entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        let mut inner = self.lock();
        inner.check_put(key, inner.puts)?;
        inner.entries.insert(key.to_string(), value);
        inner.puts += 1;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), LedgerError> {
        let mut inner = self.lock();
        inner.check_delete(key)?;
        inner.entries.remove(key);
        Ok(())
    }

    fn scan(&self, start_key: &str, end_key: &str) -> Result<Vec<KeyValue>, LedgerError> {
        let inner = self.lock();
        if inner.faults.fail_scans {
            return Err(LedgerError::Backend("injected scan failure".to_string()));
        }
        Ok(inner
            .entries
            .iter()
            .filter(|(key, _)| in_range(key, start_key, end_key))
            .map(|(key, value)| KeyValue::new(key.clone(), value.clone()))
            .collect())
    }

    fn emit(&self, name: &str, payload: Vec<u8>) -> Result<(), LedgerError> {
        let mut inner = self.lock();
        inner.check_emit(name)?;
        inner.notifications.push(RecordedNotification {
            name: name.to_string(),
            payload,
        });
        Ok(())
    }

    fn apply(&self, ops: Vec<LedgerOp>) -> Result<(), LedgerError> {
        let mut inner = self.lock();

        // Validate the whole batch before touching world state
        let mut nth_put = inner.puts;
        for (op_index, op) in ops.iter().enumerate() {
            let check = match op {
                LedgerOp::Put { key, .. } => {
                    let check = inner.check_put(key, nth_put);
                    nth_put += 1;
                    check
                }
                LedgerOp::Delete { key } => inner.check_delete(key),
                LedgerOp::Emit { name, .. } => inner.check_emit(name),
            };
            if let Err(error) = check {
                tracing::debug!(op_index, %error, "In-memory ledger rejected batch");
                return Err(LedgerError::BatchRejected {
                    op_index,
                    reason: error.to_string(),
                });
            }
        }

        for op in ops {
            match op {
                LedgerOp::Put { key, value } => {
                    inner.entries.insert(key, value);
                    inner.puts += 1;
                }
                LedgerOp::Delete { key } => {
                    inner.entries.remove(&key);
                }
                LedgerOp::Emit { name, payload } => {
                    inner.notifications.push(RecordedNotification { name, payload });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    #[test]
    fn scan_is_ordered_and_bounded() {
        let ledger = InMemoryLedger::new();
        ledger.seed("b", "2");
        ledger.seed("a", "1");
        ledger.seed("c", "3");

        let all: Vec<String> = ledger
            .scan("", "")
            .unwrap()
            .into_iter()
            .map(|kv| kv.key)
            .collect();
        assert_eq!(all, vec!["a", "b", "c"]);

        let bounded: Vec<String> = ledger
            .scan("b", "c")
            .unwrap()
            .into_iter()
            .map(|kv| kv.key)
            .collect();
        assert_eq!(bounded, vec!["b"]);
    }

    #[test]
    fn delete_of_absent_key_succeeds() {
        let ledger = InMemoryLedger::new();
        assert!(ledger.delete("missing").is_ok());
        assert!(ledger.delete("missing").is_ok());
    }

    #[test]
    fn fail_puts_after_counts_from_now() {
        let ledger = InMemoryLedger::new();
        ledger.put("x", b"1".to_vec()).unwrap();
        ledger.fail_puts_after(1);

        assert!(ledger.put("y", b"2".to_vec()).is_ok());
        assert!(ledger.put("z", b"3".to_vec()).is_err());
        assert_eq!(ledger.keys(), vec!["x", "y"]);
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let ledger = InMemoryLedger::new();
        ledger.fail_put_on("b");

        let result = ledger.apply(vec![
            LedgerOp::Put {
                key: "a".to_string(),
                value: b"1".to_vec(),
            },
            LedgerOp::Emit {
                name: "Created".to_string(),
                payload: b"a".to_vec(),
            },
            LedgerOp::Put {
                key: "b".to_string(),
                value: b"2".to_vec(),
            },
        ]);

        assert!(matches!(
            result,
            Err(LedgerError::BatchRejected { op_index: 2, .. })
        ));
        assert!(ledger.is_empty());
        assert!(ledger.notifications().is_empty());
    }

    #[test]
    fn emits_are_recorded_in_order() {
        let ledger = InMemoryLedger::new();
        ledger.emit("First", b"one".to_vec()).unwrap();
        ledger.emit("Second", b"two".to_vec()).unwrap();

        let notifications = ledger.notifications();
        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0].name, "First");
        assert_eq!(notifications[1].payload_text(), "two");
    }

    #[test]
    fn injected_emit_failure_is_reported() {
        let ledger = InMemoryLedger::new();
        ledger.fail_emits();
        let error = ledger.emit("CreateEvent", Vec::new()).unwrap_err();
        assert!(matches!(error, LedgerError::EmitFailed { .. }));

        ledger.clear_faults();
        assert!(ledger.emit("CreateEvent", Vec::new()).is_ok());
    }

    #[test]
    fn clones_share_world_state() {
        let ledger = InMemoryLedger::new();
        let handle = ledger.clone();
        handle.put("k", b"v".to_vec()).unwrap();
        assert!(ledger.contains("k"));
    }
}
