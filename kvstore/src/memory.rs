//! In-process multi-version engine.
//!
//! Every committed write is stored as a new version of its key. A transaction reads
//! the versions that were committed when it began, overlaid with its own buffered
//! writes. At commit time a transaction that wrote something fails with
//! [`KvError::Conflict`] if any key it read or wrote, or any key inside a range it
//! scanned, gained a newer version in the meantime. Read-only commits always succeed.

use crate::{KeyValue, KvError, KvResult, KvStore, KvTransaction};
use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct Version {
    at: u64,
    /// `None` is a tombstone.
    value: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
struct Engine {
    /// Versions of each key, oldest first.
    rows: BTreeMap<Vec<u8>, Vec<Version>>,
    committed: u64,
    /// Read versions of live transactions, with how many transactions hold each.
    readers: BTreeMap<u64, usize>,
}

impl Engine {
    fn visible(versions: &[Version], at: u64) -> Option<&Vec<u8>> {
        versions
            .iter()
            .rev()
            .find(|v| v.at <= at)
            .and_then(|v| v.value.as_ref())
    }

    fn read(&self, key: &[u8], at: u64) -> Option<Vec<u8>> {
        self.rows
            .get(key)
            .and_then(|versions| Self::visible(versions, at))
            .cloned()
    }

    fn written_after(&self, key: &[u8], at: u64) -> bool {
        self.rows
            .get(key)
            .and_then(|versions| versions.last())
            .is_some_and(|v| v.at > at)
    }

    fn range_written_after(&self, begin: &[u8], end: &[u8], at: u64) -> bool {
        if begin >= end {
            return false;
        }
        self.rows
            .range::<[u8], _>((Bound::Included(begin), Bound::Excluded(end)))
            .any(|(_, versions)| versions.last().is_some_and(|v| v.at > at))
    }

    fn horizon(&self) -> u64 {
        self.readers
            .keys()
            .next()
            .copied()
            .unwrap_or(self.committed)
    }

    /// Drops the versions of `key` that no live transaction can observe anymore.
    fn prune(&mut self, key: &[u8]) {
        let horizon = self.horizon();
        let Some(versions) = self.rows.get_mut(key) else {
            return;
        };
        if let Some(pos) = versions.iter().rposition(|v| v.at <= horizon) {
            versions.drain(..pos);
        }
        if versions.len() == 1 && versions[0].value.is_none() && versions[0].at <= horizon {
            self.rows.remove(key);
        }
    }

    fn release_reader(&mut self, read_version: u64) {
        if let Some(count) = self.readers.get_mut(&read_version) {
            *count -= 1;
            if *count == 0 {
                self.readers.remove(&read_version);
            }
        }
    }

    fn apply(&mut self, read_version: u64, state: TxnState) -> KvResult<()> {
        // A read-only transaction saw a consistent snapshot and changes nothing.
        if state.writes.is_empty() {
            return Ok(());
        }
        let stale_key = state
            .read_keys
            .iter()
            .chain(state.writes.keys())
            .any(|key| self.written_after(key, read_version));
        let stale_range = state
            .read_ranges
            .iter()
            .any(|(begin, end)| self.range_written_after(begin, end, read_version));
        if stale_key || stale_range {
            return Err(KvError::Conflict);
        }

        self.committed += 1;
        let version = self.committed;
        for (key, value) in state.writes {
            self.rows
                .entry(key.clone())
                .or_default()
                .push(Version { at: version, value });
            self.prune(&key);
        }
        log::trace!("memory store committed version {}", version);
        Ok(())
    }
}

fn lock(engine: &Mutex<Engine>) -> MutexGuard<'_, Engine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared handle to an in-memory database. Clones share the same data.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    engine: Arc<Mutex<Engine>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    type Transaction = MemoryTransaction;

    fn begin(&self) -> KvResult<MemoryTransaction> {
        let mut engine = lock(&self.engine);
        let read_version = engine.committed;
        *engine.readers.entry(read_version).or_default() += 1;
        Ok(MemoryTransaction {
            engine: Arc::clone(&self.engine),
            read_version,
            finished: AtomicBool::new(false),
            state: Mutex::default(),
        })
    }

    async fn commit(&self, txn: MemoryTransaction) -> KvResult<()> {
        let state = std::mem::take(&mut *txn.state());
        txn.finished.store(true, Ordering::Release);
        let result = {
            let mut engine = lock(&self.engine);
            // A committing transaction reads nothing more, so its snapshot need not be retained.
            engine.release_reader(txn.read_version);
            engine.apply(txn.read_version, state)
        };
        if result.is_err() {
            log::debug!(
                "memory store rejected commit at read version {}",
                txn.read_version
            );
        }
        result
    }
}

#[derive(Debug, Default)]
struct TxnState {
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    read_keys: HashSet<Vec<u8>>,
    read_ranges: Vec<(Vec<u8>, Vec<u8>)>,
}

#[derive(Debug)]
pub struct MemoryTransaction {
    engine: Arc<Mutex<Engine>>,
    read_version: u64,
    finished: AtomicBool,
    state: Mutex<TxnState>,
}

impl MemoryTransaction {
    // Lock order is always transaction state first, engine second.
    fn state(&self) -> MutexGuard<'_, TxnState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_one(&self, state: &mut TxnState, engine: &Engine, key: &[u8]) -> Option<Vec<u8>> {
        if let Some(local) = state.writes.get(key) {
            return local.clone();
        }
        state.read_keys.insert(key.to_vec());
        engine.read(key, self.read_version)
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if !self.finished.load(Ordering::Acquire) {
            lock(&self.engine).release_reader(self.read_version);
        }
    }
}

impl KvTransaction for MemoryTransaction {
    async fn get(&self, key: &[u8]) -> KvResult<Option<Vec<u8>>> {
        let mut state = self.state();
        let engine = lock(&self.engine);
        Ok(self.read_one(&mut state, &engine, key))
    }

    async fn batch_get(&self, keys: &[Vec<u8>]) -> KvResult<Vec<Option<Vec<u8>>>> {
        let mut state = self.state();
        let engine = lock(&self.engine);
        Ok(keys
            .iter()
            .map(|key| self.read_one(&mut state, &engine, key))
            .collect())
    }

    fn set(&self, key: &[u8], value: &[u8]) {
        self.state().writes.insert(key.to_vec(), Some(value.to_vec()));
    }

    fn clear(&self, key: &[u8]) {
        self.state().writes.insert(key.to_vec(), None);
    }

    async fn scan(&self, begin: &[u8], end: &[u8], limit: Option<usize>) -> KvResult<Vec<KeyValue>> {
        let limit = limit.unwrap_or(usize::MAX);
        if begin >= end || limit == 0 {
            return Ok(Vec::new());
        }

        let mut state = self.state();
        state.read_ranges.push((begin.to_vec(), end.to_vec()));
        let engine = lock(&self.engine);

        let bounds = (Bound::Included(begin), Bound::Excluded(end));
        let mut committed = engine
            .rows
            .range::<[u8], _>(bounds)
            .filter_map(|(k, versions)| Engine::visible(versions, self.read_version).map(|v| (k, v)))
            .peekable();
        let mut local = state.writes.range::<[u8], _>(bounds).peekable();

        let mut out = Vec::new();
        while out.len() < limit {
            let take_local = match (committed.peek(), local.peek()) {
                (None, None) => break,
                (Some(_), None) => false,
                (None, Some(_)) => true,
                (Some((ck, _)), Some((lk, _))) => lk <= ck,
            };
            if take_local {
                let Some((lk, lv)) = local.next() else { break };
                if committed.peek().is_some_and(|(ck, _)| *ck == lk) {
                    committed.next();
                }
                if let Some(value) = lv {
                    out.push((lk.clone(), value.clone()));
                }
            } else {
                let Some((ck, cv)) = committed.next() else { break };
                out.push((ck.clone(), cv.clone()));
            }
        }
        Ok(out)
    }
}
