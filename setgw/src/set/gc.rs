//! Reclamation of member rows left behind by deleted sets.
//!
//! Deleting a set only removes its meta and records the retired incarnation under the
//! GC prefix. [`Sweep`] later clears the orphaned rows in bounded batches.

use crate::backend::TxnOperation;
use crate::datamodel::Keyspace;
use crate::set::error::{SetError, SetResult};
use crate::set::member::{MemberSpace, PRESENT};
use crate::set::meta::Incarnation;
use foundationdb_tuple::Bytes;
use kvstore::KvTransaction;

/// Marks `incarnation` for reclamation.
pub fn retire<T: KvTransaction>(txn: &T, keyspace: &Keyspace, incarnation: &Incarnation) {
    txn.set(&keyspace.gc().pack(&incarnation.as_bytes()), PRESENT);
}

/// One bounded pass over retired incarnations.
pub struct Sweep {
    pub batch_size: usize,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Member rows cleared.
    pub rows: usize,
    /// Incarnations fully reclaimed.
    pub finished: usize,
}

impl TxnOperation for Sweep {
    type Output = SweepStats;

    async fn run<T: KvTransaction>(&self, txn: &T, keyspace: &Keyspace) -> SetResult<SweepStats> {
        let gc = keyspace.gc();
        let (begin, end) = gc.range();
        let pending = txn.scan(&begin, &end, Some(self.batch_size)).await?;

        let mut stats = SweepStats::default();
        for (gc_key, _) in pending {
            let raw: Bytes = gc
                .unpack(&gc_key)
                .map_err(|e| SetError::MalformedMeta(format!("gc record: {:?}", e)))?;
            let incarnation = Incarnation::try_from(&*raw.0)?;
            let space = MemberSpace::new(keyspace, &incarnation);
            let (begin, end) = space.range();
            let rows = txn.scan(&begin, &end, Some(self.batch_size)).await?;
            for (key, _) in &rows {
                txn.clear(key);
            }
            stats.rows += rows.len();
            if rows.len() < self.batch_size {
                txn.clear(&gc_key);
                stats.finished += 1;
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::run_in_transaction;
    use crate::set::handle::SetHandle;
    use kvstore::{KvStore, MemoryStore};

    async fn raw_rows(store: &MemoryStore, keyspace: &Keyspace) -> usize {
        let txn = store.begin().unwrap();
        let (begin, end) = keyspace.member_rows().range();
        txn.scan(&begin, &end, None).await.unwrap().len()
    }

    #[tokio::test]
    async fn test_sweep_reclaims_deleted_set_in_batches() {
        let store = MemoryStore::new();
        let keyspace = Keyspace::new("gc-test", 0);
        let members: Vec<Vec<u8>> = (0..10u8).map(|i| vec![b'm', i]).collect();

        let txn = store.begin().unwrap();
        let mut set = SetHandle::new(&txn, &keyspace, b"big");
        set.add(&members).await.unwrap();
        set.destroy().await.unwrap();
        store.commit(txn).await.unwrap();
        assert_eq!(raw_rows(&store, &keyspace).await, 10);

        let sweep = Sweep { batch_size: 4 };
        let stats = run_in_transaction(&store, &sweep, &keyspace, 0).await.unwrap();
        assert_eq!(stats, SweepStats { rows: 4, finished: 0 });
        let stats = run_in_transaction(&store, &sweep, &keyspace, 0).await.unwrap();
        assert_eq!(stats, SweepStats { rows: 4, finished: 0 });
        let stats = run_in_transaction(&store, &sweep, &keyspace, 0).await.unwrap();
        assert_eq!(stats, SweepStats { rows: 2, finished: 1 });
        assert_eq!(raw_rows(&store, &keyspace).await, 0);

        let stats = run_in_transaction(&store, &sweep, &keyspace, 0).await.unwrap();
        assert_eq!(stats, SweepStats::default());
    }

    #[tokio::test]
    async fn test_sweep_leaves_live_sets_alone() {
        let store = MemoryStore::new();
        let keyspace = Keyspace::new("gc-test", 0);

        let txn = store.begin().unwrap();
        let mut dead = SetHandle::new(&txn, &keyspace, b"k");
        dead.add(&[b"old".to_vec()]).await.unwrap();
        dead.destroy().await.unwrap();
        let mut live = SetHandle::new(&txn, &keyspace, b"k");
        live.add(&[b"new".to_vec()]).await.unwrap();
        store.commit(txn).await.unwrap();

        run_in_transaction(&store, &Sweep { batch_size: 16 }, &keyspace, 0)
            .await
            .unwrap();

        let txn = store.begin().unwrap();
        let mut set = SetHandle::new(&txn, &keyspace, b"k");
        assert_eq!(set.members().await.unwrap(), vec![b"new".to_vec()]);
        assert_eq!(raw_rows(&store, &keyspace).await, 1);
    }
}
