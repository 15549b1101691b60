use crate::{KeyValue, KvError, KvResult, KvStore, KvTransaction};
use foundationdb::{Database, FdbError, RangeOption, Transaction};
use futures::TryStreamExt;
use std::sync::Arc;

/// `not_committed`: the transaction lost a conflict check at commit time.
const NOT_COMMITTED: i32 = 1020;

/// Starts the FoundationDB client network. The returned guard must outlive every
/// database handle.
pub fn boot() -> foundationdb::api::NetworkAutoStop {
    unsafe { foundationdb::boot() }
}

#[derive(Clone)]
pub struct FoundationDB {
    pub database: Arc<Database>,
}

impl FoundationDB {
    pub fn new(db: Arc<Database>) -> Self {
        Self { database: db }
    }

    /// Connects using `cluster_file`, or the client's default cluster file when `None`.
    pub fn open(cluster_file: Option<&str>) -> KvResult<Self> {
        let db = Database::new(cluster_file)?;
        Ok(Self::new(Arc::new(db)))
    }
}

impl From<FdbError> for KvError {
    fn from(err: FdbError) -> Self {
        if err.code() == NOT_COMMITTED {
            return KvError::Conflict;
        }
        KvError::Backend {
            code: err.code(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

pub struct FdbTransaction {
    trx: Transaction,
}

impl KvTransaction for FdbTransaction {
    async fn get(&self, key: &[u8]) -> KvResult<Option<Vec<u8>>> {
        let value = self.trx.get(key, false).await?;
        Ok(value.map(|v| v.to_vec()))
    }

    async fn batch_get(&self, keys: &[Vec<u8>]) -> KvResult<Vec<Option<Vec<u8>>>> {
        // Issue every read before awaiting any of them so they share one round trip.
        let reads = keys.iter().map(|key| self.trx.get(key, false));
        let values = futures::future::try_join_all(reads).await?;
        Ok(values
            .into_iter()
            .map(|value| value.map(|v| v.to_vec()))
            .collect())
    }

    fn set(&self, key: &[u8], value: &[u8]) {
        self.trx.set(key, value);
    }

    fn clear(&self, key: &[u8]) {
        self.trx.clear(key);
    }

    async fn scan(&self, begin: &[u8], end: &[u8], limit: Option<usize>) -> KvResult<Vec<KeyValue>> {
        let mut range = RangeOption::from((begin, end));
        range.limit = limit;
        let records = self
            .trx
            .get_ranges_keyvalues(range, false)
            .map_ok(|kv| (kv.key().to_vec(), kv.value().to_vec()))
            .try_collect::<Vec<KeyValue>>()
            .await?;
        Ok(records)
    }
}

impl KvStore for FoundationDB {
    type Transaction = FdbTransaction;

    fn begin(&self) -> KvResult<FdbTransaction> {
        let trx = self.database.create_trx()?;
        Ok(FdbTransaction { trx })
    }

    async fn commit(&self, txn: FdbTransaction) -> KvResult<()> {
        txn.trx
            .commit()
            .await
            .map(|_| ())
            .map_err(|e| KvError::from(FdbError::from(e)))
    }
}
