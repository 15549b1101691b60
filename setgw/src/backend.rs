use crate::config::{BackendKind, Config};
use crate::datamodel::Keyspace;
use crate::set::error::{SetError, SetResult};
use kvstore::{KvStore, KvTransaction, MemoryStore};
use std::future::Future;
use tokio::time::{Duration, sleep};

const INITIAL_BACKOFF_MS: u64 = 5;
const MAX_BACKOFF_MS: u64 = 500;

/// Work executed inside a single transaction. A failed attempt is re-run from the start
/// on a fresh transaction, so `run` must not carry state between attempts.
pub trait TxnOperation: Send + Sync {
    type Output: Send;

    fn run<T: KvTransaction>(
        &self,
        txn: &T,
        keyspace: &Keyspace,
    ) -> impl Future<Output = SetResult<Self::Output>> + Send;
}

#[derive(Clone)]
pub enum Storage {
    Memory(MemoryStore),
    #[cfg(feature = "foundationdb")]
    FoundationDb(kvstore::FoundationDB),
}

impl Storage {
    /// Opens the engine chosen in `config`. The FoundationDB network must already be booted.
    pub fn open(config: &Config) -> std::io::Result<Self> {
        match config.backend {
            BackendKind::Memory => Ok(Storage::Memory(MemoryStore::new())),
            #[cfg(feature = "foundationdb")]
            BackendKind::Foundationdb => kvstore::FoundationDB::open(config.cluster_file.as_deref())
                .map(Storage::FoundationDb)
                .map_err(std::io::Error::other),
            #[cfg(not(feature = "foundationdb"))]
            BackendKind::Foundationdb => Err(std::io::Error::other(
                "built without the `foundationdb` feature",
            )),
        }
    }
}

/// Storage plus the retry policy applied to every operation.
#[derive(Clone)]
pub struct Backend {
    storage: Storage,
    max_retries: usize,
}

impl Backend {
    pub fn new(storage: Storage, max_retries: usize) -> Self {
        Self {
            storage,
            max_retries,
        }
    }

    pub fn memory() -> Self {
        Self::new(Storage::Memory(MemoryStore::new()), 5)
    }

    pub async fn run<J: TxnOperation>(&self, op: &J, keyspace: &Keyspace) -> SetResult<J::Output> {
        match &self.storage {
            Storage::Memory(store) => run_in_transaction(store, op, keyspace, self.max_retries).await,
            #[cfg(feature = "foundationdb")]
            Storage::FoundationDb(db) => run_in_transaction(db, op, keyspace, self.max_retries).await,
        }
    }
}

/// Runs `op` in a transaction and commits it, retrying the whole operation while the
/// failure is retryable and attempts remain.
pub async fn run_in_transaction<S: KvStore, J: TxnOperation>(
    store: &S,
    op: &J,
    keyspace: &Keyspace,
    max_retries: usize,
) -> SetResult<J::Output> {
    let mut backoff = INITIAL_BACKOFF_MS;
    let mut retries = 0;
    loop {
        match attempt(store, op, keyspace).await {
            Err(SetError::Kv(e)) if e.is_retryable() && retries < max_retries => {
                retries += 1;
                log::warn!("{} (retry {}/{} in {}ms)", e, retries, max_retries, backoff);
                sleep(Duration::from_millis(backoff)).await;
                backoff = (backoff * 2).min(MAX_BACKOFF_MS);
            }
            result => return result,
        }
    }
}

async fn attempt<S: KvStore, J: TxnOperation>(
    store: &S,
    op: &J,
    keyspace: &Keyspace,
) -> SetResult<J::Output> {
    let txn = store.begin()?;
    // Dropping `txn` on error rolls it back.
    let output = op.run(&txn, keyspace).await?;
    store.commit(txn).await?;
    Ok(output)
}
