//! Transactional key-value capability used by the set gateway.
//!
//! A [`KvStore`] hands out [`KvTransaction`]s. Reads inside a transaction observe a
//! single snapshot plus the transaction's own writes; writes become visible to others
//! only once [`KvStore::commit`] succeeds. Dropping a transaction without committing
//! it discards its writes.
//!
//! Two engines implement the traits: [`MemoryStore`], an in-process multi-version
//! map, and (with the `foundationdb` feature) [`FoundationDB`].

mod error;
pub mod memory;

#[cfg(feature = "foundationdb")]
pub mod fdb;

pub use error::KvError;
pub use memory::{MemoryStore, MemoryTransaction};

#[cfg(feature = "foundationdb")]
pub use fdb::{FdbTransaction, FoundationDB};

pub type KvResult<T> = std::result::Result<T, KvError>;

/// A `(key, value)` row returned by range reads.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// Operations available inside one transaction.
pub trait KvTransaction: Send + Sync {
    /// Point read of `key`.
    fn get(&self, key: &[u8]) -> impl std::future::Future<Output = KvResult<Option<Vec<u8>>>> + Send;

    /// Point reads of several keys in one round trip. The result is index-aligned with `keys`.
    fn batch_get(
        &self,
        keys: &[Vec<u8>],
    ) -> impl std::future::Future<Output = KvResult<Vec<Option<Vec<u8>>>>> + Send;

    /// Buffers a write of `value` at `key`.
    fn set(&self, key: &[u8], value: &[u8]);

    /// Buffers a deletion of `key`.
    fn clear(&self, key: &[u8]);

    /// Ordered read of the rows in `[begin, end)`, at most `limit` of them.
    fn scan(
        &self,
        begin: &[u8],
        end: &[u8],
        limit: Option<usize>,
    ) -> impl std::future::Future<Output = KvResult<Vec<KeyValue>>> + Send;
}

/// A database that can start and commit transactions.
pub trait KvStore: Clone + Send + Sync + 'static {
    type Transaction: KvTransaction + 'static;

    fn begin(&self) -> KvResult<Self::Transaction>;

    fn commit(&self, txn: Self::Transaction) -> impl std::future::Future<Output = KvResult<()>> + Send;
}
