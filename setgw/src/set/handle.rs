use crate::datamodel::Keyspace;
use crate::set::error::{SetError, SetResult};
use crate::set::gc;
use crate::set::member::{MemberSpace, PRESENT};
use crate::set::meta::{Incarnation, SetMeta, encode_meta_key};
use kvstore::KvTransaction;
use std::collections::HashSet;

/// A set bound to one user key inside one transaction.
///
/// The meta record is read at most once per handle and kept in step with every write the
/// handle makes. Nothing outlives the transaction.
pub struct SetHandle<'a, T: KvTransaction> {
    txn: &'a T,
    keyspace: &'a Keyspace,
    key: Vec<u8>,
    meta_key: Vec<u8>,
    // `None` until loaded; `Some(None)` for an absent or empty set.
    meta: Option<Option<SetMeta>>,
    // Incarnation of a stored meta whose length is 0.
    hollow: Option<Incarnation>,
}

impl<'a, T: KvTransaction> SetHandle<'a, T> {
    pub fn new(txn: &'a T, keyspace: &'a Keyspace, key: &[u8]) -> Self {
        Self {
            txn,
            keyspace,
            key: key.to_vec(),
            meta_key: encode_meta_key(keyspace, key),
            meta: None,
            hollow: None,
        }
    }

    /// Handle whose meta was already read, e.g. by a batched prefetch.
    pub fn with_meta(
        txn: &'a T,
        keyspace: &'a Keyspace,
        key: &[u8],
        meta: Option<SetMeta>,
    ) -> Self {
        let mut handle = Self::new(txn, keyspace, key);
        handle.settle(meta);
        handle
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub async fn load(&mut self) -> SetResult<Option<SetMeta>> {
        if let Some(meta) = self.meta {
            return Ok(meta);
        }
        let stored = match self.txn.get(&self.meta_key).await? {
            Some(bytes) => Some(SetMeta::decode(&bytes)?),
            None => None,
        };
        Ok(self.settle(stored))
    }

    /// Caches a stored meta; length 0 reads as absent.
    fn settle(&mut self, stored: Option<SetMeta>) -> Option<SetMeta> {
        self.hollow = stored.filter(|m| m.len == 0).map(|m| m.incarnation);
        let meta = stored.filter(|m| m.len > 0);
        self.meta = Some(meta);
        meta
    }

    pub async fn exists(&mut self) -> SetResult<bool> {
        Ok(self.load().await?.is_some())
    }

    pub async fn cardinality(&mut self) -> SetResult<i64> {
        Ok(self.load().await?.map_or(0, |m| m.len))
    }

    pub async fn is_member(&mut self, member: &[u8]) -> SetResult<bool> {
        let Some(meta) = self.load().await? else {
            return Ok(false);
        };
        let space = MemberSpace::new(self.keyspace, &meta.incarnation);
        Ok(self.txn.get(&space.key(member)).await?.is_some())
    }

    /// Every member, in member byte order.
    pub async fn members(&mut self) -> SetResult<Vec<Vec<u8>>> {
        let Some(meta) = self.load().await? else {
            return Ok(Vec::new());
        };
        self.scan_members(&meta, None).await
    }

    /// Membership of each candidate, index-aligned, in one batched read.
    pub async fn contains_each(&mut self, candidates: &[Vec<u8>]) -> SetResult<Vec<bool>> {
        let Some(meta) = self.load().await? else {
            return Ok(vec![false; candidates.len()]);
        };
        let space = MemberSpace::new(self.keyspace, &meta.incarnation);
        let keys: Vec<Vec<u8>> = candidates.iter().map(|m| space.key(m)).collect();
        let rows = self.txn.batch_get(&keys).await?;
        Ok(rows.iter().map(Option::is_some).collect())
    }

    /// Adds `members`, creating the set if needed. Returns how many were not present.
    pub async fn add(&mut self, members: &[Vec<u8>]) -> SetResult<i64> {
        let members = distinct(members);
        if members.is_empty() {
            return Ok(0);
        }

        let (mut meta, created) = match self.load().await? {
            Some(meta) => (meta, false),
            None => (SetMeta::create(), true),
        };
        if let Some(stale) = self.hollow.take() {
            gc::retire(self.txn, self.keyspace, &stale);
        }
        let space = MemberSpace::new(self.keyspace, &meta.incarnation);
        let keys: Vec<Vec<u8>> = members.iter().map(|m| space.key(m)).collect();
        // A fresh incarnation has no rows to look up.
        let rows = if created {
            vec![None; keys.len()]
        } else {
            self.txn.batch_get(&keys).await?
        };

        let mut added = 0;
        for (key, row) in keys.iter().zip(rows) {
            if row.is_none() {
                self.txn.set(key, PRESENT);
                added += 1;
            }
        }
        if added > 0 {
            meta.len += added;
            self.store(meta)?;
        }
        Ok(added)
    }

    /// Removes `members`. Returns how many were present.
    pub async fn remove(&mut self, members: &[Vec<u8>]) -> SetResult<i64> {
        let Some(meta) = self.load().await? else {
            return Ok(0);
        };
        let members = distinct(members);
        let space = MemberSpace::new(self.keyspace, &meta.incarnation);
        let keys: Vec<Vec<u8>> = members.iter().map(|m| space.key(m)).collect();
        let rows = self.txn.batch_get(&keys).await?;

        let mut removed = 0;
        for (key, row) in keys.iter().zip(rows) {
            if row.is_some() {
                self.txn.clear(key);
                removed += 1;
            }
        }
        self.shrink(meta, removed)?;
        Ok(removed)
    }

    /// Removes and returns up to `count` members, lowest member bytes first.
    pub async fn pop(&mut self, count: usize) -> SetResult<Vec<Vec<u8>>> {
        let Some(meta) = self.load().await? else {
            return Ok(Vec::new());
        };
        let limit = count.min(usize::try_from(meta.len).unwrap_or(usize::MAX));
        if limit == 0 {
            return Ok(Vec::new());
        }
        let space = MemberSpace::new(self.keyspace, &meta.incarnation);
        let members = self.scan_members(&meta, Some(limit)).await?;
        for member in &members {
            self.txn.clear(&space.key(member));
        }
        self.shrink(meta, members.len() as i64)?;
        Ok(members)
    }

    /// Moves `member` into `destination`. Returns whether the source held it.
    pub async fn move_to(
        &mut self,
        destination: &mut SetHandle<'_, T>,
        member: &[u8],
    ) -> SetResult<bool> {
        // Both sides must be sets before anything is written.
        destination.load().await?;
        if self.key == destination.key {
            return self.is_member(member).await;
        }
        let Some(meta) = self.load().await? else {
            return Ok(false);
        };
        let space = MemberSpace::new(self.keyspace, &meta.incarnation);
        let member_key = space.key(member);
        if self.txn.get(&member_key).await?.is_none() {
            return Ok(false);
        }
        self.txn.clear(&member_key);
        self.shrink(meta, 1)?;
        destination.add(&[member.to_vec()]).await?;
        Ok(true)
    }

    /// Deletes the set at once and hands its member rows to the sweeper.
    pub async fn destroy(&mut self) -> SetResult<bool> {
        let Some(meta) = self.load().await? else {
            // An empty stored meta is not a set, but its rows still need reclaiming.
            if let Some(stale) = self.hollow.take() {
                self.txn.clear(&self.meta_key);
                gc::retire(self.txn, self.keyspace, &stale);
            }
            return Ok(false);
        };
        self.txn.clear(&self.meta_key);
        gc::retire(self.txn, self.keyspace, &meta.incarnation);
        self.meta = Some(None);
        log::trace!("retired {:?} of key {:?}", meta.incarnation, self.key);
        Ok(true)
    }

    async fn scan_members(&self, meta: &SetMeta, limit: Option<usize>) -> SetResult<Vec<Vec<u8>>> {
        let space = MemberSpace::new(self.keyspace, &meta.incarnation);
        let (begin, end) = space.range();
        let rows = self.txn.scan(&begin, &end, limit).await?;
        rows.iter().map(|(key, _)| space.decode(key)).collect()
    }

    fn shrink(&mut self, mut meta: SetMeta, removed: i64) -> SetResult<()> {
        if removed == 0 {
            return Ok(());
        }
        if removed > meta.len {
            return Err(SetError::MalformedMeta(format!(
                "length {} is below the {} members removed",
                meta.len, removed
            )));
        }
        meta.len -= removed;
        self.store(meta)
    }

    fn store(&mut self, meta: SetMeta) -> SetResult<()> {
        if meta.len == 0 {
            self.txn.clear(&self.meta_key);
            self.meta = Some(None);
        } else {
            self.txn.set(&self.meta_key, &meta.encode()?);
            self.meta = Some(Some(meta));
        }
        Ok(())
    }
}

/// First occurrence of each member, input order kept.
fn distinct(members: &[Vec<u8>]) -> Vec<&[u8]> {
    let mut seen = HashSet::with_capacity(members.len());
    members
        .iter()
        .map(Vec::as_slice)
        .filter(|m| seen.insert(*m))
        .collect()
}
