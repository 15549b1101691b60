//! Multi-key set algebra.
//!
//! Every operation starts with a single batched read of all the metas involved, so
//! absent and empty sets are known before any member row is touched. Filtering a working
//! set against another set either probes the other set's rows for each working member or
//! scans the other set, whichever reads fewer rows.

use crate::datamodel::Keyspace;
use crate::set::error::SetResult;
use crate::set::handle::SetHandle;
use crate::set::meta::{SetMeta, encode_meta_key};
use kvstore::KvTransaction;
use std::collections::{BTreeSet, HashSet};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Keep {
    /// Members also found in the other set.
    Common,
    /// Members not found in the other set.
    Missing,
}

/// Members of any of `keys`, each once, in member byte order.
pub async fn union<T: KvTransaction>(
    txn: &T,
    keyspace: &Keyspace,
    keys: &[Vec<u8>],
) -> SetResult<Vec<Vec<u8>>> {
    let keys = distinct(keys.iter().map(Vec::as_slice));
    let mut result = BTreeSet::new();
    for mut set in prefetch(txn, keyspace, &keys).await? {
        result.extend(set.members().await?);
    }
    Ok(result.into_iter().collect())
}

/// Members present in all of `keys`, or `None` when one of them is absent or empty.
pub async fn intersection<T: KvTransaction>(
    txn: &T,
    keyspace: &Keyspace,
    keys: &[Vec<u8>],
) -> SetResult<Option<Vec<Vec<u8>>>> {
    let keys = distinct(keys.iter().map(Vec::as_slice));
    let mut sized = Vec::with_capacity(keys.len());
    for mut set in prefetch(txn, keyspace, &keys).await? {
        let cardinality = set.cardinality().await?;
        if cardinality == 0 {
            return Ok(None);
        }
        sized.push((cardinality, set));
    }
    sized.sort_by_key(|(cardinality, _)| *cardinality);

    let mut sets = sized.into_iter();
    let Some((_, mut smallest)) = sets.next() else {
        return Ok(Some(Vec::new()));
    };
    let mut working = smallest.members().await?;
    for (cardinality, mut other) in sets {
        if working.is_empty() {
            break;
        }
        working = filter(&mut other, cardinality, working, Keep::Common).await?;
    }
    Ok(Some(working))
}

/// Members of the first key's set that are in none of the others.
pub async fn difference<T: KvTransaction>(
    txn: &T,
    keyspace: &Keyspace,
    keys: &[Vec<u8>],
) -> SetResult<Vec<Vec<u8>>> {
    let Some((first, rest)) = keys.split_first() else {
        return Ok(Vec::new());
    };
    // `rest` may repeat `first`; that empties the result and must not be deduplicated away.
    let mut keys = vec![first.as_slice()];
    keys.extend(distinct(rest.iter().map(Vec::as_slice)));

    let mut sets = prefetch(txn, keyspace, &keys).await?.into_iter();
    let Some(mut head) = sets.next() else {
        return Ok(Vec::new());
    };
    let mut working = head.members().await?;
    for mut other in sets {
        if working.is_empty() {
            break;
        }
        let cardinality = other.cardinality().await?;
        if cardinality == 0 {
            continue;
        }
        working = filter(&mut other, cardinality, working, Keep::Missing).await?;
    }
    Ok(working)
}

/// Handles for `keys` with their metas read in one round trip.
async fn prefetch<'a, T: KvTransaction>(
    txn: &'a T,
    keyspace: &'a Keyspace,
    keys: &[&[u8]],
) -> SetResult<Vec<SetHandle<'a, T>>> {
    let meta_keys: Vec<Vec<u8>> = keys.iter().map(|k| encode_meta_key(keyspace, k)).collect();
    let rows = txn.batch_get(&meta_keys).await?;
    keys.iter()
        .zip(rows)
        .map(|(key, row)| -> SetResult<SetHandle<'a, T>> {
            let meta = row.map(|bytes| SetMeta::decode(&bytes)).transpose()?;
            Ok(SetHandle::with_meta(txn, keyspace, key, meta))
        })
        .collect()
}

async fn filter<T: KvTransaction>(
    other: &mut SetHandle<'_, T>,
    cardinality: i64,
    working: Vec<Vec<u8>>,
    keep: Keep,
) -> SetResult<Vec<Vec<u8>>> {
    let found = if (working.len() as i64) < cardinality {
        other.contains_each(&working).await?
    } else {
        let members: HashSet<Vec<u8>> = other.members().await?.into_iter().collect();
        working.iter().map(|m| members.contains(m)).collect()
    };
    let wanted = keep == Keep::Common;
    Ok(working
        .into_iter()
        .zip(found)
        .filter(|(_, found)| *found == wanted)
        .map(|(member, _)| member)
        .collect())
}

fn distinct<'k>(keys: impl Iterator<Item = &'k [u8]>) -> Vec<&'k [u8]> {
    let mut seen = HashSet::new();
    keys.filter(|k| seen.insert(*k)).collect()
}
