use foundationdb_tuple::{Subspace, TupleDepth, TuplePack, VersionstampOffset};
use std::io::Write;

/// Row families stored under a gateway namespace.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DataPrefix {
    /// `(Meta, db, user_key)` -> encoded object meta.
    Meta = 31,
    /// `(Member, incarnation, member)` -> presence marker.
    Member = 32,
    /// `(Gc, incarnation)` -> marker for an incarnation awaiting reclamation.
    Gc = 33,
}

impl TuplePack for DataPrefix {
    fn pack<W: Write>(
        &self,
        w: &mut W,
        tuple_depth: TupleDepth,
    ) -> std::io::Result<VersionstampOffset> {
        (*self as u64).pack(w, tuple_depth)
    }
}

/// Physical key layout for one namespace and one logical database.
///
/// Meta rows are scoped by database because user keys are. Member and GC rows are
/// scoped by incarnation only: incarnation ids are unique across databases.
#[derive(Clone, Debug)]
pub struct Keyspace {
    root: Subspace,
    db: u64,
}

impl Keyspace {
    pub fn new(namespace: &str, db: u64) -> Self {
        Self {
            root: Subspace::all().subspace(&namespace),
            db,
        }
    }

    pub fn db(&self) -> u64 {
        self.db
    }

    pub fn meta(&self) -> Subspace {
        self.root.subspace(&(DataPrefix::Meta, self.db))
    }

    /// Member rows of every incarnation.
    pub fn member_rows(&self) -> Subspace {
        self.root.subspace(&DataPrefix::Member)
    }

    pub fn members(&self, incarnation: &[u8]) -> Subspace {
        self.member_rows().subspace(&incarnation)
    }

    pub fn gc(&self) -> Subspace {
        self.root.subspace(&DataPrefix::Gc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_databases_do_not_share_meta_rows() {
        let db0 = Keyspace::new("ns", 0);
        let db1 = Keyspace::new("ns", 1);
        assert_ne!(db0.meta().pack(&b"k".as_slice()), db1.meta().pack(&b"k".as_slice()));
    }

    #[test]
    fn test_namespaces_are_disjoint() {
        let a = Keyspace::new("a", 0);
        let b = Keyspace::new("b", 0);
        let (begin, end) = a.meta().range();
        let other = b.meta().pack(&b"k".as_slice());
        assert!(!(other >= begin && other < end));
    }

    #[test]
    fn test_member_rows_share_incarnation_prefix() {
        let ks = Keyspace::new("ns", 0);
        let id = [7u8; 16];
        let (begin, end) = ks.members(&id).range();
        let key = ks.members(&id).pack(&b"member".as_slice());
        assert!(key > begin && key < end);

        let (gc_begin, gc_end) = ks.gc().range();
        assert!(!(key >= gc_begin && key < gc_end));
    }
}
