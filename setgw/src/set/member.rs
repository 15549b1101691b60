use crate::datamodel::Keyspace;
use crate::set::error::{SetError, SetResult};
use crate::set::meta::Incarnation;
use foundationdb_tuple::{Bytes, Subspace};

/// Value of every member row. The row's existence is the fact being recorded.
pub const PRESENT: &[u8] = &[];

/// Member rows of one incarnation.
///
/// Members are packed as tuple byte strings, so the rows of an incarnation share the
/// subspace prefix and sort in member byte order.
pub struct MemberSpace {
    subspace: Subspace,
}

impl MemberSpace {
    pub fn new(keyspace: &Keyspace, incarnation: &Incarnation) -> Self {
        Self {
            subspace: keyspace.members(incarnation.as_bytes()),
        }
    }

    pub fn key(&self, member: &[u8]) -> Vec<u8> {
        self.subspace.pack(&member)
    }

    pub fn decode(&self, key: &[u8]) -> SetResult<Vec<u8>> {
        self.subspace
            .unpack::<Bytes>(key)
            .map(|member| member.0.into_owned())
            .map_err(|e| SetError::MalformedMember(format!("{:?}", e)))
    }

    pub fn range(&self) -> (Vec<u8>, Vec<u8>) {
        self.subspace.range()
    }
}
