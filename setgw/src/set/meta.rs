//! Meta codec: the fixed-size record kept per user key.
//!
//! Layout (bincode, big-endian fixed-width integers):
//!
//! ```text
//! object_type: u32 | incarnation: [u8; 16] | len: i64
//! ```

use crate::datamodel::Keyspace;
use crate::set::error::{SetError, SetResult};
use bincode::config::Config;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Encoded size of a meta record.
pub const META_LEN: usize = 28;

/// Object kinds sharing the meta keyspace.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ObjectType {
    String,
    List,
    Hash,
    Set,
    ZSet,
}

/// Generation identifier of a set. A key that is deleted and re-created gets a new one,
/// which leaves the old generation's member rows unreachable.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Incarnation([u8; 16]);

impl Incarnation {
    /// A fresh, time-ordered id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().into_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Incarnation {
    type Error = SetError;

    fn try_from(bytes: &[u8]) -> SetResult<Self> {
        <[u8; 16]>::try_from(bytes)
            .map(Self)
            .map_err(|_| SetError::MalformedMeta(format!("incarnation of {} bytes", bytes.len())))
    }
}

impl fmt::Debug for Incarnation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Incarnation({})", Uuid::from_bytes(self.0))
    }
}

#[derive(Serialize, Deserialize)]
struct MetaRecord {
    object_type: ObjectType,
    incarnation: Incarnation,
    len: i64,
}

/// Decoded meta of a live set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SetMeta {
    pub incarnation: Incarnation,
    pub len: i64,
}

fn codec() -> impl Config {
    bincode::config::standard()
        .with_big_endian()
        .with_fixed_int_encoding()
}

impl SetMeta {
    /// Meta of a set about to be created: new incarnation, no members yet.
    pub fn create() -> Self {
        Self {
            incarnation: Incarnation::generate(),
            len: 0,
        }
    }

    pub fn encode(&self) -> SetResult<Vec<u8>> {
        let record = MetaRecord {
            object_type: ObjectType::Set,
            incarnation: self.incarnation,
            len: self.len,
        };
        bincode::serde::encode_to_vec(&record, codec())
            .map_err(|e| SetError::MalformedMeta(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> SetResult<Self> {
        if bytes.len() != META_LEN {
            return Err(SetError::MalformedMeta(format!(
                "expected {} bytes, got {}",
                META_LEN,
                bytes.len()
            )));
        }
        let (record, _): (MetaRecord, usize) = bincode::serde::decode_from_slice(bytes, codec())
            .map_err(|e| SetError::MalformedMeta(e.to_string()))?;
        if record.object_type != ObjectType::Set {
            return Err(SetError::WrongType);
        }
        if record.len < 0 {
            return Err(SetError::MalformedMeta(format!("negative length {}", record.len)));
        }
        Ok(Self {
            incarnation: record.incarnation,
            len: record.len,
        })
    }
}

pub fn encode_meta_key(keyspace: &Keyspace, key: &[u8]) -> Vec<u8> {
    keyspace.meta().pack(&key)
}

#[cfg(test)]
pub(crate) fn encode_foreign_meta(object_type: ObjectType) -> Vec<u8> {
    let record = MetaRecord {
        object_type,
        incarnation: Incarnation::generate(),
        len: 1,
    };
    bincode::serde::encode_to_vec(&record, codec()).expect("encode")
}
