use kvstore::KvError;
use thiserror::Error;

/// Failures of set operations. `Display` renders the RESP error line sent to clients.
#[derive(Debug, Error)]
pub enum SetError {
    /// A meta row could not be decoded. Never repaired in place.
    #[error("ERR corrupted set meta: {0}")]
    MalformedMeta(String),

    /// A member row key could not be decoded.
    #[error("ERR corrupted set member: {0}")]
    MalformedMember(String),

    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    /// Storage failure, passed through unchanged.
    #[error("ERR {0}")]
    Kv(#[from] KvError),
}

pub type SetResult<T> = std::result::Result<T, SetError>;
