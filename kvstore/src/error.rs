use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KvError {
    /// Another transaction committed a conflicting write first.
    #[error("transaction conflict")]
    Conflict,

    #[error("storage error {code}: {message}")]
    Backend {
        code: i32,
        message: String,
        retryable: bool,
    },
}

impl KvError {
    /// Whether re-running the whole transaction from scratch may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            KvError::Conflict => true,
            KvError::Backend { retryable, .. } => *retryable,
        }
    }
}
