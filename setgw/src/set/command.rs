use crate::backend::TxnOperation;
use crate::datamodel::Keyspace;
use crate::set::algebra;
use crate::set::error::{SetError, SetResult};
use crate::set::handle::SetHandle;
use kvstore::KvTransaction;
use redis_protocol::resp2::types::OwnedFrame as Frame;

/// A parsed set command, ready to run inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetCommand {
    Add { key: Vec<u8>, members: Vec<Vec<u8>> },
    Remove { key: Vec<u8>, members: Vec<Vec<u8>> },
    Members { key: Vec<u8> },
    Card { key: Vec<u8> },
    IsMember { key: Vec<u8>, member: Vec<u8> },
    /// `count: None` is the single-member form, answered with a bulk string.
    Pop { key: Vec<u8>, count: Option<usize> },
    Move { source: Vec<u8>, destination: Vec<u8>, member: Vec<u8> },
    Union { keys: Vec<Vec<u8>> },
    Inter { keys: Vec<Vec<u8>> },
    Diff { keys: Vec<Vec<u8>> },
    Del { keys: Vec<Vec<u8>> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetReply {
    Integer(i64),
    Bulk(Option<Vec<u8>>),
    Array(Option<Vec<Vec<u8>>>),
}

impl From<SetReply> for Frame {
    fn from(reply: SetReply) -> Self {
        match reply {
            SetReply::Integer(n) => Frame::Integer(n),
            SetReply::Bulk(Some(value)) => Frame::BulkString(value),
            SetReply::Array(Some(values)) => {
                Frame::Array(values.into_iter().map(Frame::BulkString).collect())
            }
            SetReply::Bulk(None) | SetReply::Array(None) => Frame::Null,
        }
    }
}

impl From<SetError> for Frame {
    fn from(err: SetError) -> Self {
        Frame::Error(err.to_string().into())
    }
}

impl TxnOperation for SetCommand {
    type Output = SetReply;

    async fn run<T: KvTransaction>(&self, txn: &T, keyspace: &Keyspace) -> SetResult<SetReply> {
        let reply = match self {
            SetCommand::Add { key, members } => {
                SetReply::Integer(SetHandle::new(txn, keyspace, key).add(members).await?)
            }
            SetCommand::Remove { key, members } => {
                SetReply::Integer(SetHandle::new(txn, keyspace, key).remove(members).await?)
            }
            SetCommand::Members { key } => {
                SetReply::Array(Some(SetHandle::new(txn, keyspace, key).members().await?))
            }
            SetCommand::Card { key } => {
                SetReply::Integer(SetHandle::new(txn, keyspace, key).cardinality().await?)
            }
            SetCommand::IsMember { key, member } => {
                let found = SetHandle::new(txn, keyspace, key).is_member(member).await?;
                SetReply::Integer(found as i64)
            }
            SetCommand::Pop { key, count: None } => {
                let popped = SetHandle::new(txn, keyspace, key).pop(1).await?;
                SetReply::Bulk(popped.into_iter().next())
            }
            SetCommand::Pop { key, count: Some(count) } => {
                SetReply::Array(Some(SetHandle::new(txn, keyspace, key).pop(*count).await?))
            }
            SetCommand::Move {
                source,
                destination,
                member,
            } => {
                let mut src = SetHandle::new(txn, keyspace, source);
                let mut dst = SetHandle::new(txn, keyspace, destination);
                SetReply::Integer(src.move_to(&mut dst, member).await? as i64)
            }
            SetCommand::Union { keys } => {
                SetReply::Array(Some(algebra::union(txn, keyspace, keys).await?))
            }
            SetCommand::Inter { keys } => {
                SetReply::Array(algebra::intersection(txn, keyspace, keys).await?)
            }
            SetCommand::Diff { keys } => {
                SetReply::Array(Some(algebra::difference(txn, keyspace, keys).await?))
            }
            SetCommand::Del { keys } => {
                let mut deleted = 0;
                for key in keys {
                    if SetHandle::new(txn, keyspace, key).destroy().await? {
                        deleted += 1;
                    }
                }
                SetReply::Integer(deleted)
            }
        };
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::run_in_transaction;
    use kvstore::MemoryStore;

    fn bytes(s: &str) -> Vec<u8> {
        s.as_bytes().to_vec()
    }

    #[test]
    fn test_replies_map_to_frames() {
        assert_eq!(Frame::from(SetReply::Integer(3)), Frame::Integer(3));
        assert_eq!(Frame::from(SetReply::Bulk(None)), Frame::Null);
        assert_eq!(Frame::from(SetReply::Array(None)), Frame::Null);
        assert_eq!(
            Frame::from(SetReply::Array(Some(vec![bytes("a")]))),
            Frame::Array(vec![Frame::BulkString(bytes("a"))])
        );
        assert_eq!(
            Frame::from(SetError::WrongType),
            Frame::Error("WRONGTYPE Operation against a key holding the wrong kind of value".into())
        );
    }

    #[tokio::test]
    async fn test_del_counts_existing_sets() {
        let store = MemoryStore::new();
        let ks = Keyspace::new("command-test", 0);
        let add = SetCommand::Add {
            key: bytes("a"),
            members: vec![bytes("1")],
        };
        run_in_transaction(&store, &add, &ks, 0).await.unwrap();

        let del = SetCommand::Del {
            keys: vec![bytes("a"), bytes("missing"), bytes("a")],
        };
        let reply = run_in_transaction(&store, &del, &ks, 0).await.unwrap();
        assert_eq!(reply, SetReply::Integer(1));

        let card = SetCommand::Card { key: bytes("a") };
        let reply = run_in_transaction(&store, &card, &ks, 0).await.unwrap();
        assert_eq!(reply, SetReply::Integer(0));
    }

    #[tokio::test]
    async fn test_single_pop_of_absent_key_is_nil() {
        let store = MemoryStore::new();
        let ks = Keyspace::new("command-test", 0);
        let pop = SetCommand::Pop {
            key: bytes("nothing"),
            count: None,
        };
        let reply = run_in_transaction(&store, &pop, &ks, 0).await.unwrap();
        assert_eq!(reply, SetReply::Bulk(None));

        let pop = SetCommand::Pop {
            key: bytes("nothing"),
            count: Some(2),
        };
        let reply = run_in_transaction(&store, &pop, &ks, 0).await.unwrap();
        assert_eq!(reply, SetReply::Array(Some(Vec::new())));
    }

    #[tokio::test]
    async fn test_concurrent_adds_all_land() {
        let store = MemoryStore::new();
        let ks = Keyspace::new("command-test", 0);
        let adds: Vec<SetCommand> = (0..8)
            .map(|i| SetCommand::Add {
                key: bytes("shared"),
                members: vec![format!("m{}", i).into_bytes()],
            })
            .collect();

        let mut tasks = Vec::new();
        for add in adds {
            let store = store.clone();
            let ks = ks.clone();
            tasks.push(tokio::spawn(async move {
                run_in_transaction(&store, &add, &ks, 16).await
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), SetReply::Integer(1));
        }

        let card = SetCommand::Card { key: bytes("shared") };
        let reply = run_in_transaction(&store, &card, &ks, 0).await.unwrap();
        assert_eq!(reply, SetReply::Integer(8));
    }
}
