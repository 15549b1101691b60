use crate::gateway::RedisGateway;
use crate::set::command::SetCommand;
use crate::set::operations::SetOperations;
use redis_protocol::resp2::types::OwnedFrame as Frame;

impl SetOperations for RedisGateway {
    async fn sadd(&self, key: &[u8], members: &[Vec<u8>]) -> Frame {
        self.execute(SetCommand::Add {
            key: key.to_vec(),
            members: members.to_vec(),
        })
        .await
    }

    async fn srem(&self, key: &[u8], members: &[Vec<u8>]) -> Frame {
        self.execute(SetCommand::Remove {
            key: key.to_vec(),
            members: members.to_vec(),
        })
        .await
    }

    async fn smembers(&self, key: &[u8]) -> Frame {
        self.execute(SetCommand::Members { key: key.to_vec() }).await
    }

    async fn scard(&self, key: &[u8]) -> Frame {
        self.execute(SetCommand::Card { key: key.to_vec() }).await
    }

    async fn sismember(&self, key: &[u8], member: &[u8]) -> Frame {
        self.execute(SetCommand::IsMember {
            key: key.to_vec(),
            member: member.to_vec(),
        })
        .await
    }

    async fn spop(&self, key: &[u8], count: Option<usize>) -> Frame {
        self.execute(SetCommand::Pop {
            key: key.to_vec(),
            count,
        })
        .await
    }

    async fn smove(&self, source: &[u8], destination: &[u8], member: &[u8]) -> Frame {
        self.execute(SetCommand::Move {
            source: source.to_vec(),
            destination: destination.to_vec(),
            member: member.to_vec(),
        })
        .await
    }

    async fn sunion(&self, keys: &[Vec<u8>]) -> Frame {
        self.execute(SetCommand::Union { keys: keys.to_vec() }).await
    }

    async fn sinter(&self, keys: &[Vec<u8>]) -> Frame {
        self.execute(SetCommand::Inter { keys: keys.to_vec() }).await
    }

    async fn sdiff(&self, keys: &[Vec<u8>]) -> Frame {
        self.execute(SetCommand::Diff { keys: keys.to_vec() }).await
    }

    async fn del(&self, keys: &[Vec<u8>]) -> Frame {
        self.execute(SetCommand::Del { keys: keys.to_vec() }).await
    }
}
