use crate::connection::operations::ConnectionOperations;
use crate::gateway::RedisGateway;
use redis_protocol::resp2::types::OwnedFrame as Frame;

impl ConnectionOperations for RedisGateway {
    async fn ping(&self, message: Option<&[u8]>) -> Frame {
        match message {
            Some(msg) => Frame::BulkString(msg.to_vec()),
            None => Frame::SimpleString(b"PONG".to_vec()),
        }
    }

    async fn echo(&self, message: &[u8]) -> Frame {
        Frame::BulkString(message.to_vec())
    }

    async fn select(&self, index: &[u8]) -> Frame {
        let Some(db) = std::str::from_utf8(index).ok().and_then(|s| s.parse::<u64>().ok()) else {
            return Frame::Error("ERR invalid DB index".into());
        };
        if let Some(sc) = &self.socket_cfg {
            if let Ok(mut w) = sc.write() {
                w.selected_db = db;
            }
        }
        Frame::SimpleString(b"OK".to_vec())
    }

    async fn quit(&self) -> Frame {
        if let Some(sc) = &self.socket_cfg {
            if let Ok(mut w) = sc.write() {
                w.mark_close();
            }
        }
        Frame::SimpleString(b"OK".to_vec())
    }
}
