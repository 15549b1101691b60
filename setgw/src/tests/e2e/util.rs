use crate::gateway::RedisGateway;
use crate::server::Server;
use redis_protocol::resp2::{
    decode::decode,
    encode::encode,
    types::{OwnedFrame as Frame, Resp2Frame},
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Spawn a server over a fresh in-memory store on an ephemeral port and connect to it.
pub async fn spawn_test_server() -> (tokio::task::JoinHandle<()>, Client) {
    spawn_server_with(|server| server).await
}

/// Like [`spawn_test_server`], with the server adjusted by `configure` first.
pub async fn spawn_server_with(
    configure: impl FnOnce(Server) -> Server,
) -> (tokio::task::JoinHandle<()>, Client) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");

    let server = configure(Server::new(addr.to_string(), RedisGateway::memory()));
    let srv = tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });

    let stream = TcpStream::connect(addr).await.expect("connect");
    (srv, Client::new(stream))
}

/// Minimal RESP2 client.
pub struct Client {
    stream: TcpStream,
    buf: Vec<u8>,
}

impl Client {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            buf: Vec::new(),
        }
    }

    pub async fn send(&mut self, parts: &[&str]) {
        let req = Frame::Array(
            parts
                .iter()
                .map(|p| Frame::BulkString(p.as_bytes().to_vec()))
                .collect(),
        );
        let mut out = vec![0u8; req.encode_len(false)];
        encode(&mut out, &req, false).expect("encode");
        self.stream.write_all(&out).await.expect("write");
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).await.expect("write");
    }

    /// Next reply frame; `None` once the server has closed the connection.
    pub async fn read(&mut self) -> Option<Frame> {
        loop {
            if let Some((frame, used)) = decode(&self.buf).expect("decode") {
                self.buf.drain(..used);
                return Some(frame);
            }
            let mut chunk = [0u8; 1024];
            let n = self.stream.read(&mut chunk).await.expect("read");
            if n == 0 {
                return None;
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }

    pub async fn call(&mut self, parts: &[&str]) -> Frame {
        self.send(parts).await;
        self.read().await.expect("reply")
    }

    /// Members of an array reply, sorted.
    pub async fn call_set(&mut self, parts: &[&str]) -> Vec<String> {
        match self.call(parts).await {
            Frame::Array(items) => {
                let mut members: Vec<String> = items
                    .into_iter()
                    .map(|item| match item {
                        Frame::BulkString(b) => String::from_utf8(b).expect("utf8"),
                        other => panic!("unexpected array item {:?}", other),
                    })
                    .collect();
                members.sort();
                members
            }
            other => panic!("expected array, got {:?}", other),
        }
    }
}

pub fn int(n: i64) -> Frame {
    Frame::Integer(n)
}

pub fn bulk(s: &str) -> Frame {
    Frame::BulkString(s.as_bytes().to_vec())
}
