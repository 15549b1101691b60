use crate::command::CommandHandler;
use crate::config::SocketConfig;
use crate::gateway::RedisGateway;
use redis_protocol::resp2::{
    decode::decode,
    encode::encode,
    types::{OwnedFrame as Frame, Resp2Frame},
};
use std::sync::{Arc, RwLock};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const READ_CHUNK: usize = 4096;

/// Largest unfinished request a connection may buffer, the same bound Redis puts on a bulk string.
pub const MAX_PENDING: usize = 512 * 1024 * 1024;

pub struct Server {
    addr: String,
    handler: CommandHandler,
    max_pending: usize,
}

fn protocol_error() -> Frame {
    Frame::Error("ERR Protocol error".into())
}

impl Server {
    pub fn new(addr: impl Into<String>, gateway: RedisGateway) -> Self {
        Self {
            addr: addr.into(),
            handler: CommandHandler::new(gateway),
            max_pending: MAX_PENDING,
        }
    }

    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }

    pub async fn start(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.addr).await?;
        self.serve(listener).await
    }

    /// Accepts connections on an already bound listener until accepting fails.
    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        log::info!("Listening on {}", listener.local_addr()?);

        loop {
            let (socket, peer) = listener.accept().await?;
            log::debug!("connection from {}", peer);
            let default_db = self.handler.gateway().server_cfg.default_db;
            let socket_cfg = Arc::new(RwLock::new(SocketConfig::new(default_db)));
            let gateway = self.handler.gateway().with_socket_config(socket_cfg.clone());
            let handler = self.handler.with_gateway(gateway);
            let max_pending = self.max_pending;
            tokio::spawn(async move {
                if let Err(e) = Self::handle_connection(socket, handler, socket_cfg, max_pending).await {
                    log::debug!("connection from {} ended: {}", peer, e);
                }
            });
        }
    }

    async fn handle_connection(
        mut socket: TcpStream,
        handler: CommandHandler,
        socket_cfg: Arc<RwLock<SocketConfig>>,
        max_pending: usize,
    ) -> std::io::Result<()> {
        let mut buf: Vec<u8> = Vec::with_capacity(READ_CHUNK);
        let mut chunk = vec![0u8; READ_CHUNK];

        loop {
            let n = socket.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            buf.extend_from_slice(&chunk[..n]);

            // Parse all complete frames; a partial frame stays buffered.
            let mut consumed = 0;
            let mut frames = Vec::new();
            loop {
                match decode(&buf[consumed..]) {
                    Ok(Some((frame, used))) => {
                        frames.push(frame);
                        consumed += used;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        log::debug!("protocol error: {:?}", e);
                        Self::write_frame(&mut socket, &protocol_error()).await?;
                        return Ok(());
                    }
                }
            }
            buf.drain(..consumed);
            let oversized = buf.len() > max_pending;

            for frame in frames {
                let (response, close) = Self::process_command(frame, &handler).await;
                Self::write_frame(&mut socket, &response).await?;
                let marked = socket_cfg.read().map(|c| c.should_close).unwrap_or(false);
                if close || marked {
                    socket.shutdown().await?;
                    return Ok(());
                }
            }
            if oversized {
                log::debug!("unfinished request exceeds {} bytes", max_pending);
                Self::write_frame(&mut socket, &protocol_error()).await?;
                socket.shutdown().await?;
                return Ok(());
            }
        }
    }

    async fn write_frame(socket: &mut TcpStream, frame: &Frame) -> std::io::Result<()> {
        let mut out = vec![0u8; frame.encode_len(false)];
        encode(&mut out, frame, false)
            .map_err(|e| std::io::Error::other(format!("{:?}", e)))?;
        socket.write_all(&out).await
    }

    async fn process_command(frame: Frame, handler: &CommandHandler) -> (Frame, bool) {
        match frame {
            Frame::Array(arr) if !arr.is_empty() => {
                let mut parts = arr.into_iter();
                let cmd = match parts.next() {
                    Some(Frame::BulkString(cmd)) | Some(Frame::SimpleString(cmd)) => cmd,
                    _ => return (Frame::Error("ERR invalid command".into()), false),
                };
                let args: Option<Vec<Vec<u8>>> = parts
                    .map(|f| match f {
                        Frame::BulkString(arg) | Frame::SimpleString(arg) => Some(arg),
                        _ => None,
                    })
                    .collect();
                // Requests are arrays of strings; anything else is malformed, not skippable.
                let Some(args) = args else {
                    return (protocol_error(), true);
                };

                handler
                    .handle(std::str::from_utf8(&cmd).unwrap_or(""), args)
                    .await
            }
            _ => (Frame::Error("ERR invalid command".into()), false),
        }
    }
}
