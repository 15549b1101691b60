use std::sync::Arc;

use crate::backend::{Backend, TxnOperation};
use crate::config::{ServerConfig, SharedServerConfig, SharedSocketConfig};
use crate::datamodel::Keyspace;
use redis_protocol::resp2::types::OwnedFrame as Frame;

#[derive(Clone)]
pub struct RedisGateway {
    pub(crate) backend: Backend,
    /// Shared server-wide configuration
    pub server_cfg: SharedServerConfig,
    /// Optional per-connection socket configuration
    pub socket_cfg: Option<SharedSocketConfig>,
}

impl RedisGateway {
    pub fn new(backend: Backend, server_cfg: ServerConfig) -> Self {
        Self {
            backend,
            server_cfg: Arc::new(server_cfg),
            socket_cfg: None,
        }
    }

    /// Gateway over a fresh in-memory store with default settings.
    pub fn memory() -> Self {
        Self::new(Backend::memory(), ServerConfig::default())
    }

    /// Create a clone of this gateway that is bound to a per-connection socket config.
    pub fn with_socket_config(&self, sc: SharedSocketConfig) -> Self {
        let mut cloned = self.clone();
        cloned.socket_cfg = Some(sc);
        cloned
    }

    /// DB index commands currently operate on.
    pub fn selected_db(&self) -> u64 {
        self.socket_cfg
            .as_ref()
            .and_then(|sc| sc.read().ok().map(|c| c.selected_db))
            .unwrap_or(self.server_cfg.default_db)
    }

    pub fn keyspace(&self) -> Keyspace {
        Keyspace::new(&self.server_cfg.namespace, self.selected_db())
    }

    /// Runs `op` through the backend and turns the outcome into a reply.
    pub async fn execute<J>(&self, op: J) -> Frame
    where
        J: TxnOperation,
        J::Output: Into<Frame>,
    {
        match self.backend.run(&op, &self.keyspace()).await {
            Ok(output) => output.into(),
            Err(e) => {
                log::debug!("command failed: {}", e);
                e.into()
            }
        }
    }
}
