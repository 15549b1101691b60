use clap::{Parser, ValueEnum};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// In-process store; data is lost on exit
    Memory,
    /// FoundationDB cluster (needs the `foundationdb` build feature)
    Foundationdb,
}

/// Command line options, each also readable from the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "setgw", version, about = "Redis set commands over a transactional key-value store")]
pub struct Config {
    /// Address the server listens on
    #[arg(long, env = "SETGW_BIND", default_value = "127.0.0.1:6379")]
    pub bind: String,

    /// Storage engine
    #[arg(long, env = "SETGW_BACKEND", value_enum, default_value_t = BackendKind::Memory)]
    pub backend: BackendKind,

    /// FoundationDB cluster file; the client default when unset
    #[arg(long, env = "FDB_CLUSTER_FILE")]
    pub cluster_file: Option<String>,

    /// Prefix isolating this gateway's rows in the store
    #[arg(long, env = "SETGW_NAMESPACE", default_value = "setgw")]
    pub namespace: String,

    /// Logical database of new connections
    #[arg(long, env = "SETGW_DEFAULT_DB", default_value_t = 0)]
    pub default_db: u64,

    /// Attempts after the first when a transaction conflicts
    #[arg(long, env = "SETGW_MAX_RETRIES", default_value_t = 5)]
    pub max_retries: usize,

    /// Delay between garbage collection sweeps, 0 disables them
    #[arg(long, env = "SETGW_GC_INTERVAL_MS", default_value_t = 1000)]
    pub gc_interval_ms: u64,

    /// Retired sets visited, and member rows cleared per set, in one sweep
    #[arg(long, env = "SETGW_GC_BATCH_SIZE", default_value_t = 128)]
    pub gc_batch_size: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the server binds to
    pub bind: String,
    /// Namespace of every key the gateway writes
    pub namespace: String,
    /// DB index of new connections
    pub default_db: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:6379".to_string(),
            namespace: "setgw".to_string(),
            default_db: 0,
        }
    }
}

impl From<&Config> for ServerConfig {
    fn from(config: &Config) -> Self {
        Self {
            bind: config.bind.clone(),
            namespace: config.namespace.clone(),
            default_db: config.default_db,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SocketConfig {
    /// If true, the server loop will close the connection after sending reply
    pub should_close: bool,
    /// Selected DB index for this connection
    pub selected_db: u64,
}

impl SocketConfig {
    pub fn new(selected_db: u64) -> Self {
        Self {
            should_close: false,
            selected_db,
        }
    }

    pub fn mark_close(&mut self) {
        self.should_close = true;
    }
}

pub type SharedServerConfig = Arc<ServerConfig>;
pub type SharedSocketConfig = Arc<std::sync::RwLock<SocketConfig>>;
