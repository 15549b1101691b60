use clap::Parser;
use setgw::backend::{Backend, Storage};
use setgw::config::{Config, ServerConfig};
use setgw::gateway::RedisGateway;
use setgw::server::Server;
use setgw::sweeper;
use std::time::Duration;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    let config = Config::parse();

    #[cfg(feature = "foundationdb")]
    let _network = (config.backend == setgw::config::BackendKind::Foundationdb).then(kvstore::fdb::boot);

    let storage = Storage::open(&config)?;
    log::info!("using {:?} storage, namespace {:?}", config.backend, config.namespace);
    let backend = Backend::new(storage, config.max_retries);

    if config.gc_interval_ms > 0 {
        sweeper::spawn(
            backend.clone(),
            &config.namespace,
            Duration::from_millis(config.gc_interval_ms),
            config.gc_batch_size,
        );
    }

    let gw = RedisGateway::new(backend, ServerConfig::from(&config));
    let server = Server::new(config.bind.clone(), gw);
    server.start().await
}
