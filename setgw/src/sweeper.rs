use crate::backend::Backend;
use crate::datamodel::Keyspace;
use crate::set::gc::Sweep;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};

/// Spawns the task reclaiming rows of deleted sets every `every`.
pub fn spawn(backend: Backend, namespace: &str, every: Duration, batch_size: usize) -> JoinHandle<()> {
    // GC rows are shared by all logical databases.
    let keyspace = Keyspace::new(namespace, 0);
    let sweep = Sweep {
        batch_size: batch_size.max(1),
    };
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match backend.run(&sweep, &keyspace).await {
                Ok(stats) if stats.rows > 0 || stats.finished > 0 => {
                    log::debug!(
                        "gc cleared {} member rows, finished {} sets",
                        stats.rows,
                        stats.finished
                    );
                }
                Ok(_) => {}
                Err(e) => log::warn!("gc sweep failed: {}", e),
            }
        }
    })
}
