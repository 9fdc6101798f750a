//! Source snapshot: one live pool paired with the configuration it was
//! built from.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::schema::SourceConfig;
use crate::pool::{PoolDriver, PoolError, PoolHandle};

/// An immutable-by-convention record pairing a configuration copy with a
/// live pool handle.
///
/// The configuration is an owned deep copy taken at creation time, so later
/// edits to the declared configuration can never retroactively alter an
/// in-use pool's identity. The pool handle is owned exclusively by this
/// snapshot; no two snapshots share a live pool.
///
/// `closed` transitions false→true at most once, after the driver confirms
/// shutdown. Readers may race a close: they only ever observe the flag move
/// forward, so a snapshot seen as closed stays closed.
#[derive(Debug)]
pub struct SourceSnapshot {
    config: SourceConfig,
    pool: Arc<dyn PoolHandle>,
    closed: AtomicBool,
}

impl SourceSnapshot {
    pub fn new(config: SourceConfig, pool: Arc<dyn PoolHandle>) -> Self {
        Self {
            config,
            pool,
            closed: AtomicBool::new(false),
        }
    }

    /// The configuration this snapshot's pool was built from.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// The live pool handle. Callers lease connections through the driver's
    /// own interface; a closed snapshot's handle must not be used.
    pub fn pool(&self) -> Arc<dyn PoolHandle> {
        self.pool.clone()
    }

    /// Normalized endpoint identity of this snapshot's source.
    pub fn endpoint_key(&self) -> String {
        self.config.endpoint_key()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Shut down the pool through its driver. Idempotent: closing an
    /// already-closed snapshot is a no-op. The flag flips only after the
    /// driver confirms shutdown, so a failed close leaves the snapshot open
    /// for a later retry.
    pub fn close(&self, driver: &dyn PoolDriver) -> Result<(), PoolError> {
        if self.is_closed() {
            return Ok(());
        }
        driver.close(self.pool.as_ref())?;
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
