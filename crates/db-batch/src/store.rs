use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::{
    batch::Batch,
    config::{StoreConfig, WriteOptions},
    engine::{KvEngine, SledEngine},
    error::{DbError, DbResult},
    instrumentation::components,
    tracker::WriterTracker,
};

/// Store backed by sled.
pub type SledStore = Store<SledEngine>;

/// Owns the engine handle and hands out [`Batch`]es writing into it.
///
/// Every batch is counted as an open writer from creation until it is committed, discarded or
/// dropped. The store refuses to close while any are outstanding.
#[derive(Debug)]
pub struct Store<E: KvEngine> {
    engine: E,
    config: StoreConfig,
    writers: WriterTracker,
    /// Set once the store is closed. Held for reading while a batch is created.
    closed: RwLock<bool>,
}

impl<E: KvEngine> Store<E> {
    pub fn new(engine: E, config: StoreConfig) -> Self {
        Self {
            engine,
            config,
            writers: WriterTracker::new(),
            closed: RwLock::new(false),
        }
    }

    /// Opens a new batch and counts it as an open writer.
    pub fn new_batch(&self) -> DbResult<Batch<'_, E>> {
        let closed = self.closed.read();
        if *closed {
            return Err(DbError::DbClosed);
        }
        self.writers.increment();
        Ok(Batch::new(self))
    }

    /// Number of batches that have been created but not yet closed.
    pub fn open_writers(&self) -> i64 {
        self.writers.count()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn write_options(&self) -> &WriteOptions {
        &self.config.write_options
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub(crate) fn writers(&self) -> &WriterTracker {
        &self.writers
    }

    pub fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        self.engine.get(key)
    }

    pub fn has(&self, key: &[u8]) -> DbResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.read()
    }

    /// Flushes the engine and stops handing out batches.
    ///
    /// Fails with [`DbError::OpenTransactions`] while any batch is still open. Closing an already
    /// closed store is a no-op.
    #[instrument(skip(self), fields(component = components::DB_STORE))]
    pub fn close(&self) -> DbResult<()> {
        let mut closed = self.closed.write();
        if *closed {
            return Ok(());
        }

        let open = self.writers.count();
        if open > 0 {
            return Err(DbError::OpenTransactions(open));
        }

        self.engine.flush()?;
        *closed = true;
        debug!("closed store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::test_utils::{get_mem_store, get_sled_tmp_store};

    #[test]
    fn test_close_refused_with_open_writers() {
        let (store, _dir) = get_sled_tmp_store().unwrap();
        let mut batch = store.new_batch().unwrap();

        assert!(matches!(store.close(), Err(DbError::OpenTransactions(1))));
        assert!(!store.is_closed());

        batch.set(b"k", b"v").unwrap();
        batch.commit().unwrap();

        store.close().unwrap();
        assert!(store.is_closed());
        assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn test_close_is_idempotent() {
        let (store, _faults) = get_mem_store();
        store.close().unwrap();
        store.close().unwrap();
    }

    #[test]
    fn test_new_batch_after_close() {
        let (store, _faults) = get_mem_store();
        store.close().unwrap();

        assert!(matches!(store.new_batch(), Err(DbError::DbClosed)));
        assert_eq!(store.open_writers(), 0);
    }

    #[test]
    fn test_close_races_batch_creation() {
        let (store, _faults) = get_mem_store();

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        match store.new_batch() {
                            Ok(mut batch) => batch.commit().unwrap(),
                            Err(DbError::DbClosed) => break,
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                    }
                });
            }
            s.spawn(|| {
                while !store.is_closed() {
                    let _ = store.close();
                }
            });
        });

        assert!(store.is_closed());
        assert_eq!(store.open_writers(), 0);
    }
}
