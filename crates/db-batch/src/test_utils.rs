//! Test stores: temporary sled instances and an in-memory engine with injectable failures.

use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::{Mutex, RwLock};
use tempfile::TempDir;

use crate::{
    SledStore, Store, StoreConfig,
    config::WriteOptions,
    engine::{KvEngine, WriteBuffer},
    error::{DbError, DbResult},
    init::open_sled_store,
    tracker::WriterTracker,
};

/// Switches that make the next engine call of a kind fail once, plus what the engine observed.
#[derive(Debug, Default)]
pub struct MemFaults {
    fail_apply: AtomicBool,
    fail_release: AtomicBool,
    last_write_options: Mutex<Option<WriteOptions>>,
    watched_writers: Mutex<Option<WriterTracker>>,
    writers_on_release: Mutex<Vec<i64>>,
}

impl MemFaults {
    pub fn fail_next_apply(&self) {
        self.fail_apply.store(true, Ordering::Release);
    }

    pub fn fail_next_release(&self) {
        self.fail_release.store(true, Ordering::Release);
    }

    /// Write options passed to the most recent apply.
    pub fn last_write_options(&self) -> Option<WriteOptions> {
        *self.last_write_options.lock()
    }

    /// Records the open writer count of `writers` every time a buffer is released.
    pub(crate) fn watch_writers(&self, writers: WriterTracker) {
        *self.watched_writers.lock() = Some(writers);
    }

    /// Open writer counts seen from inside each buffer release, in order.
    pub fn writers_on_release(&self) -> Vec<i64> {
        self.writers_on_release.lock().clone()
    }
}

#[derive(Debug)]
enum MemOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

#[derive(Debug)]
pub struct MemBuffer {
    ops: Vec<MemOp>,
    faults: Arc<MemFaults>,
}

impl WriteBuffer for MemBuffer {
    fn put(&mut self, key: &[u8], value: &[u8]) {
        self.ops.push(MemOp::Put(key.to_vec(), value.to_vec()));
    }

    fn delete(&mut self, key: &[u8]) {
        self.ops.push(MemOp::Delete(key.to_vec()));
    }

    fn len(&self) -> usize {
        self.ops.len()
    }

    fn release(self) -> DbResult<()> {
        if let Some(writers) = self.faults.watched_writers.lock().as_ref() {
            self.faults.writers_on_release.lock().push(writers.count());
        }
        if self.faults.fail_release.swap(false, Ordering::AcqRel) {
            return Err(DbError::Other("injected release failure".to_owned()));
        }
        Ok(())
    }
}

/// [`KvEngine`] over a `BTreeMap`. A batch is applied under one write lock.
#[derive(Debug, Clone, Default)]
pub struct MemEngine {
    data: Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>,
    faults: Arc<MemFaults>,
}

impl MemEngine {
    pub fn faults(&self) -> Arc<MemFaults> {
        self.faults.clone()
    }
}

impl KvEngine for MemEngine {
    type Buffer = MemBuffer;

    fn new_buffer(&self) -> Self::Buffer {
        MemBuffer {
            ops: Vec::new(),
            faults: self.faults.clone(),
        }
    }

    fn apply(&self, buffer: &mut Self::Buffer, opts: &WriteOptions) -> DbResult<()> {
        *self.faults.last_write_options.lock() = Some(*opts);
        if self.faults.fail_apply.swap(false, Ordering::AcqRel) {
            return Err(DbError::Other("injected apply failure".to_owned()));
        }

        let mut data = self.data.write();
        for op in buffer.ops.drain(..) {
            match op {
                MemOp::Put(k, v) => {
                    data.insert(k, v);
                }
                MemOp::Delete(k) => {
                    data.remove(&k);
                }
            }
        }
        Ok(())
    }

    fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn flush(&self) -> DbResult<()> {
        Ok(())
    }
}

/// In-memory store together with the switches of its engine.
pub fn get_mem_store() -> (Store<MemEngine>, Arc<MemFaults>) {
    get_mem_store_with_config(StoreConfig::test())
}

pub fn get_mem_store_with_config(config: StoreConfig) -> (Store<MemEngine>, Arc<MemFaults>) {
    let engine = MemEngine::default();
    let faults = engine.faults();
    (Store::new(engine, config), faults)
}

/// Sled store in a fresh temporary directory. The directory is removed when the guard drops.
pub fn get_sled_tmp_store() -> anyhow::Result<(SledStore, TempDir)> {
    let temp_dir = TempDir::new()?;
    let store = open_sled_store(temp_dir.path(), "test", StoreConfig::test())?;
    Ok((store, temp_dir))
}
