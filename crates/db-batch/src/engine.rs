//! Storage engines a [`Store`](crate::Store) can write batches into.

use std::{fmt::Debug, mem};

use sled::{Batch as SledBatch, Db};

use crate::{config::WriteOptions, error::DbResult};

/// Buffer of staged mutations owned by an open batch.
pub trait WriteBuffer: Debug + Send {
    /// Stages a put of `value` at `key`.
    fn put(&mut self, key: &[u8], value: &[u8]);

    /// Stages a removal of `key`.
    fn delete(&mut self, key: &[u8]);

    /// Number of operations staged so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Releases whatever the engine holds for this buffer.
    fn release(self) -> DbResult<()>;
}

/// An embedded key-value engine with an atomic batched write.
pub trait KvEngine: Debug + Send + Sync {
    type Buffer: WriteBuffer;

    /// Creates an empty buffer to stage mutations into.
    fn new_buffer(&self) -> Self::Buffer;

    /// Applies everything staged in `buffer` as one atomic write.
    ///
    /// The buffer must still be released afterwards, whether or not this succeeded.
    ///
    /// An error does not always mean nothing was written: when `opts` asks for a sync, the write
    /// may already be applied and only the flush that follows it failed.
    fn apply(&self, buffer: &mut Self::Buffer, opts: &WriteOptions) -> DbResult<()>;

    fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>>;

    /// Persists all applied writes to disk.
    fn flush(&self) -> DbResult<()>;
}

/// Staged sled mutations.
#[derive(Debug, Default)]
pub struct SledBuffer {
    inner: SledBatch,
    len: usize,
}

impl WriteBuffer for SledBuffer {
    fn put(&mut self, key: &[u8], value: &[u8]) {
        self.inner.insert(key, value);
        self.len += 1;
    }

    fn delete(&mut self, key: &[u8]) {
        self.inner.remove(key);
        self.len += 1;
    }

    fn len(&self) -> usize {
        self.len
    }

    fn release(self) -> DbResult<()> {
        // sled batches are plain heap data.
        Ok(())
    }
}

/// [`KvEngine`] backed by the default tree of a sled database.
#[derive(Debug, Clone)]
pub struct SledEngine {
    db: Db,
}

impl SledEngine {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn inner(&self) -> &Db {
        &self.db
    }
}

impl KvEngine for SledEngine {
    type Buffer = SledBuffer;

    fn new_buffer(&self) -> Self::Buffer {
        SledBuffer::default()
    }

    fn apply(&self, buffer: &mut Self::Buffer, opts: &WriteOptions) -> DbResult<()> {
        let batch = mem::take(&mut buffer.inner);
        self.db.apply_batch(batch)?;
        if opts.sync {
            self.db.flush()?;
        }
        Ok(())
    }

    fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    fn flush(&self) -> DbResult<()> {
        self.db.flush()?;
        Ok(())
    }
}
