//! Single-use write batches.
//!
//! A [`Batch`] stages puts and deletes in an engine buffer and applies all of them to its store in
//! one atomic write on [`Batch::commit`]. A batch is open while it holds its buffer; committing or
//! discarding it releases the buffer and closes it for good.

use tracing::{debug, instrument, trace, warn};

use crate::{
    engine::{KvEngine, WriteBuffer},
    error::{DbError, DbResult, combine_results},
    instrumentation::components,
    store::Store,
    validation::{validate_key, validate_kv},
};

/// Staged mutations bound to the [`Store`] that created them.
///
/// Every operation takes `&mut self`, so a batch can only be driven from one place at a time.
#[derive(Debug)]
pub struct Batch<'a, E: KvEngine> {
    buffer: Option<E::Buffer>,
    store: &'a Store<E>,
}

impl<'a, E: KvEngine> Batch<'a, E> {
    /// Wraps a fresh buffer. The caller has already counted this writer as open.
    pub(crate) fn new(store: &'a Store<E>) -> Self {
        Self {
            buffer: Some(store.engine().new_buffer()),
            store,
        }
    }

    /// Stages a put of `value` at `key`.
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> DbResult<()> {
        validate_kv(key, value, &self.store.config().limits)?;
        let buffer = self.buffer.as_mut().ok_or(DbError::TransactionClosed)?;
        buffer.put(key, value);
        Ok(())
    }

    /// Stages a removal of `key`.
    pub fn delete(&mut self, key: &[u8]) -> DbResult<()> {
        validate_key(key)?;
        let buffer = self.buffer.as_mut().ok_or(DbError::TransactionClosed)?;
        buffer.delete(key);
        Ok(())
    }

    /// Applies all staged operations to the store in one atomic write, then closes the batch.
    ///
    /// The batch is closed even when the write fails. A failure to release the buffer after a
    /// failed write is attached to the write error as context.
    #[instrument(skip(self), fields(component = components::DB_BATCH_COMMIT))]
    pub fn commit(&mut self) -> DbResult<()> {
        let Some(buffer) = self.buffer.as_mut() else {
            return Err(DbError::TransactionClosed);
        };

        let ops = buffer.len();
        let applied = self
            .store
            .engine()
            .apply(buffer, self.store.write_options());
        let released = self.discard();

        if applied.is_ok() {
            debug!(%ops, "committed batch");
        }
        combine_results(applied, released, "discard also failed")
    }

    /// Releases the batch without applying anything. Safe to call any number of times.
    pub fn discard(&mut self) -> DbResult<()> {
        let Some(buffer) = self.buffer.take() else {
            return Ok(());
        };
        // The writer stays counted until the engine is done with its buffer.
        let released = buffer.release();
        let remaining = self.store.writers().decrement();
        trace!(%remaining, "released batch");
        released
    }

    /// Whether the batch still accepts operations.
    pub fn is_open(&self) -> bool {
        self.buffer.is_some()
    }

    /// Number of operations staged so far, zero once closed.
    pub fn len(&self) -> usize {
        self.buffer.as_ref().map_or(0, WriteBuffer::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: KvEngine> Drop for Batch<'_, E> {
    fn drop(&mut self) {
        if self.is_open() {
            warn!(
                component = components::DB_BATCH_COMMIT,
                ops = self.len(),
                "batch dropped while open, discarding"
            );
            if let Err(e) = self.discard() {
                warn!(err = %e, "failed to release dropped batch");
            }
        }
    }
}
