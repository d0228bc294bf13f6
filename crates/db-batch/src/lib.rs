//! # strata-db-batch
//!
//! Atomic write batches over an embedded key-value store.
//!
//! A [`Store`] owns the engine handle and is the only way to create a [`Batch`]. A batch stages
//! puts and deletes and applies them to the store in one atomic write on [`Batch::commit`], or
//! drops them on [`Batch::discard`]. Either way the batch is closed afterwards, and every later
//! mutation or commit fails with [`DbError::TransactionClosed`].
//!
//! The store counts open batches and refuses to [`close`](Store::close) while any remain.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use strata_db_batch::{StoreConfig, open_sled_store};
//!
//! fn main() -> anyhow::Result<()> {
//!     let store = open_sled_store(Path::new("data"), "kv", StoreConfig::production())?;
//!
//!     let mut batch = store.new_batch()?;
//!     batch.set(b"a", b"1")?;
//!     batch.set(b"b", b"2")?;
//!     batch.delete(b"a")?;
//!     batch.commit()?;
//!
//!     assert_eq!(store.get(b"b")?, Some(b"2".to_vec()));
//!     store.close()?;
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
mod init;
pub mod instrumentation;
pub mod store;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
pub(crate) mod tracker;
pub mod validation;

// Re-exports
pub use batch::Batch;
pub use config::{KvLimits, StoreConfig, WriteOptions};
pub use engine::{KvEngine, SledEngine, WriteBuffer};
pub use error::{DbError, DbResult};
pub use init::open_sled_store;
pub use store::{SledStore, Store};
