//! Checks run on every mutation before it is staged into a batch.

use crate::{
    config::KvLimits,
    error::{DbError, DbResult},
};

/// Fails with [`DbError::KeyEmpty`] on a zero-length key.
pub fn validate_key(key: &[u8]) -> DbResult<()> {
    if key.is_empty() {
        return Err(DbError::KeyEmpty);
    }
    Ok(())
}

/// Validates a key/value pair against the store-wide `limits`.
///
/// Empty values are allowed.
pub fn validate_kv(key: &[u8], value: &[u8], limits: &KvLimits) -> DbResult<()> {
    validate_key(key)?;
    if key.len() > limits.max_key_size {
        return Err(DbError::KeyTooLarge {
            size: key.len(),
            max: limits.max_key_size,
        });
    }
    if value.len() > limits.max_value_size {
        return Err(DbError::ValueTooLarge {
            size: value.len(),
            max: limits.max_value_size,
        });
    }
    Ok(())
}
