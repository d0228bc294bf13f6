use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("key cannot be empty")]
    KeyEmpty,

    #[error("key size {size} exceeds limit {max}")]
    KeyTooLarge { size: usize, max: usize },

    #[error("value size {size} exceeds limit {max}")]
    ValueTooLarge { size: usize, max: usize },

    /// The batch was already committed or discarded.
    #[error("transaction has been closed")]
    TransactionClosed,

    /// The store still has writers that were never committed or discarded.
    #[error("cannot close store with {0} open transactions")]
    OpenTransactions(i64),

    #[error("store has been closed")]
    DbClosed,

    /// Sled database error, passed through untouched.
    #[error("database error: {0}")]
    Engine(#[from] sled::Error),

    /// An apply failure that was followed by a failed cleanup. The cleanup failure is kept as
    /// context, `source` stays the primary error.
    #[error("{source}; {context}: {also}")]
    Combined {
        #[source]
        source: Box<DbError>,
        context: &'static str,
        also: Box<DbError>,
    },

    #[error("{0}")]
    Other(String),
}

impl DbError {
    /// Attaches a secondary failure to this error.
    pub fn combine(self, context: &'static str, also: DbError) -> Self {
        Self::Combined {
            source: Box::new(self),
            context,
            also: Box::new(also),
        }
    }

    /// Returns the primary error, looking through any [`DbError::Combined`] wrapping.
    pub fn primary(&self) -> &DbError {
        match self {
            Self::Combined { source, .. } => source.primary(),
            other => other,
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Folds the result of a cleanup step into the result of the step it followed.
///
/// If both failed the cleanup error is attached to the primary one under `context`. If only the
/// cleanup failed its error is returned on its own.
pub fn combine_results(
    primary: DbResult<()>,
    cleanup: DbResult<()>,
    context: &'static str,
) -> DbResult<()> {
    match (primary, cleanup) {
        (Err(err), Err(also)) => Err(err.combine(context, also)),
        (Err(err), Ok(())) | (Ok(()), Err(err)) => Err(err),
        (Ok(()), Ok(())) => Ok(()),
    }
}
