//! Record store adapter contract.
//!
//! The store persists `Train` records keyed by `(creator_id, train_id)`.
//! Writes are full-record replaces guarded by the record's revision token:
//! a write is accepted only when it is exactly one revision ahead of the
//! stored record (or revision 0 when no record exists). This turns the
//! read-modify-write on roster mutations into a conditional write, so a
//! stale writer is rejected instead of silently overwriting a concurrent
//! update.
//!
//! Expiry is passive: the store may purge a record any time after its
//! `expires_at`, but callers must not assume purging happens at that
//! instant.

pub mod memory;

use std::future::Future;

use thiserror::Error;

use crate::types::{Train, TrainId, UserId};

pub use memory::MemoryStore;

/// Errors reported by a train store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced train does not exist.
    #[error("train {train} owned by {creator} not found")]
    NotFound { creator: UserId, train: TrainId },

    /// A conditional write lost to a concurrent writer: the stored record's
    /// revision did not match what the writer read.
    #[error("revision conflict: write at revision {attempted}, store holds {stored}")]
    RevisionConflict { attempted: u64, stored: u64 },

    /// The backing store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns true if the error is a lost conditional write, which the
    /// engine resolves by re-reading and re-applying.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::RevisionConflict { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Durable keyed storage for train records.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct EmptyStore;
///
/// impl TrainStore for EmptyStore {
///     async fn get(&self, _: &UserId, _: &TrainId) -> Result<Option<Train>> {
///         Ok(None)
///     }
///     // ...
/// }
/// ```
pub trait TrainStore {
    /// Point lookup by the composite key. `Ok(None)` when absent.
    fn get(
        &self,
        creator: &UserId,
        train: &TrainId,
    ) -> impl Future<Output = Result<Option<Train>>> + Send;

    /// All trains owned by a user. Order is not significant for
    /// correctness.
    fn query(&self, creator: &UserId) -> impl Future<Output = Result<Vec<Train>>> + Send;

    /// Full-record conditional replace.
    ///
    /// Accepted when `train.revision` is 0 and no record exists, or when it
    /// is exactly one ahead of the stored record. Anything else is a
    /// `RevisionConflict`.
    fn upsert(&self, train: &Train) -> impl Future<Output = Result<()>> + Send;

    /// Removes the record. `NotFound` when absent.
    fn delete(
        &self,
        creator: &UserId,
        train: &TrainId,
    ) -> impl Future<Output = Result<()>> + Send;
}
