//! Queue-backed ingestion path.
//!
//! An alternate writer behind the same store contract: full train records
//! arrive as JSON bodies (typically re-deliveries of roster updates for
//! eventual-consistency retry), are validated against the schema, and are
//! upserted. The direct path does not depend on this one.
//!
//! One bad record never aborts a batch: malformed JSON, a failed
//! validation, or a store rejection (a stale redelivery losing the
//! conditional write) skips that record with a logged warning and the
//! batch continues.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::store::TrainStore;
use crate::types::Train;

/// Outcome counts for a processed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub accepted: usize,
    pub skipped: usize,
}

/// Validates and persists externally delivered train records.
#[derive(Debug)]
pub struct IngestProcessor<S> {
    store: S,
}

impl<S: TrainStore + Sync> IngestProcessor<S> {
    pub fn new(store: S) -> Self {
        IngestProcessor { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Processes one delivered body. Returns true if the record was
    /// accepted.
    async fn process_one(&self, body: &str) -> bool {
        let train: Train = match serde_json::from_str(body) {
            Ok(train) => train,
            Err(err) => {
                warn!(%err, "dropping malformed ingestion body");
                return false;
            }
        };
        if let Err(err) = train.validate() {
            warn!(%err, train = %train.train_id, "dropping invalid train record");
            return false;
        }
        match self.store.upsert(&train).await {
            Ok(()) => {
                debug!(train = %train.train_id, "ingested train record");
                true
            }
            Err(err) => {
                // A conflict here is a stale redelivery; the direct path
                // already won. Either way the record is skipped, not
                // retried.
                warn!(%err, train = %train.train_id, "store rejected ingested record");
                false
            }
        }
    }

    /// Processes a batch of delivered bodies, each in its own failure
    /// boundary.
    pub async fn process_batch(&self, bodies: &[String]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for body in bodies {
            if self.process_one(body).await {
                summary.accepted += 1;
            } else {
                summary.skipped += 1;
            }
        }
        summary
    }

    /// Drains the ingestion queue until it closes or shutdown is requested.
    pub async fn run(&self, mut receiver: mpsc::Receiver<String>, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("ingestion shutting down");
                    return;
                }
                body = receiver.recv() => {
                    match body {
                        Some(body) => {
                            self.process_one(&body).await;
                        }
                        None => {
                            info!("ingestion queue closed");
                            return;
                        }
                    }
                }
            }
        }
    }
}
