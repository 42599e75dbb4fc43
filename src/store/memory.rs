//! In-memory train store.
//!
//! Backs local runs and the test suite. Honors the same conditional-write
//! and passive-expiry semantics the contract demands of a durable backend,
//! so engine behavior is identical against either.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::types::{Train, TrainId, UserId};

use super::{Result, StoreError, TrainStore};

type Key = (UserId, TrainId);

/// A `TrainStore` holding all records in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Key, Train>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Number of live (non-purged) records, for test assertions.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl TrainStore for MemoryStore {
    async fn get(&self, creator: &UserId, train: &TrainId) -> Result<Option<Train>> {
        let key = (creator.clone(), train.clone());
        let now = Utc::now();

        // Passive expiry: purge on touch. A record past its boundary is
        // reported as absent; anything not touched simply lingers, which the
        // contract allows.
        let expired = {
            let records = self.records.read().await;
            match records.get(&key) {
                Some(record) if record.expires_at <= now => true,
                Some(record) => return Ok(Some(record.clone())),
                None => return Ok(None),
            }
        };
        if expired {
            self.records.write().await.remove(&key);
        }
        Ok(None)
    }

    async fn query(&self, creator: &UserId) -> Result<Vec<Train>> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        records.retain(|(owner, _), record| owner != creator || record.expires_at > now);
        let mut owned: Vec<Train> = records
            .values()
            .filter(|record| &record.creator_id == creator)
            .cloned()
            .collect();
        // Chronological ordering for display; not a correctness guarantee.
        owned.sort_by_key(|record| record.leaving_at);
        Ok(owned)
    }

    async fn upsert(&self, train: &Train) -> Result<()> {
        let key = (train.creator_id.clone(), train.train_id.clone());
        let mut records = self.records.write().await;
        match records.get(&key) {
            None if train.revision == 0 => {
                records.insert(key, train.clone());
                Ok(())
            }
            None => Err(StoreError::RevisionConflict {
                attempted: train.revision,
                stored: 0,
            }),
            Some(existing) if train.revision == existing.revision + 1 => {
                records.insert(key, train.clone());
                Ok(())
            }
            Some(existing) => Err(StoreError::RevisionConflict {
                attempted: train.revision,
                stored: existing.revision,
            }),
        }
    }

    async fn delete(&self, creator: &UserId, train: &TrainId) -> Result<()> {
        let key = (creator.clone(), train.clone());
        let mut records = self.records.write().await;
        match records.remove(&key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                creator: creator.clone(),
                train: train.clone(),
            }),
        }
    }
}
