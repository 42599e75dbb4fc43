//! Train lifecycle engine.
//!
//! Owns every state transition of a train: create, join, leave, delete,
//! list. Each operation reads and writes the record store and sequences
//! best-effort calls against the notification service.
//!
//! # Failure policy
//!
//! Only two conditions are surfaced to the caller as operation failures:
//! a missing train (`NotFound`) and a creation request for a past departure
//! (`InThePast`), plus store write failures. Every notification failure is
//! absorbed and logged where it occurs; the engine favors forward progress
//! over blocking the user-visible action. There is no retry of side
//! effects anywhere; recovery from a dropped side effect is a repeated
//! user action, which is why the destructive calls (cancel, delete) are
//! idempotent-in-intent.
//!
//! # Roster writes
//!
//! Join and leave are read-modify-write. The store's conditional upsert
//! rejects a stale write, and the engine resolves the conflict by
//! re-reading and re-applying the roster change (bounded attempts). Side
//! effects are issued once, before the write loop, and never re-issued on
//! a retry.

mod create;
mod delete;
mod roster;


use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::notify::Notifier;
use crate::render;
use crate::store::{StoreError, TrainStore};
use crate::types::{ChannelId, MessageRef, ReminderRef, Train, TrainId, TrainKey, UserId};

/// How many times a roster write is re-applied after losing a conditional
/// write before the conflict is surfaced.
const ROSTER_WRITE_ATTEMPTS: u32 = 3;

/// Errors that change what the caller communicates to the end user.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The referenced train does not exist (or has been purged).
    #[error("train {train} owned by {creator} not found")]
    NotFound { creator: UserId, train: TrainId },

    /// Creation was rejected because the departure time is not in the
    /// future. Nothing was written and nothing was posted.
    #[error("leaving time {leaving_at} is in the past")]
    InThePast { leaving_at: DateTime<Utc> },

    /// The record store refused a write.
    #[error("persistence failure: {0}")]
    Store(#[from] StoreError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// The lifecycle engine, generic over its two adapters.
#[derive(Debug)]
pub struct LifecycleEngine<S, N> {
    store: S,
    notifier: N,
    config: EngineConfig,
}

impl<S, N> LifecycleEngine<S, N> {
    pub fn new(store: S, notifier: N, config: EngineConfig) -> Self {
        LifecycleEngine {
            store,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}

impl<S: TrainStore + Sync, N: Notifier + Sync> LifecycleEngine<S, N> {
    /// Returns all trains the store currently holds for an owner. Used to
    /// render the deletion picker. No side effects.
    pub async fn list_trains(&self, creator: &UserId) -> Result<Vec<Train>> {
        Ok(self.store.query(creator).await?)
    }

    /// Point lookup mapping absence to `NotFound`.
    pub(crate) async fn fetch(&self, key: &TrainKey) -> Result<Train> {
        self.store
            .get(&key.creator, &key.train)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                creator: key.creator.clone(),
                train: key.train.clone(),
            })
    }

    /// When this train's reminders fire.
    fn reminder_fire_at(&self, train: &Train) -> DateTime<Utc> {
        train.leaving_at - self.config.reminder_lead
    }

    /// Schedules a departure reminder for `user`, tolerating failure.
    ///
    /// Returns `None` when the lead window has already passed (the adapter
    /// would reject the past fire time anyway) or when scheduling fails.
    /// Partial success is preferred over blocking membership.
    pub(crate) async fn schedule_reminder_best_effort(
        &self,
        user: &UserId,
        train: &Train,
    ) -> Option<ReminderRef> {
        let fire_at = self.reminder_fire_at(train);
        if fire_at <= Utc::now() {
            debug!(%user, %fire_at, "reminder window already passed, not scheduling");
            return None;
        }
        let text = render::reminder(train, self.config.reminder_lead.num_minutes());
        match self.notifier.schedule_message(user, &text, fire_at).await {
            Ok(reminder) => Some(reminder),
            Err(err) => {
                warn!(%user, %err, "failed to schedule reminder, proceeding without one");
                None
            }
        }
    }

    /// Cancels a scheduled reminder inside its own failure boundary.
    pub(crate) async fn cancel_reminder_best_effort(&self, user: &UserId, reminder: &ReminderRef) {
        if let Err(err) = self.notifier.cancel_scheduled(user, reminder).await {
            if err.kind.is_benign() {
                debug!(%user, %reminder, %err, "reminder already gone");
            } else {
                warn!(%user, %reminder, %err, "failed to cancel reminder");
            }
        }
    }

    /// Deletes a posted message inside its own failure boundary.
    pub(crate) async fn delete_message_best_effort(
        &self,
        channel: &ChannelId,
        message: &MessageRef,
    ) {
        if let Err(err) = self.notifier.delete_message(channel, message).await {
            if err.kind.is_benign() {
                debug!(%channel, %message, %err, "message already gone");
            } else {
                warn!(%channel, %message, %err, "failed to delete message");
            }
        }
    }

    /// Applies a roster mutation and commits it with the conditional write,
    /// re-reading and re-applying on conflict.
    ///
    /// `apply` must be safe to run against any fresh read of the record; it
    /// performs no I/O and is never the source of side effects.
    pub(crate) async fn commit_roster_change(
        &self,
        mut train: Train,
        key: &TrainKey,
        apply: impl Fn(&mut Train),
    ) -> Result<Train> {
        let mut attempt = 0;
        loop {
            let mut candidate = train.clone();
            apply(&mut candidate);
            candidate.bump_revision();
            match self.store.upsert(&candidate).await {
                Ok(()) => return Ok(candidate),
                Err(err) if err.is_conflict() => {
                    attempt += 1;
                    if attempt >= ROSTER_WRITE_ATTEMPTS {
                        warn!(key = %key, attempts = attempt, "roster write conflict not resolved");
                        return Err(err.into());
                    }
                    debug!(key = %key, attempt, "lost conditional write, re-reading");
                    train = self.fetch(key).await?;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
