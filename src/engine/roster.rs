//! Roster mutations: join and leave.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::notify::Notifier;
use crate::render;
use crate::store::TrainStore;
use crate::types::{Participant, Train, TrainKey, UserId};

use super::{LifecycleEngine, Result, ROSTER_WRITE_ATTEMPTS};

impl<S: TrainStore + Sync, N: Notifier + Sync> LifecycleEngine<S, N> {
    /// Adds a user to a train's roster.
    ///
    /// "Already joined" is advisory, not a hard gate: the operation is
    /// logged and proceeds, tolerating client retries. A retry is
    /// idempotent on roster content — the existing entry is kept (merging
    /// in any reference it was missing) rather than a duplicate being
    /// appended, so every record the engine writes passes
    /// `Train::validate`. The reminder and the threaded "joined" reply are
    /// each tolerated to fail; the roster merge and its conditional write
    /// are what must succeed.
    pub async fn join_train(&self, key: &TrainKey, user: &UserId) -> Result<Train> {
        let train = self.fetch(key).await?;

        let already_aboard = train.has_participant(user);
        let (reminder, joined_message) = if already_aboard {
            info!(%user, key = %key, "user already aboard, refreshing membership");
            (None, None)
        } else {
            let reminder = self.schedule_reminder_best_effort(user, &train).await;
            let joined_message = match &train.announcement {
                Some(announcement) => self
                    .notifier()
                    .post_reply(
                        &announcement.channel,
                        &announcement.message,
                        &render::joined_reply(user),
                    )
                    .await
                    .map_err(|err| {
                        warn!(%user, %err, "failed to post joined reply");
                    })
                    .ok(),
                None => {
                    warn!(key = %key, "train has no announcement to thread under");
                    None
                }
            };
            (reminder, joined_message)
        };

        let joiner = user.clone();
        let updated = self
            .commit_roster_change(train, key, move |t| {
                match t.participants.iter_mut().find(|p| p.user_id == joiner) {
                    Some(entry) => {
                        if entry.reminder.is_none() {
                            entry.reminder = reminder.clone();
                        }
                        if entry.joined_message.is_none() {
                            entry.joined_message = joined_message.clone();
                        }
                    }
                    None => t.participants.push(Participant::new(
                        joiner.clone(),
                        joined_message.clone(),
                        reminder.clone(),
                    )),
                }
            })
            .await?;
        info!(%user, key = %key, roster = updated.participants.len(), "user joined");
        Ok(updated)
    }

    /// Removes a user from a train's roster.
    ///
    /// A non-member leave is advisory and still runs to completion (a
    /// no-op on the roster). For every matching entry the scheduled
    /// reminder is cancelled and the threaded "joined" reply deleted, each
    /// in its own failure boundary; the roster is authoritative even when
    /// cleanup of those artifacts partially fails.
    ///
    /// Cleanup is recomputed from every fresh read of the write loop, so a
    /// matching entry added by a concurrent writer between our read and
    /// our commit still gets its reminder cancelled and its reply deleted
    /// before the retried write removes it.
    pub async fn leave_train(&self, key: &TrainKey, user: &UserId) -> Result<Train> {
        let mut train = self.fetch(key).await?;

        if !train.has_participant(user) {
            info!(%user, key = %key, "user not aboard, proceeding anyway");
        }

        let mut cancelled = HashSet::new();
        let mut deleted = HashSet::new();
        let mut attempt = 0;
        loop {
            for entry in train.participants.iter().filter(|p| &p.user_id == user) {
                if let Some(reminder) = &entry.reminder {
                    if cancelled.insert(reminder.clone()) {
                        self.cancel_reminder_best_effort(user, reminder).await;
                    }
                }
                if let (Some(announcement), Some(message)) =
                    (&train.announcement, &entry.joined_message)
                {
                    if deleted.insert(message.clone()) {
                        self.delete_message_best_effort(&announcement.channel, message)
                            .await;
                    }
                }
            }

            let mut candidate = train.clone();
            candidate.participants.retain(|p| &p.user_id != user);
            candidate.bump_revision();
            match self.store().upsert(&candidate).await {
                Ok(()) => {
                    info!(%user, key = %key, roster = candidate.participants.len(), "user left");
                    return Ok(candidate);
                }
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
