//! Train deletion.

use chrono::Utc;
use tracing::{debug, info};

use crate::notify::Notifier;
use crate::store::{StoreError, TrainStore};
use crate::types::{TrainKey, TrainStatus, UserId};

use super::{EngineError, LifecycleEngine, Result};

impl<S: TrainStore + Sync, N: Notifier + Sync> LifecycleEngine<S, N> {
    /// Deletes a train.
    ///
    /// The record deletion comes first and is the only step whose failure
    /// aborts the operation. Everything after it is best-effort
    /// compensation: for a still-active train, the creator's reminder,
    /// every participant's reminder and "joined" reply, and the
    /// announcement itself are removed, each step in its own failure
    /// boundary. A departed train gets no cleanup calls at all — its
    /// reminders have fired and its messages are history.
    ///
    /// Only the creator may delete a train. A foreign requester is told
    /// the train does not exist rather than that it is someone else's.
    pub async fn delete_train(&self, key: &TrainKey, requester: &UserId) -> Result<()> {
        if requester != &key.creator {
            info!(key = %key, %requester, "refusing delete by non-creator");
            return Err(EngineError::NotFound {
                creator: key.creator.clone(),
                train: key.train.clone(),
            });
        }

        let train = self.fetch(key).await?;

        match self.store().delete(&key.creator, &key.train).await {
            Ok(()) => {}
            // Deleted out from under us between the read and the delete.
            Err(StoreError::NotFound { creator, train }) => {
                return Err(EngineError::NotFound { creator, train });
            }
            Err(err) => return Err(err.into()),
        }

        if train.status(Utc::now()) == TrainStatus::Active {
            if let Some(reminder) = &train.creator_reminder {
                self.cancel_reminder_best_effort(&train.creator_id, reminder)
                    .await;
            }
            for entry in &train.participants {
                if let Some(reminder) = &entry.reminder {
                    self.cancel_reminder_best_effort(&entry.user_id, reminder)
                        .await;
                }
                if let (Some(announcement), Some(message)) =
                    (&train.announcement, &entry.joined_message)
                {
                    self.delete_message_best_effort(&announcement.channel, message)
                        .await;
                }
            }
            if let Some(announcement) = &train.announcement {
                self.delete_message_best_effort(&announcement.channel, &announcement.message)
                    .await;
            }
        } else {
            debug!(key = %key, "train already departed, skipping notification cleanup");
        }

        info!(key = %key, %requester, "train deleted");
        Ok(())
    }
}
