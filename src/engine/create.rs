//! Train creation.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::notify::Notifier;
use crate::render;
use crate::store::TrainStore;
use crate::types::{Announcement, ChannelId, Train, TrainId, UserId};

use super::{EngineError, LifecycleEngine, Result};

impl<S: TrainStore + Sync, N: Notifier + Sync> LifecycleEngine<S, N> {
    /// Creates a new train: posts the announcement, schedules the creator's
    /// reminder, then persists the record.
    ///
    /// Rejects with `InThePast` before anything is written or posted when
    /// `leaving_at` is not strictly in the future.
    ///
    /// Side-effect ordering is deliberate: the announcement and reminder
    /// are attempted before the persistence write. If the write then fails,
    /// the side effects are not rolled back; an orphaned announcement is
    /// tolerated rather than risking deletion of a message another process
    /// may already reference.
    pub async fn create_train(
        &self,
        creator: UserId,
        destination: impl Into<String>,
        meet_location: impl Into<String>,
        leaving_at: DateTime<Utc>,
        channel: ChannelId,
    ) -> Result<Train> {
        if leaving_at <= Utc::now() {
            return Err(EngineError::InThePast { leaving_at });
        }

        let train_id = TrainId::generate();
        let mut train = Train::new(
            creator,
            train_id,
            destination,
            meet_location,
            leaving_at,
            self.config().retention,
        );

        match self
            .notifier()
            .post_announcement(&channel, &render::announcement(&train))
            .await
        {
            Ok(message) => {
                train.announcement = Some(Announcement {
                    channel: channel.clone(),
                    message,
                });
            }
            Err(err) => {
                warn!(%channel, %err, "failed to post announcement, train continues without one");
            }
        }

        train.creator_reminder = self
            .schedule_reminder_best_effort(&train.creator_id, &train)
            .await;

        self.store().upsert(&train).await?;
        info!(train = %train.train_id, creator = %train.creator_id, "train created");
        Ok(train)
    }
}
