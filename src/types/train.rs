//! Train record and participant types.
//!
//! A `Train` is the root entity: one scheduled group departure, owned by its
//! creator. Participants are owned by the train and exist only through
//! explicit join/leave actions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::ids::{ChannelId, MessageRef, ReminderRef, TrainId, UserId};

/// Reference to the externally posted announcement message.
///
/// Set once at creation and immutable afterwards. The message ref anchors
/// threaded join replies; the pair is needed to delete the announcement when
/// the train is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub channel: ChannelId,
    pub message: MessageRef,
}

/// A user who has opted into a train.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: UserId,

    /// The threaded "user joined" reply, deleted again when the user leaves.
    /// `None` when posting the reply failed.
    pub joined_message: Option<MessageRef>,

    /// The user's scheduled departure reminder, cancelled when the user
    /// leaves. `None` when scheduling failed or the lead window had already
    /// passed at join time.
    pub reminder: Option<ReminderRef>,

    /// Reserved for a future roll-call feature; always false for now.
    pub ready_to_depart: bool,
}

impl Participant {
    pub fn new(
        user_id: UserId,
        joined_message: Option<MessageRef>,
        reminder: Option<ReminderRef>,
    ) -> Self {
        Participant {
            user_id,
            joined_message,
            reminder,
            ready_to_depart: false,
        }
    }
}

/// The derived state of a train. Never stored; always computed from
/// `leaving_at` against a supplied clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrainStatus {
    /// Departure time is still in the future.
    Active,

    /// Departure time has passed but the record has not been purged yet.
    Departed,
}

/// A scheduled group departure.
///
/// Keyed by `(creator_id, train_id)`. The record is a full snapshot: the
/// store replaces it wholesale on every write, so `revision` carries the
/// optimistic-concurrency token that protects roster mutations from lost
/// updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Train {
    /// The organizer. Owner/partition key.
    pub creator_id: UserId,

    /// Opaque unique id generated at creation.
    pub train_id: TrainId,

    pub destination: String,
    pub meet_location: String,

    /// Absolute departure instant.
    pub leaving_at: DateTime<Utc>,

    /// The public announcement message. `None` only when posting it failed
    /// during creation.
    pub announcement: Option<Announcement>,

    /// The creator's scheduled reminder. `None` when scheduling failed.
    pub creator_reminder: Option<ReminderRef>,

    /// Insertion order is join order. Display-relevant, not
    /// correctness-relevant.
    pub participants: Vec<Participant>,

    /// Retention boundary: `leaving_at` + the retention window. The store
    /// treats it as a passive expiry hint; purging is eventual.
    pub expires_at: DateTime<Utc>,

    /// Monotonic token incremented before every update write. The store
    /// rejects a write whose revision is not exactly one ahead of the
    /// stored record.
    pub revision: u64,
}

impl Train {
    /// Creates a fresh train with an empty roster and revision 0.
    ///
    /// `expires_at` is always derived here, never settable by callers.
    pub fn new(
        creator_id: UserId,
        train_id: TrainId,
        destination: impl Into<String>,
        meet_location: impl Into<String>,
        leaving_at: DateTime<Utc>,
        retention: Duration,
    ) -> Self {
        Train {
            creator_id,
            train_id,
            destination: destination.into(),
            meet_location: meet_location.into(),
            leaving_at,
            announcement: None,
            creator_reminder: None,
            participants: Vec::new(),
            expires_at: leaving_at + retention,
            revision: 0,
        }
    }

    /// Derives the train's status from the departure time.
    ///
    /// This is the single place the Active/Departed distinction is made, so
    /// a post-departure join guard is a one-line change here rather than
    /// scattered checks.
    pub fn status(&self, now: DateTime<Utc>) -> TrainStatus {
        if now < self.leaving_at {
            TrainStatus::Active
        } else {
            TrainStatus::Departed
        }
    }

    /// Returns true if the given user is currently on the roster.
    pub fn has_participant(&self, user: &UserId) -> bool {
        self.participants.iter().any(|p| &p.user_id == user)
    }

    /// Increments the revision token. Must be called once before every
    /// update upsert.
    pub fn bump_revision(&mut self) {
        self.revision += 1;
    }

    /// Validates record-level invariants.
    ///
    /// Used by the ingestion path before accepting an externally supplied
    /// record; the direct path maintains these by construction.
    pub fn validate(&self) -> Result<(), TrainValidationError> {
        if self.destination.trim().is_empty() {
            return Err(TrainValidationError::EmptyDestination);
        }
        if self.expires_at < self.leaving_at {
            return Err(TrainValidationError::ExpiryBeforeDeparture);
        }
        let mut seen = HashSet::new();
        for p in &self.participants {
            if !seen.insert(&p.user_id) {
                return Err(TrainValidationError::DuplicateParticipant(
                    p.user_id.clone(),
                ));
            }
        }
        Ok(())
    }
}

/// A record-level invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrainValidationError {
    #[error("destination must not be empty")]
    EmptyDestination,

    #[error("expires_at precedes leaving_at")]
    ExpiryBeforeDeparture,

    #[error("user {0} appears more than once in participants")]
    DuplicateParticipant(UserId),
}
