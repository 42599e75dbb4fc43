//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different ID types (e.g., using a
//! MessageRef where a ReminderRef is expected) and make the code more
//! self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A platform user identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(s: impl Into<String>) -> Self {
        UserId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// A unique train identifier, generated at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainId(pub String);

impl TrainId {
    /// Generates a fresh random train identifier.
    pub fn generate() -> Self {
        TrainId(Uuid::new_v4().to_string())
    }

    pub fn new(s: impl Into<String>) -> Self {
        TrainId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TrainId {
    fn from(s: &str) -> Self {
        TrainId(s.to_string())
    }
}

/// A messaging channel identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(s: impl Into<String>) -> Self {
        ChannelId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        ChannelId(s.to_string())
    }
}

/// A reference to a posted message, used for threading replies and deletion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageRef(pub String);

impl MessageRef {
    pub fn new(s: impl Into<String>) -> Self {
        MessageRef(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reference to a scheduled (not yet fired) reminder, used for cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderRef(pub String);

impl ReminderRef {
    pub fn new(s: impl Into<String>) -> Self {
        ReminderRef(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReminderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The composite key identifying a train, as encoded in button payloads.
///
/// The interaction surface encodes this as `creatorId.trainId` in the value
/// of the join/leave/delete buttons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrainKey {
    pub creator: UserId,
    pub train: TrainId,
}

impl TrainKey {
    pub fn new(creator: impl Into<String>, train: impl Into<String>) -> Self {
        TrainKey {
            creator: UserId::new(creator),
            train: TrainId::new(train),
        }
    }

    /// Parses a `creatorId.trainId` button payload.
    ///
    /// User ids never contain a dot, so the first dot is the separator; the
    /// train id (a UUID) may contain dashes but no dots.
    pub fn parse(payload: &str) -> Option<Self> {
        let (creator, train) = payload.split_once('.')?;
        if creator.is_empty() || train.is_empty() {
            return None;
        }
        Some(TrainKey::new(creator, train))
    }

    /// Encodes the key back into the `creatorId.trainId` payload form.
    pub fn encode(&self) -> String {
        format!("{}.{}", self.creator, self.train)
    }
}

impl fmt::Display for TrainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.creator, self.train)
    }
}
