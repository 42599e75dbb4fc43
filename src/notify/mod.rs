//! Notification service adapter contract.
//!
//! The notification service posts and deletes channel messages and manages
//! one-shot delayed direct reminders. The engine treats every call through
//! this trait as fallible best-effort I/O: failures are categorized so the
//! caller can tell a benign "already gone" from a transport fault, but the
//! engine absorbs both kinds for cleanup operations.

use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::{ChannelId, MessageRef, ReminderRef, UserId};

/// The kind of notification failure, categorized for logging decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyErrorKind {
    /// The requested fire time is not in the future. The adapter rejects
    /// these outright; callers are expected to validate first.
    InvalidTimestamp,

    /// The referenced message or reminder no longer exists (already
    /// deleted, already fired). Deleting and cancelling are
    /// idempotent-in-intent, so this is reported but non-fatal.
    UnknownReference,

    /// The service could not be reached or rejected the call.
    Transport,
}

impl NotifyErrorKind {
    /// Returns true for failures that leave the world in the state the
    /// caller wanted anyway (the target was already gone).
    pub fn is_benign(&self) -> bool {
        matches!(self, NotifyErrorKind::UnknownReference)
    }
}

/// A notification service failure.
#[derive(Debug, Clone, Error)]
#[error("notification failure ({kind:?}): {message}")]
pub struct NotifyError {
    pub kind: NotifyErrorKind,
    pub message: String,
}

impl NotifyError {
    pub fn new(kind: NotifyErrorKind, message: impl Into<String>) -> Self {
        NotifyError {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_timestamp(fire_at: DateTime<Utc>) -> Self {
        Self::new(
            NotifyErrorKind::InvalidTimestamp,
            format!("fire time {fire_at} is not in the future"),
        )
    }

    pub fn unknown_reference(reference: impl Into<String>) -> Self {
        Self::new(
            NotifyErrorKind::UnknownReference,
            format!("no such message or reminder: {}", reference.into()),
        )
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(NotifyErrorKind::Transport, message)
    }
}

/// Result type for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Messaging and reminder scheduling, as exposed by the platform.
///
/// # Example (mock for testing)
///
/// See `test_utils::RecordingNotifier`, which records every call and can be
/// scripted to fail specific operations.
pub trait Notifier {
    /// Posts a new top-level announcement and returns its reference.
    fn post_announcement(
        &self,
        channel: &ChannelId,
        text: &str,
    ) -> impl Future<Output = Result<MessageRef>> + Send;

    /// Posts a threaded reply under an existing message.
    fn post_reply(
        &self,
        channel: &ChannelId,
        parent: &MessageRef,
        text: &str,
    ) -> impl Future<Output = Result<MessageRef>> + Send;

    /// Deletes a previously posted message. Idempotent-in-intent: an
    /// unknown reference is a benign failure.
    fn delete_message(
        &self,
        channel: &ChannelId,
        message: &MessageRef,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Schedules a one-shot delayed direct message. `fire_at` must be in
    /// the future; the adapter rejects past instants.
    fn schedule_message(
        &self,
        user: &UserId,
        text: &str,
        fire_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<ReminderRef>> + Send;

    /// Cancels a scheduled reminder. Idempotent-in-intent: a reminder whose
    /// fire time has already elapsed is a benign failure.
    fn cancel_scheduled(
        &self,
        user: &UserId,
        reminder: &ReminderRef,
    ) -> impl Future<Output = Result<()>> + Send;
}
