//! Shared test utilities: arbitrary generators and a recording notifier.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;

use crate::notify::{Notifier, NotifyError, Result as NotifyResult};
use crate::types::{
    ChannelId, MessageRef, Participant, ReminderRef, Train, TrainId, UserId,
};

pub fn arb_user_id() -> impl Strategy<Value = UserId> {
    "U[A-Z0-9]{4,8}".prop_map(UserId::new)
}

pub fn arb_train_id() -> impl Strategy<Value = TrainId> {
    "[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}".prop_map(TrainId::new)
}

pub fn arb_message_ref() -> impl Strategy<Value = MessageRef> {
    "[0-9]{10}\\.[0-9]{6}".prop_map(MessageRef::new)
}

pub fn arb_reminder_ref() -> impl Strategy<Value = ReminderRef> {
    "R[a-z0-9]{8}".prop_map(ReminderRef::new)
}

pub fn arb_participant() -> impl Strategy<Value = Participant> {
    (
        arb_user_id(),
        prop::option::of(arb_message_ref()),
        prop::option::of(arb_reminder_ref()),
    )
        .prop_map(|(user, joined, reminder)| Participant::new(user, joined, reminder))
}

/// A structurally valid train: unique participants, derived expiry.
pub fn arb_train() -> impl Strategy<Value = Train> {
    (
        arb_user_id(),
        arb_train_id(),
        "[A-Za-z ]{1,20}",
        "[A-Za-z ]{1,20}",
        -10_000i64..10_000i64,
        1i64..10i64,
        prop::collection::vec(arb_participant(), 0..5),
    )
        .prop_map(
            |(creator, train_id, destination, meet, offset_minutes, retention_days, mut roster)| {
                let mut train = Train::new(
                    creator,
                    train_id,
                    destination,
                    format!("@{meet}"),
                    Utc::now() + Duration::minutes(offset_minutes),
                    Duration::days(retention_days),
                );
                roster.sort_by(|a, b| a.user_id.cmp(&b.user_id));
                roster.dedup_by(|a, b| a.user_id == b.user_id);
                train.participants = roster;
                train
            },
        )
}

/// Every call the notification service received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyCall {
    PostAnnouncement {
        channel: ChannelId,
        text: String,
    },
    PostReply {
        channel: ChannelId,
        parent: MessageRef,
        text: String,
    },
    DeleteMessage {
        channel: ChannelId,
        message: MessageRef,
    },
    ScheduleMessage {
        user: UserId,
        text: String,
        fire_at: DateTime<Utc>,
    },
    CancelScheduled {
        user: UserId,
        reminder: ReminderRef,
    },
}

/// A `Notifier` that records every call and can be scripted to fail
/// specific operations.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<NotifyCall>>,
    counter: AtomicU64,
    fail_posts: AtomicBool,
    fail_schedule: AtomicBool,
    fail_delete: AtomicBool,
    fail_cancel: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        RecordingNotifier::default()
    }

    pub fn calls(&self) -> Vec<NotifyCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Fail announcement posts and replies with a transport error.
    pub fn fail_posts(&self) {
        self.fail_posts.store(true, Ordering::SeqCst);
    }

    /// Fail reminder scheduling with a transport error.
    pub fn fail_schedule(&self) {
        self.fail_schedule.store(true, Ordering::SeqCst);
    }

    /// Fail message deletion with an unknown-reference error.
    pub fn fail_delete(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    /// Fail reminder cancellation with an unknown-reference error.
    pub fn fail_cancel(&self) {
        self.fail_cancel.store(true, Ordering::SeqCst);
    }

    pub fn scheduled_reminders(&self) -> Vec<NotifyCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, NotifyCall::ScheduleMessage { .. }))
            .collect()
    }

    pub fn cancelled_reminders(&self) -> Vec<NotifyCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, NotifyCall::CancelScheduled { .. }))
            .collect()
    }

    pub fn deleted_messages(&self) -> Vec<NotifyCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, NotifyCall::DeleteMessage { .. }))
            .collect()
    }

    fn next_ref(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}-{n}")
    }

    fn record(&self, call: NotifyCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Notifier for RecordingNotifier {
    async fn post_announcement(
        &self,
        channel: &ChannelId,
        text: &str,
    ) -> NotifyResult<MessageRef> {
        self.record(NotifyCall::PostAnnouncement {
            channel: channel.clone(),
            text: text.to_string(),
        });
        if self.fail_posts.load(Ordering::SeqCst) {
            return Err(NotifyError::transport("post failed"));
        }
        Ok(MessageRef::new(self.next_ref("msg")))
    }

    async fn post_reply(
        &self,
        channel: &ChannelId,
        parent: &MessageRef,
        text: &str,
    ) -> NotifyResult<MessageRef> {
        self.record(NotifyCall::PostReply {
            channel: channel.clone(),
            parent: parent.clone(),
            text: text.to_string(),
        });
        if self.fail_posts.load(Ordering::SeqCst) {
            return Err(NotifyError::transport("reply failed"));
        }
        Ok(MessageRef::new(self.next_ref("reply")))
    }

    async fn delete_message(&self, channel: &ChannelId, message: &MessageRef) -> NotifyResult<()> {
        self.record(NotifyCall::DeleteMessage {
            channel: channel.clone(),
            message: message.clone(),
        });
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(NotifyError::unknown_reference(message.as_str()));
        }
        Ok(())
    }

    async fn schedule_message(
        &self,
        user: &UserId,
        text: &str,
        fire_at: DateTime<Utc>,
    ) -> NotifyResult<ReminderRef> {
        self.record(NotifyCall::ScheduleMessage {
            user: user.clone(),
            text: text.to_string(),
            fire_at,
        });
        if fire_at <= Utc::now() {
            return Err(NotifyError::invalid_timestamp(fire_at));
        }
        if self.fail_schedule.load(Ordering::SeqCst) {
            return Err(NotifyError::transport("schedule failed"));
        }
        Ok(ReminderRef::new(self.next_ref("rem")))
    }

    async fn cancel_scheduled(&self, user: &UserId, reminder: &ReminderRef) -> NotifyResult<()> {
        self.record(NotifyCall::CancelScheduled {
            user: user.clone(),
            reminder: reminder.clone(),
        });
        if self.fail_cancel.load(Ordering::SeqCst) {
            return Err(NotifyError::unknown_reference(reminder.as_str()));
        }
        Ok(())
    }
}
