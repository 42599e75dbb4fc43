//! Core domain types for the lunch train engine.

pub mod ids;
pub mod train;

pub use ids::{ChannelId, MessageRef, ReminderRef, TrainId, TrainKey, UserId};
pub use train::{Announcement, Participant, Train, TrainStatus, TrainValidationError};
