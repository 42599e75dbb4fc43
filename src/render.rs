//! Message text rendering.
//!
//! Pure builders for every piece of user-visible text the engine sends.
//! No I/O here; the engine passes these strings to the notifier.

use chrono::{DateTime, Utc};

use crate::types::{Train, UserId};

/// Display format for departure times in channel messages.
const LEAVING_AT_FORMAT: &str = "%d/%m/%y %H:%M";

/// Platform mention markup for a user.
fn mention(user: &UserId) -> String {
    format!("<@{}>", user)
}

/// The public announcement body posted when a train is created.
pub fn announcement(train: &Train) -> String {
    format!(
        "{} has started a lunch train!\nDestination: {}\nMeeting at: {}\nLeaving: {}",
        mention(&train.creator_id),
        train.destination,
        train.meet_location,
        train.leaving_at.format(LEAVING_AT_FORMAT),
    )
}

/// The threaded reply posted under the announcement when a user joins.
pub fn joined_reply(user: &UserId) -> String {
    format!("{} joined the train!", mention(user))
}

/// The delayed direct reminder sent shortly before departure.
pub fn reminder(train: &Train, lead_minutes: i64) -> String {
    format!(
        "The lunch train to {} leaves from {} in {} minutes!",
        train.destination, train.meet_location, lead_minutes,
    )
}

/// One-line label for a train in the deletion picker.
pub fn picker_label(train: &Train) -> String {
    format!(
        "{} — leaving {} ({} aboard)",
        train.destination,
        train.leaving_at.format(LEAVING_AT_FORMAT),
        train.participants.len(),
    )
}

/// The private notice shown when a creation request names a past departure.
pub fn rejected_in_the_past(leaving_at: DateTime<Utc>) -> String {
    format!(
        "That train would have left at {} — pick a time in the future.",
        leaving_at.format(LEAVING_AT_FORMAT),
    )
}
