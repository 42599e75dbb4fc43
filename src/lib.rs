//! Lunch Train - lifecycle and notification-consistency engine for ad-hoc
//! group departures.
//!
//! A creator proposes a destination and departure time, other users opt in
//! or out, and the engine keeps the persisted roster, the scheduled
//! reminders, and the public announcement consistent across independent,
//! possibly-failing operations.

pub mod config;
pub mod engine;
pub mod ingest;
pub mod notify;
pub mod render;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;
