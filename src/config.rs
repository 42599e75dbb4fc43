//! Engine configuration.

use chrono::Duration;

/// Tunables for the lifecycle engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long before departure each reminder fires.
    pub reminder_lead: Duration,

    /// How long after departure a record is retained before the store may
    /// purge it.
    pub retention: Duration,
}

impl EngineConfig {
    /// Reminders fire ten minutes before departure.
    pub const DEFAULT_REMINDER_LEAD_MINUTES: i64 = 10;

    /// Records are retained for seven days after departure.
    pub const DEFAULT_RETENTION_DAYS: i64 = 7;

    pub fn new() -> Self {
        EngineConfig {
            reminder_lead: Duration::minutes(Self::DEFAULT_REMINDER_LEAD_MINUTES),
            retention: Duration::days(Self::DEFAULT_RETENTION_DAYS),
        }
    }

    /// Sets a custom reminder lead time.
    pub fn with_reminder_lead(mut self, lead: Duration) -> Self {
        self.reminder_lead = lead;
        self
    }

    /// Sets a custom retention window.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
