mod inmemory;
mod postgres;

pub use inmemory::InMemoryReminderRepo;
pub use postgres::PostgresReminderRepo;
use smart_health_domain::{MinuteBucket, Reminder, ID};

/// A dispatched occurrence of a `Reminder` that should be written back
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderFired {
    pub reminder_id: ID,
    pub bucket: MinuteBucket,
    pub sent_at: i64,
}

#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn find(&self, reminder_id: &ID) -> Option<Reminder>;
    async fn find_enabled(&self) -> anyhow::Result<Vec<Reminder>>;
    /// Writes the last fired marker of many `Reminder`s in one go. This is not
    /// atomic across reminders: every update is attempted and an error is
    /// returned if at least one of them failed.
    async fn mark_fired_many(&self, fired: &[ReminderFired]) -> anyhow::Result<()>;
}
