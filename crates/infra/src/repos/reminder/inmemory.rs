use super::{IReminderRepo, ReminderFired};
use crate::repos::shared::inmemory_repo::*;
use smart_health_domain::{Reminder, ID};
use std::sync::atomic::{AtomicBool, Ordering};

pub struct InMemoryReminderRepo {
    reminders: std::sync::Mutex<Vec<Reminder>>,
    fail_queries: AtomicBool,
    fail_marks: AtomicBool,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: std::sync::Mutex::new(vec![]),
            fail_queries: AtomicBool::new(false),
            fail_marks: AtomicBool::new(false),
        }
    }

    /// Makes `find_enabled` fail, used to simulate an unavailable store
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Makes `mark_fired_many` fail without writing anything
    pub fn set_fail_marks(&self, fail: bool) {
        self.fail_marks.store(fail, Ordering::SeqCst);
    }
}

impl Default for InMemoryReminderRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        find(reminder_id, &self.reminders)
    }

    async fn find_enabled(&self) -> anyhow::Result<Vec<Reminder>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Reminder store is unavailable"));
        }
        Ok(find_by(&self.reminders, |r| r.enabled))
    }

    async fn mark_fired_many(&self, fired: &[ReminderFired]) -> anyhow::Result<()> {
        if self.fail_marks.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Reminder store is unavailable"));
        }
        let mut missing = Vec::new();
        for f in fired {
            let updated = update_one(&f.reminder_id, &self.reminders, |r| {
                r.mark_fired(f.bucket, f.sent_at)
            });
            if !updated {
                missing.push(f.reminder_id.to_string());
            }
        }
        if !missing.is_empty() {
            return Err(anyhow::anyhow!(
                "Unable to mark reminders as fired: {}",
                missing.join(", ")
            ));
        }
        Ok(())
    }
}
