use super::IAppointmentRepo;
use crate::repos::shared::inmemory_repo::*;
use smart_health_domain::{Appointment, ID};
use std::sync::atomic::{AtomicBool, Ordering};

pub struct InMemoryAppointmentRepo {
    appointments: std::sync::Mutex<Vec<Appointment>>,
    fail_queries: AtomicBool,
}

impl InMemoryAppointmentRepo {
    pub fn new() -> Self {
        Self {
            appointments: std::sync::Mutex::new(vec![]),
            fail_queries: AtomicBool::new(false),
        }
    }

    /// Makes `find_unsent_starting_between` fail, used to simulate an
    /// unavailable store
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }
}

impl Default for InMemoryAppointmentRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IAppointmentRepo for InMemoryAppointmentRepo {
    async fn insert(&self, appointment: &Appointment) -> anyhow::Result<()> {
        insert(appointment, &self.appointments);
        Ok(())
    }

    async fn find(&self, appointment_id: &ID) -> Option<Appointment> {
        find(appointment_id, &self.appointments)
    }

    async fn find_unsent_starting_between(
        &self,
        from: i64,
        to: i64,
    ) -> anyhow::Result<Vec<Appointment>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Appointment store is unavailable"));
        }
        Ok(find_by(&self.appointments, |a| {
            !a.reminder_sent && a.date_time >= from && a.date_time <= to
        }))
    }

    async fn set_meeting(
        &self,
        appointment_id: &ID,
        meeting_link: &str,
        external_event_id: Option<&str>,
    ) -> anyhow::Result<()> {
        let updated = update_one(appointment_id, &self.appointments, |a| {
            a.set_meeting(meeting_link.to_string(), external_event_id.map(String::from))
        });
        if !updated {
            return Err(anyhow::anyhow!("Appointment {} not found", appointment_id));
        }
        Ok(())
    }

    async fn mark_reminder_sent(&self, appointment_id: &ID) -> anyhow::Result<bool> {
        let mut flipped = false;
        let found = update_one(appointment_id, &self.appointments, |a| {
            flipped = !a.reminder_sent;
            a.mark_reminder_sent();
        });
        if !found {
            return Err(anyhow::anyhow!("Appointment {} not found", appointment_id));
        }
        Ok(flipped)
    }
}
