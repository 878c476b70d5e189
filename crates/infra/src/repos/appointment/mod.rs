mod inmemory;
mod postgres;

pub use inmemory::InMemoryAppointmentRepo;
pub use postgres::PostgresAppointmentRepo;
use smart_health_domain::{Appointment, ID};

#[async_trait::async_trait]
pub trait IAppointmentRepo: Send + Sync {
    async fn insert(&self, appointment: &Appointment) -> anyhow::Result<()>;
    async fn find(&self, appointment_id: &ID) -> Option<Appointment>;
    /// `Appointment`s without a sent reminder starting in `[from, to]`
    async fn find_unsent_starting_between(
        &self,
        from: i64,
        to: i64,
    ) -> anyhow::Result<Vec<Appointment>>;
    async fn set_meeting(
        &self,
        appointment_id: &ID,
        meeting_link: &str,
        external_event_id: Option<&str>,
    ) -> anyhow::Result<()>;
    /// Flips `reminder_sent` to true. Returns false if it already was.
    async fn mark_reminder_sent(&self, appointment_id: &ID) -> anyhow::Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HealthContext;

    #[tokio::test]
    async fn finds_unsent_appointments_in_window() {
        let ctx = HealthContext::create_inmemory();
        let minute = 1000 * 60;
        let now = 10_000 * minute;

        let inside = Appointment::new(ID::default(), ID::default(), now + minute);
        let outside = Appointment::new(ID::default(), ID::default(), now + 2 * minute);
        let past = Appointment::new(ID::default(), ID::default(), now - 1);
        let mut sent = Appointment::new(ID::default(), ID::default(), now);
        sent.reminder_sent = true;

        for appointment in vec![&inside, &outside, &past, &sent] {
            ctx.repos.appointments.insert(appointment).await.unwrap();
        }

        let res = ctx
            .repos
            .appointments
            .find_unsent_starting_between(now, now + minute)
            .await
            .unwrap();
        assert_eq!(res, vec![inside.clone()]);

        assert!(ctx
            .repos
            .appointments
            .mark_reminder_sent(&inside.id)
            .await
            .unwrap());
        assert!(!ctx
            .repos
            .appointments
            .mark_reminder_sent(&inside.id)
            .await
            .unwrap());
        assert!(ctx
            .repos
            .appointments
            .find_unsent_starting_between(now, now + minute)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn stores_meeting() {
        let ctx = HealthContext::create_inmemory();
        let appointment = Appointment::new(ID::default(), ID::default(), 0);
        ctx.repos.appointments.insert(&appointment).await.unwrap();
        ctx.repos
            .appointments
            .set_meeting(&appointment.id, "https://meet.example.com/x", Some("evt_1"))
            .await
            .unwrap();
        let found = ctx.repos.appointments.find(&appointment.id).await.unwrap();
        assert_eq!(found.meeting_link.as_deref(), Some("https://meet.example.com/x"));
        assert_eq!(found.external_event_id.as_deref(), Some("evt_1"));

        assert!(ctx
            .repos
            .appointments
            .set_meeting(&ID::default(), "https://meet.example.com/y", None)
            .await
            .is_err());
    }
}
