use super::IAppointmentRepo;
use smart_health_domain::{Appointment, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresAppointmentRepo {
    pool: PgPool,
}

impl PostgresAppointmentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AppointmentRaw {
    appointment_uid: Uuid,
    doctor_uid: Uuid,
    patient_uid: Uuid,
    date_time: i64,
    reason: Option<String>,
    meeting_link: Option<String>,
    external_event_id: Option<String>,
    reminder_sent: bool,
}

impl From<AppointmentRaw> for Appointment {
    fn from(raw: AppointmentRaw) -> Self {
        Self {
            id: raw.appointment_uid.into(),
            doctor_id: raw.doctor_uid.into(),
            patient_id: raw.patient_uid.into(),
            date_time: raw.date_time,
            reason: raw.reason,
            meeting_link: raw.meeting_link,
            external_event_id: raw.external_event_id,
            reminder_sent: raw.reminder_sent,
        }
    }
}

#[async_trait::async_trait]
impl IAppointmentRepo for PostgresAppointmentRepo {
    async fn insert(&self, appointment: &Appointment) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO appointments
            (appointment_uid, doctor_uid, patient_uid, date_time, reason,
             meeting_link, external_event_id, reminder_sent)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(appointment.id.inner_ref())
        .bind(appointment.doctor_id.inner_ref())
        .bind(appointment.patient_id.inner_ref())
        .bind(appointment.date_time)
        .bind(&appointment.reason)
        .bind(&appointment.meeting_link)
        .bind(&appointment.external_event_id)
        .bind(appointment.reminder_sent)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, appointment_id: &ID) -> Option<Appointment> {
        sqlx::query_as::<_, AppointmentRaw>(
            r#"
            SELECT * FROM appointments AS a
            WHERE a.appointment_uid = $1
            "#,
        )
        .bind(appointment_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to find appointment {}. Error: {:?}", appointment_id, e);
            None
        })
        .map(|raw| raw.into())
    }

    async fn find_unsent_starting_between(
        &self,
        from: i64,
        to: i64,
    ) -> anyhow::Result<Vec<Appointment>> {
        let appointments = sqlx::query_as::<_, AppointmentRaw>(
            r#"
            SELECT * FROM appointments AS a
            WHERE a.reminder_sent = false AND
            a.date_time >= $1 AND
            a.date_time <= $2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    async fn set_meeting(
        &self,
        appointment_id: &ID,
        meeting_link: &str,
        external_event_id: Option<&str>,
    ) -> anyhow::Result<()> {
        let res = sqlx::query(
            r#"
            UPDATE appointments
            SET meeting_link = $2,
            external_event_id = $3
            WHERE appointment_uid = $1
            "#,
        )
        .bind(appointment_id.inner_ref())
        .bind(meeting_link)
        .bind(external_event_id)
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(anyhow::anyhow!("Appointment {} not found", appointment_id));
        }
        Ok(())
    }

    async fn mark_reminder_sent(&self, appointment_id: &ID) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE appointments
            SET reminder_sent = true
            WHERE appointment_uid = $1 AND reminder_sent = false
            "#,
        )
        .bind(appointment_id.inner_ref())
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() == 1)
    }
}
