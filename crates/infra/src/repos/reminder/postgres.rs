use super::{IReminderRepo, ReminderFired};
use smart_health_domain::{LastFiredMarker, MinuteBucket, Reminder, TimeOfDay, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;
use tracing::error;

pub struct PostgresReminderRepo {
    pool: PgPool,
}

impl PostgresReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderRaw {
    reminder_uid: Uuid,
    user_uid: Uuid,
    enabled: bool,
    name: String,
    message: String,
    start_hour: i32,
    start_minute: i32,
    end_hour: i32,
    end_minute: i32,
    interval_minutes: i64,
    tz_offset_minutes: i64,
    fcm_token: Option<String>,
    last_fired_minute: Option<i64>,
    last_minute_sent: Option<String>,
    last_sent_at: Option<i64>,
}

// Negative values can not be represented and end up as an invalid
// time of day which is rejected when the reminder is evaluated
fn time_of_day(hour: i32, minute: i32) -> TimeOfDay {
    TimeOfDay::new(
        u32::try_from(hour).unwrap_or(u32::MAX),
        u32::try_from(minute).unwrap_or(u32::MAX),
    )
}

impl From<ReminderRaw> for Reminder {
    fn from(raw: ReminderRaw) -> Self {
        let last_fired = match (raw.last_fired_minute, raw.last_minute_sent) {
            (Some(minute), _) => Some(LastFiredMarker::Bucket(MinuteBucket::new(minute))),
            (None, Some(key)) => Some(LastFiredMarker::LocalMinute(key)),
            (None, None) => None,
        };
        Self {
            id: raw.reminder_uid.into(),
            user_id: raw.user_uid.into(),
            enabled: raw.enabled,
            name: raw.name,
            message: raw.message,
            start: time_of_day(raw.start_hour, raw.start_minute),
            end: time_of_day(raw.end_hour, raw.end_minute),
            interval_minutes: raw.interval_minutes,
            tz_offset_minutes: raw.tz_offset_minutes,
            fcm_token: raw.fcm_token,
            last_fired,
            last_sent_at: raw.last_sent_at,
        }
    }
}

fn marker_columns(marker: &Option<LastFiredMarker>) -> (Option<i64>, Option<String>) {
    match marker {
        Some(LastFiredMarker::Bucket(bucket)) => (Some(bucket.inner()), None),
        Some(LastFiredMarker::LocalMinute(key)) => (None, Some(key.clone())),
        None => (None, None),
    }
}

#[async_trait::async_trait]
impl IReminderRepo for PostgresReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        let (last_fired_minute, last_minute_sent) = marker_columns(&reminder.last_fired);
        sqlx::query(
            r#"
            INSERT INTO reminders
            (reminder_uid, user_uid, enabled, name, message, start_hour, start_minute,
             end_hour, end_minute, interval_minutes, tz_offset_minutes, fcm_token,
             last_fired_minute, last_minute_sent, last_sent_at)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(reminder.user_id.inner_ref())
        .bind(reminder.enabled)
        .bind(&reminder.name)
        .bind(&reminder.message)
        .bind(reminder.start.hour as i32)
        .bind(reminder.start.minute as i32)
        .bind(reminder.end.hour as i32)
        .bind(reminder.end.minute as i32)
        .bind(reminder.interval_minutes)
        .bind(reminder.tz_offset_minutes)
        .bind(&reminder.fcm_token)
        .bind(last_fired_minute)
        .bind(last_minute_sent)
        .bind(reminder.last_sent_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.reminder_uid = $1
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to find reminder {}. Error: {:?}", reminder_id, e);
            None
        })
        .map(|raw| raw.into())
    }

    async fn find_enabled(&self) -> anyhow::Result<Vec<Reminder>> {
        let reminders = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.enabled = true
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders.into_iter().map(|r| r.into()).collect())
    }

    async fn mark_fired_many(&self, fired: &[ReminderFired]) -> anyhow::Result<()> {
        let mut failed = Vec::new();
        for f in fired {
            let res = sqlx::query(
                r#"
                UPDATE reminders
                SET last_fired_minute = $2,
                last_minute_sent = NULL,
                last_sent_at = $3
                WHERE reminder_uid = $1
                "#,
            )
            .bind(f.reminder_id.inner_ref())
            .bind(f.bucket.inner())
            .bind(f.sent_at)
            .execute(&self.pool)
            .await;

            match res {
                Ok(done) if done.rows_affected() == 1 => {}
                Ok(_) => failed.push(f.reminder_id.to_string()),
                Err(e) => {
                    error!(
                        "Unable to mark reminder {} as fired. Error: {:?}",
                        f.reminder_id, e
                    );
                    failed.push(f.reminder_id.to_string());
                }
            }
        }

        if !failed.is_empty() {
            return Err(anyhow::anyhow!(
                "Unable to mark reminders as fired: {}",
                failed.join(", ")
            ));
        }
        Ok(())
    }
}
