use crate::shared::usecase::UseCase;
use futures::future::join_all;
use smart_health_domain::{MinuteBucket, Reminder, ReminderEvaluation};
use smart_health_infra::{DispatchError, HealthContext, PushNotification, ReminderFired};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// Sends a push notification for every enabled `Reminder` that has a fire
/// point in the current minute and has not been notified for it yet.
#[derive(Debug)]
pub struct SendDueRemindersUseCase;

/// Outcome of one reminder tick
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub sent: usize,
    pub failed: usize,
    /// Misconfigured reminders
    pub skipped: usize,
    pub already_sent: usize,
    pub not_due: usize,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

fn build_notification(ctx: &HealthContext, reminder: &Reminder) -> PushNotification {
    let title = if reminder.name.trim().is_empty() {
        ctx.config.default_reminder_title.clone()
    } else {
        reminder.name.clone()
    };
    let body = if reminder.message.trim().is_empty() {
        ctx.config.default_reminder_body.clone()
    } else {
        reminder.message.clone()
    };
    let mut data = HashMap::new();
    data.insert("deeplink".to_string(), "notifications".to_string());
    data.insert("reminderId".to_string(), reminder.id.to_string());

    PushNotification {
        token: reminder.fcm_token.clone().unwrap_or_default(),
        title,
        body,
        data,
        android_channel_id: ctx.config.push_android_channel_id.clone(),
    }
}

async fn dispatch(
    ctx: &HealthContext,
    reminder: &Reminder,
    bucket: MinuteBucket,
) -> Result<MinuteBucket, DispatchError> {
    let notification = build_notification(ctx, reminder);
    ctx.services.push.send_push(&notification).await?;
    Ok(bucket)
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendDueRemindersUseCase {
    type Response = TickReport;

    type Errors = UseCaseError;

    const NAME: &'static str = "SendDueReminders";

    async fn execute(&mut self, ctx: &HealthContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_timestamp_millis();
        let reminders = ctx.repos.reminders.find_enabled().await.map_err(|e| {
            error!("Unable to query enabled reminders: {:?}", e);
            UseCaseError::StorageError
        })?;

        let mut report = TickReport::default();
        let mut due = Vec::new();
        for reminder in &reminders {
            match reminder.evaluate(now) {
                ReminderEvaluation::Due(bucket) => due.push((reminder, bucket)),
                ReminderEvaluation::NotDue => {
                    report.not_due += 1;
                }
                ReminderEvaluation::AlreadySent(bucket) => {
                    debug!(
                        reminder_id = %reminder.id,
                        bucket = bucket.inner(),
                        "Reminder was already sent for this minute"
                    );
                    report.already_sent += 1;
                }
                ReminderEvaluation::Misconfigured(e) => {
                    warn!(reminder_id = %reminder.id, "Skipping reminder: {}", e);
                    report.skipped += 1;
                }
            }
        }

        let outcomes = join_all(
            due.iter()
                .map(|(reminder, bucket)| dispatch(ctx, reminder, *bucket)),
        )
        .await;

        let mut fired = Vec::with_capacity(outcomes.len());
        for ((reminder, _), outcome) in due.iter().zip(outcomes) {
            match outcome {
                Ok(bucket) => {
                    info!(reminder_id = %reminder.id, "Reminder sent");
                    fired.push(ReminderFired {
                        reminder_id: reminder.id.clone(),
                        bucket,
                        sent_at: now,
                    });
                }
                Err(e) => {
                    error!(
                        reminder_id = %reminder.id,
                        code = %e.code,
                        "Unable to send reminder: {}",
                        e.message
                    );
                    report.failed += 1;
                }
            }
        }
        report.sent = fired.len();

        if !fired.is_empty() {
            if let Err(e) = ctx.repos.reminders.mark_fired_many(&fired).await {
                // The occurrences were delivered, at worst they are sent again next tick
                error!("Unable to record sent reminders: {:?}", e);
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::usecase::execute;
    use chrono::{TimeZone, Utc};
    use smart_health_domain::{LastFiredMarker, TimeOfDay, ID};
    use smart_health_infra::{InMemoryPushGateway, InMemoryReminderRepo, StaticTimeSys};
    use std::sync::Arc;

    struct TestContext {
        ctx: HealthContext,
        push: Arc<InMemoryPushGateway>,
        reminders: Arc<InMemoryReminderRepo>,
    }

    fn ts(h: u32, m: u32) -> i64 {
        Utc.with_ymd_and_hms(2021, 3, 10, h, m, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn setup() -> TestContext {
        let mut ctx = HealthContext::create_inmemory();
        let push = Arc::new(InMemoryPushGateway::new());
        let reminders = Arc::new(InMemoryReminderRepo::new());
        ctx.services.push = push.clone();
        ctx.repos.reminders = reminders.clone();
        TestContext {
            ctx,
            push,
            reminders,
        }
    }

    fn at(ctx: &HealthContext, now: i64) -> HealthContext {
        let mut ctx = ctx.clone();
        ctx.sys = Arc::new(StaticTimeSys(now));
        ctx
    }

    fn reminder(start: TimeOfDay, end: TimeOfDay, interval: i64, token: &str) -> Reminder {
        let mut r = Reminder::new(ID::default());
        r.name = "Drink water".into();
        r.message = "Stay hydrated".into();
        r.start = start;
        r.end = end;
        r.interval_minutes = interval;
        r.fcm_token = Some(token.into());
        r
    }

    async fn tick(ctx: &HealthContext, now: i64) -> TickReport {
        execute(SendDueRemindersUseCase, &at(ctx, now))
            .await
            .expect("Tick to succeed")
    }

    #[actix_web::test]
    async fn sends_due_reminder_with_payload() {
        let TestContext { ctx, push, .. } = setup();
        let r = reminder(TimeOfDay::new(8, 0), TimeOfDay::new(8, 0), 60, "device");
        ctx.repos.reminders.insert(&r).await.unwrap();

        let report = tick(&ctx, ts(8, 0)).await;
        assert_eq!(report.sent, 1);

        let sent = push.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].token, "device");
        assert_eq!(sent[0].title, "Drink water");
        assert_eq!(sent[0].body, "Stay hydrated");
        assert_eq!(sent[0].data["deeplink"], "notifications");
        assert_eq!(sent[0].data["reminderId"], r.id.to_string());
        assert_eq!(sent[0].android_channel_id, ctx.config.push_android_channel_id);

        let stored = ctx.repos.reminders.find(&r.id).await.unwrap();
        assert_eq!(
            stored.last_fired,
            Some(LastFiredMarker::Bucket(MinuteBucket::from_timestamp(
                ts(8, 0)
            )))
        );
        assert_eq!(stored.last_sent_at, Some(ts(8, 0)));
    }

    #[actix_web::test]
    async fn uses_default_texts_for_blank_reminder() {
        let TestContext { ctx, push, .. } = setup();
        let mut r = reminder(TimeOfDay::new(8, 0), TimeOfDay::new(8, 0), 60, "device");
        r.name = "".into();
        r.message = " ".into();
        ctx.repos.reminders.insert(&r).await.unwrap();

        tick(&ctx, ts(8, 0)).await;
        let sent = push.sent();
        assert_eq!(sent[0].title, ctx.config.default_reminder_title);
        assert_eq!(sent[0].body, ctx.config.default_reminder_body);
    }

    #[actix_web::test]
    async fn running_twice_in_the_same_minute_sends_once() {
        let TestContext { ctx, push, .. } = setup();
        let r = reminder(TimeOfDay::new(8, 0), TimeOfDay::new(20, 0), 30, "device");
        ctx.repos.reminders.insert(&r).await.unwrap();

        let first = tick(&ctx, ts(9, 30)).await;
        let second = tick(&ctx, ts(9, 30) + 45 * 1000).await;
        assert_eq!(first.sent, 1);
        assert_eq!(second.sent, 0);
        assert_eq!(second.already_sent, 1);
        assert_eq!(push.sent().len(), 1);
    }

    #[actix_web::test]
    async fn single_fire_window_fires_once_a_day() {
        let TestContext { ctx, push, .. } = setup();
        let r = reminder(TimeOfDay::new(8, 0), TimeOfDay::new(8, 0), 5, "device");
        ctx.repos.reminders.insert(&r).await.unwrap();

        for now in &[ts(7, 59), ts(8, 0), ts(8, 1), ts(8, 5)] {
            tick(&ctx, *now).await;
        }
        assert_eq!(push.sent().len(), 1);
    }

    #[actix_web::test]
    async fn overnight_window_fires_at_expected_minutes() {
        let TestContext { ctx, push, .. } = setup();
        let r = reminder(TimeOfDay::new(22, 0), TimeOfDay::new(6, 0), 120, "device");
        ctx.repos.reminders.insert(&r).await.unwrap();

        let day_start = ts(0, 0);
        let mut fired_at = Vec::new();
        for minute in 0..24 * 60 {
            let now = day_start + minute * 60 * 1000;
            let before = push.sent().len();
            tick(&ctx, now).await;
            if push.sent().len() > before {
                fired_at.push(minute);
            }
        }
        assert_eq!(fired_at, vec![0, 120, 240, 360, 1320]);
    }

    #[actix_web::test]
    async fn failing_reminder_does_not_block_the_others() {
        let TestContext { ctx, push, .. } = setup();
        let failing = reminder(TimeOfDay::new(8, 0), TimeOfDay::new(8, 0), 60, "stale");
        let ok = reminder(TimeOfDay::new(8, 0), TimeOfDay::new(8, 0), 60, "device");
        let mut misconfigured = reminder(TimeOfDay::new(8, 0), TimeOfDay::new(8, 0), 60, "x");
        misconfigured.fcm_token = None;
        for r in &[&failing, &ok, &misconfigured] {
            ctx.repos.reminders.insert(r).await.unwrap();
        }
        push.fail_for_token("stale");

        let report = tick(&ctx, ts(8, 0)).await;
        assert_eq!(report.sent, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(push.sent()[0].token, "device");

        // The failed one is not marked and can be retried
        let stored = ctx.repos.reminders.find(&failing.id).await.unwrap();
        assert_eq!(stored.last_fired, None);
        let stored = ctx.repos.reminders.find(&ok.id).await.unwrap();
        assert!(stored.last_fired.is_some());
    }

    #[actix_web::test]
    async fn store_failure_aborts_the_tick() {
        let TestContext {
            ctx,
            push,
            reminders,
        } = setup();
        let r = reminder(TimeOfDay::new(8, 0), TimeOfDay::new(8, 0), 60, "device");
        ctx.repos.reminders.insert(&r).await.unwrap();
        reminders.set_fail_queries(true);

        let res = execute(SendDueRemindersUseCase, &at(&ctx, ts(8, 0))).await;
        assert!(matches!(res, Err(UseCaseError::StorageError)));
        assert!(push.sent().is_empty());

        // Next tick in the same minute heals
        reminders.set_fail_queries(false);
        assert_eq!(tick(&ctx, ts(8, 0) + 10 * 1000).await.sent, 1);
    }

    #[actix_web::test]
    async fn failing_to_record_markers_keeps_the_tick_successful() {
        let TestContext {
            ctx,
            push,
            reminders,
        } = setup();
        let a = reminder(TimeOfDay::new(8, 0), TimeOfDay::new(9, 0), 60, "device-a");
        let b = reminder(TimeOfDay::new(8, 0), TimeOfDay::new(9, 0), 60, "device-b");
        for r in &[&a, &b] {
            ctx.repos.reminders.insert(r).await.unwrap();
        }
        reminders.set_fail_marks(true);

        let report = execute(SendDueRemindersUseCase, &at(&ctx, ts(8, 0)))
            .await
            .expect("Tick to succeed even though markers were not recorded");
        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(push.sent().len(), 2);
        assert_eq!(ctx.repos.reminders.find(&a.id).await.unwrap().last_fired, None);

        // Without markers the next tick in the same minute sends again, but only once
        reminders.set_fail_marks(false);
        assert_eq!(tick(&ctx, ts(8, 0) + 20 * 1000).await.sent, 2);
        assert_eq!(tick(&ctx, ts(8, 0) + 40 * 1000).await.sent, 0);
        assert_eq!(push.sent().len(), 4);
    }

    #[actix_web::test]
    async fn respects_legacy_local_minute_marker() {
        let TestContext { ctx, push, .. } = setup();
        let mut r = reminder(TimeOfDay::new(13, 30), TimeOfDay::new(13, 30), 60, "device");
        r.tz_offset_minutes = 330;
        r.last_fired = Some(LastFiredMarker::LocalMinute("2021-03-10 13:30".into()));
        ctx.repos.reminders.insert(&r).await.unwrap();

        // 13:30 in UTC+05:30 is 08:00 UTC
        let report = tick(&ctx, ts(8, 0)).await;
        assert_eq!(report.already_sent, 1);
        assert!(push.sent().is_empty());
    }
}
