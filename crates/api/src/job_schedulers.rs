use crate::{
    appointment::send_appointment_reminders::SendAppointmentRemindersUseCase,
    reminder::send_due_reminders::SendDueRemindersUseCase, shared::usecase::execute,
};
use actix_web::rt::time::{interval, sleep_until, Instant};
use smart_health_infra::HealthContext;
use std::time::Duration;
use tracing::info;

pub fn get_start_delay(now_ts: usize, secs_before_min: usize) -> usize {
    let secs_to_next_minute = 60 - (now_ts / 1000) % 60;
    if secs_to_next_minute > secs_before_min {
        secs_to_next_minute - secs_before_min
    } else {
        secs_to_next_minute + (60 - secs_before_min)
    }
}

/// Runs the reminder and appointment passes at the start of every minute.
/// The passes of a tick are independent tasks, so a slow tick may overlap
/// with the next one.
pub fn start_minutely_job_scheduler(ctx: HealthContext) {
    actix_web::rt::spawn(async move {
        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now.max(0) as usize, 0);
        let start = Instant::now() + Duration::from_secs(secs_to_next_run as u64);

        sleep_until(start).await;
        let mut minutely_interval = interval(Duration::from_secs(60));
        loop {
            minutely_interval.tick().await;
            actix_web::rt::spawn(send_due_reminders(ctx.clone()));
            actix_web::rt::spawn(send_appointment_reminders(ctx.clone()));
        }
    });
}

async fn send_due_reminders(ctx: HealthContext) {
    // Errors are logged by the executor and the next tick starts over
    if let Ok(report) = execute(SendDueRemindersUseCase, &ctx).await {
        info!(
            sent = report.sent,
            failed = report.failed,
            skipped = report.skipped,
            already_sent = report.already_sent,
            "Reminder tick done"
        );
    }
}

async fn send_appointment_reminders(ctx: HealthContext) {
    let _ = execute(SendAppointmentRemindersUseCase, &ctx).await;
}
