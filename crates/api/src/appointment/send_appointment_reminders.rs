use super::emails::{doctor_email, patient_email};
use crate::shared::usecase::UseCase;
use futures::future::join_all;
use smart_health_domain::{Appointment, AppointmentReminderState, User};
use smart_health_infra::{HealthContext, MeetingRequest};
use tracing::{error, info, warn};

/// Emails the doctor and the patient of every `Appointment` starting within
/// the configured lookahead that has not been reminded about yet.
#[derive(Debug)]
pub struct SendAppointmentRemindersUseCase;

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

async fn resolve_meeting_link(
    ctx: &HealthContext,
    appointment: &Appointment,
    doctor: &User,
    patient: &User,
) -> String {
    if appointment.has_meeting_link() {
        if let Some(link) = &appointment.meeting_link {
            return link.clone();
        }
    }

    let provider = match &ctx.services.meetings {
        Some(provider) => provider,
        None => return ctx.config.fallback_meeting_link.clone(),
    };

    let req = MeetingRequest {
        appointment_id: appointment.id.clone(),
        start_ts: appointment.date_time,
        summary: format!("Appointment: {} with Dr. {}", patient.name, doctor.name),
        description: appointment
            .reason
            .clone()
            .unwrap_or_else(|| "Teleconsultation".into()),
        attendee_emails: vec![doctor.email.clone(), patient.email.clone()],
    };
    match provider.create_meeting(&req).await {
        Ok(meeting) => {
            info!(appointment_id = %appointment.id, "Created meeting link");
            if let Err(e) = ctx
                .repos
                .appointments
                .set_meeting(
                    &appointment.id,
                    &meeting.link,
                    meeting.external_event_id.as_deref(),
                )
                .await
            {
                error!(
                    appointment_id = %appointment.id,
                    "Unable to store meeting link: {:?}", e
                );
            }
            meeting.link
        }
        Err(e) => {
            warn!(
                appointment_id = %appointment.id,
                code = %e.code,
                "Unable to create meeting, using the fallback link: {}",
                e.message
            );
            ctx.config.fallback_meeting_link.clone()
        }
    }
}

/// Returns whether the reminder of this `Appointment` was sent and recorded
async fn send_reminder(ctx: &HealthContext, appointment: &Appointment, now: i64) -> bool {
    let lookahead = ctx.config.appointment_reminder_lookahead;
    match appointment.reminder_state(now, lookahead) {
        AppointmentReminderState::Pending | AppointmentReminderState::Sent => return false,
        AppointmentReminderState::Due | AppointmentReminderState::LinkResolving => (),
    }

    let (doctor, patient) = futures::join!(
        ctx.repos.users.find(&appointment.doctor_id),
        ctx.repos.users.find(&appointment.patient_id)
    );
    let (doctor, patient) = match (doctor, patient) {
        (Some(doctor), Some(patient)) => (doctor, patient),
        _ => {
            warn!(
                appointment_id = %appointment.id,
                "Skipping appointment with unknown doctor or patient"
            );
            return false;
        }
    };

    let meeting_link = resolve_meeting_link(ctx, appointment, &doctor, &patient).await;

    let patient_mail = patient_email(appointment, &doctor, &patient, &meeting_link);
    let doctor_mail = doctor_email(appointment, &doctor, &patient, &meeting_link);
    let (patient_res, doctor_res) = futures::join!(
        ctx.services.email.send_email(&patient_mail),
        ctx.services.email.send_email(&doctor_mail)
    );
    if let Err(e) = patient_res.and(doctor_res) {
        error!(
            appointment_id = %appointment.id,
            code = %e.code,
            "Unable to send appointment emails: {}",
            e.message
        );
        return false;
    }

    match ctx.repos.appointments.mark_reminder_sent(&appointment.id).await {
        Ok(true) => {
            info!(appointment_id = %appointment.id, "Appointment reminder sent");
            true
        }
        Ok(false) => {
            warn!(
                appointment_id = %appointment.id,
                "Appointment reminder was already recorded as sent"
            );
            false
        }
        Err(e) => {
            error!(
                appointment_id = %appointment.id,
                "Unable to record sent appointment reminder: {:?}", e
            );
            false
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendAppointmentRemindersUseCase {
    /// Number of appointments reminded about in this tick
    type Response = usize;

    type Errors = UseCaseError;

    const NAME: &'static str = "SendAppointmentReminders";

    async fn execute(&mut self, ctx: &HealthContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_timestamp_millis();
        let until = now.saturating_add(ctx.config.appointment_reminder_lookahead);
        let appointments = ctx
            .repos
            .appointments
            .find_unsent_starting_between(now, until)
            .await
            .map_err(|e| {
                error!("Unable to query upcoming appointments: {:?}", e);
                UseCaseError::StorageError
            })?;

        let sent = join_all(appointments.iter().map(|a| send_reminder(ctx, a, now)))
            .await
            .into_iter()
            .filter(|sent| *sent)
            .count();
        info!(
            "Sent {} of {} appointment reminders",
            sent,
            appointments.len()
        );

        Ok(sent)
    }
}
