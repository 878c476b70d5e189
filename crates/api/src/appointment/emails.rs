use chrono::{TimeZone, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use smart_health_domain::{Appointment, User};
use smart_health_infra::EmailMessage;
use std::borrow::Cow;

fn format_date_time(ts: i64) -> String {
    match Utc.timestamp_millis_opt(ts).single() {
        Some(date_time) => date_time.format("%A, %B %-d, %Y at %H:%M UTC").to_string(),
        None => ts.to_string(),
    }
}

fn details(appointment: &Appointment, counterpart: &str, extra: &str) -> String {
    let reason = match &appointment.reason {
        Some(reason) if !reason.trim().is_empty() => {
            format!("<p><strong>Reason:</strong> {}</p>", encode_text(reason))
        }
        _ => String::new(),
    };
    format!(
        r#"<div style="background-color: #f5f5f5; padding: 15px; border-radius: 5px; margin: 20px 0;">
  <p><strong>Date & Time:</strong> {}</p>
  {}
  <p><strong>Appointment ID:</strong> {}</p>
  {}{}
</div>"#,
        format_date_time(appointment.date_time),
        counterpart,
        appointment.id,
        reason,
        extra
    )
}

fn join_button(meeting_link: &str) -> String {
    format!(
        r#"<a href="{0}" style="display: inline-block; background-color: #4285F4; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; margin: 15px 0;">Join Video Consultation</a>
<p>If the button doesn't work, copy and paste this link:</p>
<p>{1}</p>"#,
        encode_double_quoted_attribute(meeting_link),
        encode_text(meeting_link)
    )
}

pub fn patient_email(
    appointment: &Appointment,
    doctor: &User,
    patient: &User,
    meeting_link: &str,
) -> EmailMessage {
    let doctor_name = encode_text(&doctor.name);
    let greeting: Cow<str> = if patient.name.trim().is_empty() {
        Cow::Borrowed("there")
    } else {
        encode_text(&patient.name)
    };
    let html_body = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
<h2>Your Upcoming Appointment</h2>
<p>Hello {},</p>
<p>This is a reminder for your upcoming appointment with Dr. {}.</p>
{}
<p>Click the button below to join your video consultation at the scheduled time:</p>
{}
<p>Best regards,<br>The Smart Health Team</p>
</div>"#,
        greeting,
        doctor_name,
        details(
            appointment,
            &format!("<p><strong>Doctor:</strong> Dr. {}</p>", doctor_name),
            ""
        ),
        join_button(meeting_link)
    );

    EmailMessage {
        to: patient.email.clone(),
        subject: format!("Your Upcoming Appointment with Dr. {}", doctor.name),
        html_body,
    }
}

pub fn doctor_email(
    appointment: &Appointment,
    doctor: &User,
    patient: &User,
    meeting_link: &str,
) -> EmailMessage {
    let phone = match &patient.contact {
        Some(contact) if !contact.trim().is_empty() => {
            format!("<p><strong>Patient Phone:</strong> {}</p>", encode_text(contact))
        }
        _ => String::new(),
    };
    let doctor_name = encode_text(&doctor.name);
    let patient_name = encode_text(&patient.name);
    let html_body = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
<h2>Upcoming Patient Appointment</h2>
<p>Hello Dr. {},</p>
<p>This is a reminder for your appointment with {}.</p>
{}
<p>Click below to join the video consultation:</p>
{}
<p>Best regards,<br>The Smart Health Team</p>
</div>"#,
        doctor_name,
        patient_name,
        details(
            appointment,
            &format!("<p><strong>Patient:</strong> {}</p>", patient_name),
            &phone
        ),
        join_button(meeting_link)
    );

    EmailMessage {
        to: doctor.email.clone(),
        subject: format!("Upcoming Appointment with {}", patient.name),
        html_body,
    }
}
