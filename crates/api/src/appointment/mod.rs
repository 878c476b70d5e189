mod emails;
pub mod send_appointment_reminders;
