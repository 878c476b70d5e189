use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};

/// A one-shot consultation between a doctor and a patient. Both parties are
/// emailed once shortly before `date_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: ID,
    pub doctor_id: ID,
    pub patient_id: ID,
    /// Scheduled start as a timestamp in millis
    pub date_time: i64,
    pub reason: Option<String>,
    /// Video meeting link, created on demand when the reminder is sent
    pub meeting_link: Option<String>,
    /// Identifier of the event in the external calendar holding the meeting
    pub external_event_id: Option<String>,
    /// Only ever goes from `false` to `true`
    pub reminder_sent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentReminderState {
    /// Reminder not sent and the appointment is not inside the firing window
    Pending,
    /// Inside the firing window and the meeting link is known
    Due,
    /// Inside the firing window, but a meeting link must be created first
    LinkResolving,
    Sent,
}

impl Appointment {
    pub fn new(doctor_id: ID, patient_id: ID, date_time: i64) -> Self {
        Self {
            id: Default::default(),
            doctor_id,
            patient_id,
            date_time,
            reason: None,
            meeting_link: None,
            external_event_id: None,
            reminder_sent: false,
        }
    }

    /// Whether the appointment starts within `[now, now + lookahead]`
    pub fn starts_within(&self, now_ts: i64, lookahead_millis: i64) -> bool {
        self.date_time >= now_ts && self.date_time <= now_ts.saturating_add(lookahead_millis)
    }

    pub fn reminder_state(&self, now_ts: i64, lookahead_millis: i64) -> AppointmentReminderState {
        if self.reminder_sent {
            return AppointmentReminderState::Sent;
        }
        if !self.starts_within(now_ts, lookahead_millis) {
            return AppointmentReminderState::Pending;
        }
        if self.has_meeting_link() {
            AppointmentReminderState::Due
        } else {
            AppointmentReminderState::LinkResolving
        }
    }

    pub fn has_meeting_link(&self) -> bool {
        matches!(&self.meeting_link, Some(link) if !link.trim().is_empty())
    }

    pub fn set_meeting(&mut self, link: String, external_event_id: Option<String>) {
        self.meeting_link = Some(link);
        self.external_event_id = external_event_id;
    }

    pub fn mark_reminder_sent(&mut self) {
        self.reminder_sent = true;
    }
}

impl Entity for Appointment {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const MINUTE: i64 = 1000 * 60;

    #[test]
    fn moves_through_reminder_states() {
        let now = 1_000 * MINUTE;
        let mut appointment = Appointment::new(ID::default(), ID::default(), now + 5 * MINUTE);

        assert_eq!(
            appointment.reminder_state(now, MINUTE),
            AppointmentReminderState::Pending
        );
        let later = now + 4 * MINUTE;
        assert_eq!(
            appointment.reminder_state(later, MINUTE),
            AppointmentReminderState::LinkResolving
        );

        appointment.set_meeting("https://meet.example.com/abc".into(), Some("evt".into()));
        assert_eq!(
            appointment.reminder_state(later, MINUTE),
            AppointmentReminderState::Due
        );

        appointment.mark_reminder_sent();
        assert_eq!(
            appointment.reminder_state(later, MINUTE),
            AppointmentReminderState::Sent
        );
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let now = 1_000 * MINUTE;
        let appointment = Appointment::new(ID::default(), ID::default(), now + MINUTE);
        assert!(appointment.starts_within(now, MINUTE));
        assert!(appointment.starts_within(now + MINUTE, MINUTE));
        assert!(!appointment.starts_within(now + MINUTE + 1, MINUTE));
        assert!(!appointment.starts_within(now - 1, MINUTE));
    }

    #[test]
    fn blank_link_is_not_a_link() {
        let mut appointment = Appointment::new(ID::default(), ID::default(), 0);
        appointment.meeting_link = Some(" ".into());
        assert!(!appointment.has_meeting_link());
    }
}
