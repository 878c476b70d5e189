mod calendar_api;

use super::{google_auth::GoogleTokenProvider, DispatchError};
use crate::config::GoogleConfig;
use smart_health_domain::ID;
use calendar_api::{
    ConferenceCreateRequest, ConferenceData, ConferenceSolutionKey, GoogleAttendee,
    GoogleCalendarEventAttributes, GoogleCalendarEventDateTime, GoogleCalendarRestApi,
    GoogleReminderOverride, GoogleReminders,
};

/// What is needed to set up a video meeting for an `Appointment`
#[derive(Debug, Clone)]
pub struct MeetingRequest {
    /// Identifies the conference request, so it has to be unique per
    /// `Appointment`
    pub appointment_id: ID,
    pub start_ts: i64,
    pub summary: String,
    pub description: String,
    pub attendee_emails: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedMeeting {
    pub link: String,
    pub external_event_id: Option<String>,
}

#[async_trait::async_trait]
pub trait IMeetingProvider: Send + Sync {
    async fn create_meeting(&self, req: &MeetingRequest) -> Result<CreatedMeeting, DispatchError>;
}

// https://developers.google.com/calendar/api/guides/create-events#conferencing
/// Creates events with a Google Meet conference in the primary calendar of
/// the configured google account and invites the attendees.
pub struct GoogleMeetProvider {
    tokens: GoogleTokenProvider,
    meeting_duration_minutes: i64,
}

impl GoogleMeetProvider {
    pub fn new(config: GoogleConfig, meeting_duration_minutes: i64) -> Self {
        Self {
            tokens: GoogleTokenProvider::new(config),
            meeting_duration_minutes,
        }
    }

    fn event_attributes(&self, req: &MeetingRequest) -> GoogleCalendarEventAttributes {
        let end_ts = req
            .start_ts
            .saturating_add(self.meeting_duration_minutes.saturating_mul(60 * 1000));
        GoogleCalendarEventAttributes {
            summary: req.summary.clone(),
            description: req.description.clone(),
            start: GoogleCalendarEventDateTime::new(req.start_ts),
            end: GoogleCalendarEventDateTime::new(end_ts),
            attendees: req
                .attendee_emails
                .iter()
                .map(|email| GoogleAttendee {
                    email: email.clone(),
                })
                .collect(),
            conference_data: ConferenceData {
                create_request: ConferenceCreateRequest {
                    request_id: format!("meet-{}", req.appointment_id),
                    conference_solution_key: ConferenceSolutionKey {
                        r#type: "hangoutsMeet".into(),
                    },
                },
            },
            reminders: GoogleReminders {
                use_default: false,
                overrides: vec![
                    GoogleReminderOverride {
                        method: "email".into(),
                        minutes: 30,
                    },
                    GoogleReminderOverride {
                        method: "popup".into(),
                        minutes: 10,
                    },
                ],
            },
        }
    }
}

#[async_trait::async_trait]
impl IMeetingProvider for GoogleMeetProvider {
    async fn create_meeting(&self, req: &MeetingRequest) -> Result<CreatedMeeting, DispatchError> {
        let access_token = self.tokens.get_access_token().await?;
        let api = GoogleCalendarRestApi::new(access_token);
        let event = api
            .insert("primary", &self.event_attributes(req))
            .await
            .map_err(|_| {
                DispatchError::new("calendar-insert", "Unable to create calendar event")
            })?;

        match event.meeting_link() {
            Some(link) => Ok(CreatedMeeting {
                link,
                external_event_id: Some(event.id),
            }),
            None => Err(DispatchError::new(
                "no-meeting-link",
                format!("Calendar event {} has no meeting link", event.id),
            )),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn provider(meeting_duration_minutes: i64) -> GoogleMeetProvider {
        GoogleMeetProvider::new(
            GoogleConfig {
                client_id: "id".into(),
                client_secret: "secret".into(),
                refresh_token: "refresh".into(),
            },
            meeting_duration_minutes,
        )
    }

    fn request(start_ts: i64) -> MeetingRequest {
        MeetingRequest {
            appointment_id: ID::default(),
            start_ts,
            summary: "Appointment".into(),
            description: "Video consultation".into(),
            attendee_emails: vec!["doc@example.com".into(), "pat@example.com".into()],
        }
    }

    #[test]
    fn builds_event_with_meet_conference_and_reminders() {
        let provider = provider(60);
        let req = MeetingRequest {
            appointment_id: ID::default(),
            start_ts: 0,
            summary: "Appointment".into(),
            description: "Video consultation".into(),
            attendee_emails: vec!["doc@example.com".into(), "pat@example.com".into()],
        };
        let json = serde_json::to_value(provider.event_attributes(&req)).unwrap();
        assert_eq!(json["start"]["dateTime"], "1970-01-01T00:00:00+00:00");
        assert_eq!(json["end"]["dateTime"], "1970-01-01T01:00:00+00:00");
        assert_eq!(json["attendees"][1]["email"], "pat@example.com");
        assert_eq!(
            json["conferenceData"]["createRequest"]["conferenceSolutionKey"]["type"],
            "hangoutsMeet"
        );
        assert_eq!(json["reminders"]["useDefault"], false);
        assert_eq!(json["reminders"]["overrides"][0]["minutes"], 30);
        assert_eq!(json["reminders"]["overrides"][1]["method"], "popup");
    }

    #[test]
    fn appointments_in_the_same_slot_get_distinct_conference_requests() {
        let provider = provider(30);
        let a = request(1_700_000_000_000);
        let b = request(1_700_000_000_000);
        let a_json = serde_json::to_value(provider.event_attributes(&a)).unwrap();
        let b_json = serde_json::to_value(provider.event_attributes(&b)).unwrap();
        let a_id = &a_json["conferenceData"]["createRequest"]["requestId"];
        let b_id = &b_json["conferenceData"]["createRequest"]["requestId"];
        assert_eq!(a_id, &format!("meet-{}", a.appointment_id));
        assert_ne!(a_id, b_id);
    }

    #[test]
    fn huge_meeting_duration_does_not_overflow() {
        let provider = provider(i64::MAX);
        let attributes = provider.event_attributes(&request(1_000));
        let json = serde_json::to_value(attributes).unwrap();
        assert_eq!(json["start"]["dateTime"], "1970-01-01T00:00:01+00:00");
    }
}
