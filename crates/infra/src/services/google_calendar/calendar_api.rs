use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCalendarEventDateTime {
    date_time: String,
    time_zone: String,
}

impl GoogleCalendarEventDateTime {
    pub fn new(date_time_millis: i64) -> Self {
        let date_time = Utc
            .timestamp_millis_opt(date_time_millis)
            .single()
            .unwrap_or_default()
            .to_rfc3339();
        Self {
            date_time,
            time_zone: String::from("UTC"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GoogleAttendee {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ConferenceSolutionKey {
    pub r#type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceCreateRequest {
    pub request_id: String,
    pub conference_solution_key: ConferenceSolutionKey,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceData {
    pub create_request: ConferenceCreateRequest,
}

#[derive(Debug, Serialize)]
pub struct GoogleReminderOverride {
    pub method: String,
    pub minutes: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleReminders {
    pub use_default: bool,
    pub overrides: Vec<GoogleReminderOverride>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCalendarEventAttributes {
    pub start: GoogleCalendarEventDateTime,
    pub end: GoogleCalendarEventDateTime,
    pub summary: String,
    pub description: String,
    pub attendees: Vec<GoogleAttendee>,
    pub conference_data: ConferenceData,
    pub reminders: GoogleReminders,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEntryPoint {
    pub entry_point_type: String,
    pub uri: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleConferenceDataResponse {
    #[serde(default)]
    pub entry_points: Vec<GoogleEntryPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCalendarEvent {
    pub id: String,
    #[serde(default)]
    pub hangout_link: Option<String>,
    #[serde(default)]
    pub conference_data: Option<GoogleConferenceDataResponse>,
}

impl GoogleCalendarEvent {
    /// The hangout link, or else the uri of the first video entry point
    pub fn meeting_link(&self) -> Option<String> {
        if let Some(link) = &self.hangout_link {
            return Some(link.clone());
        }
        self.conference_data.as_ref().and_then(|data| {
            data.entry_points
                .iter()
                .find(|e| e.entry_point_type == "video")
                .map(|e| e.uri.clone())
        })
    }
}

pub struct GoogleCalendarRestApi {
    client: Client,
    access_token: String,
}

const GOOGLE_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

impl GoogleCalendarRestApi {
    pub fn new(access_token: String) -> Self {
        let client = Client::new();

        Self {
            client,
            access_token,
        }
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        body: &impl Serialize,
        path: String,
    ) -> anyhow::Result<T> {
        match self
            .client
            .post(&format!("{}/{}", GOOGLE_API_BASE_URL, path))
            .header("authorization", format!("Bearer {}", self.access_token))
            .json(body)
            .send()
            .await
        {
            Ok(res) => {
                let res = res.error_for_status().map_err(|e| {
                    error!(
                        "[Unexpected Response] Google Calendar API POST error. Error message: {:?}",
                        e
                    );
                    anyhow::Error::new(e)
                })?;
                res.json::<T>().await.map_err(|e| {
                    error!(
                        "[Unexpected Response] Google Calendar API POST error. Error message: {:?}",
                        e
                    );
                    anyhow::Error::new(e)
                })
            }
            Err(e) => {
                error!(
                    "[Network Error] Google Calendar API POST error. Error message: {:?}",
                    e
                );
                Err(anyhow::Error::new(e))
            }
        }
    }

    pub async fn insert(
        &self,
        calendar_id: &str,
        body: &GoogleCalendarEventAttributes,
    ) -> Result<GoogleCalendarEvent, ()> {
        self.post(
            body,
            format!(
                "calendars/{}/events?conferenceDataVersion=1&sendUpdates=all",
                calendar_id
            ),
        )
        .await
        .map_err(|e| {
            error!(
                "Failed to insert google calendar event to google calendar id: {}. Error message: {:?}",
                calendar_id, e
            );
        })
    }
}
