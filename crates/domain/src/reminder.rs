use crate::{
    dedup::{LastFiredMarker, MinuteBucket},
    due::is_due,
    local_time::to_local,
    shared::entity::{Entity, ID},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_REMINDER_TITLE: &str = "Reminder";
pub const DEFAULT_REMINDER_BODY: &str = "It's time!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    pub fn total_minutes(&self) -> i64 {
        i64::from(self.hour) * 60 + i64::from(self.minute)
    }

    pub fn is_valid(&self) -> bool {
        self.hour < 24 && self.minute < 60
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ReminderConfigError {
    #[error("Interval must be a positive number of minutes, got: {0}")]
    NonPositiveInterval(i64),
    #[error("Window boundary {0:?} is not a valid time of day")]
    InvalidWindowBoundary(TimeOfDay),
    #[error("Reminder has no delivery target")]
    MissingDeliveryTarget,
}

/// A recurring `Reminder` owned by a user. It fires inside a daily window
/// in the user's local time every `interval_minutes`, starting at `start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reminder {
    pub id: ID,
    pub user_id: ID,
    pub enabled: bool,
    /// Used as the notification title
    pub name: String,
    /// Used as the notification body
    pub message: String,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub interval_minutes: i64,
    /// Minutes the user's clock is ahead of UTC
    pub tz_offset_minutes: i64,
    /// Push token of the device that should be notified
    pub fcm_token: Option<String>,
    pub last_fired: Option<LastFiredMarker>,
    /// Timestamp of the tick that last dispatched this `Reminder`
    pub last_sent_at: Option<i64>,
}

impl Reminder {
    pub fn new(user_id: ID) -> Self {
        Self {
            id: Default::default(),
            user_id,
            enabled: true,
            name: DEFAULT_REMINDER_TITLE.into(),
            message: DEFAULT_REMINDER_BODY.into(),
            start: TimeOfDay::new(8, 0),
            end: TimeOfDay::new(20, 0),
            interval_minutes: 60,
            tz_offset_minutes: 0,
            fcm_token: None,
            last_fired: None,
            last_sent_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ReminderConfigError> {
        if self.interval_minutes <= 0 {
            return Err(ReminderConfigError::NonPositiveInterval(
                self.interval_minutes,
            ));
        }
        for boundary in &[self.start, self.end] {
            if !boundary.is_valid() {
                return Err(ReminderConfigError::InvalidWindowBoundary(*boundary));
            }
        }
        match &self.fcm_token {
            Some(token) if !token.trim().is_empty() => Ok(()),
            _ => Err(ReminderConfigError::MissingDeliveryTarget),
        }
    }

    /// Decides what should happen with this `Reminder` at the given tick
    pub fn evaluate(&self, now_ts: i64) -> ReminderEvaluation {
        if let Err(e) = self.validate() {
            return ReminderEvaluation::Misconfigured(e);
        }

        let local = to_local(now_ts, self.tz_offset_minutes);
        let due = is_due(
            local.minute_of_day,
            self.start.total_minutes(),
            self.end.total_minutes(),
            self.interval_minutes,
        );
        if !due {
            return ReminderEvaluation::NotDue;
        }

        let bucket = MinuteBucket::from_timestamp(now_ts);
        match &self.last_fired {
            Some(marker) if marker.matches(bucket, self.tz_offset_minutes) => {
                ReminderEvaluation::AlreadySent(bucket)
            }
            _ => ReminderEvaluation::Due(bucket),
        }
    }

    /// Records that the occurrence in `bucket` was dispatched at `sent_at`
    pub fn mark_fired(&mut self, bucket: MinuteBucket, sent_at: i64) {
        self.last_fired = Some(bucket.into());
        self.last_sent_at = Some(sent_at);
    }
}

impl Default for Reminder {
    fn default() -> Self {
        Self::new(ID::default())
    }
}

impl Entity for Reminder {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[derive(Debug, PartialEq)]
pub enum ReminderEvaluation {
    /// Not a fire point in the user's local time
    NotDue,
    /// Fire point, and it has not been dispatched yet
    Due(MinuteBucket),
    /// Fire point that has already been dispatched
    AlreadySent(MinuteBucket),
    Misconfigured(ReminderConfigError),
}
