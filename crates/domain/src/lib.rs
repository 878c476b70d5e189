mod appointment;
mod dedup;
mod due;
mod local_time;
mod reminder;
mod shared;
mod user;

pub use appointment::{Appointment, AppointmentReminderState};
pub use dedup::{LastFiredMarker, MinuteBucket};
pub use due::is_due;
pub use local_time::{normalize, to_local, LocalTime, MINUTES_PER_DAY};
pub use reminder::{
    Reminder, ReminderConfigError, ReminderEvaluation, TimeOfDay, DEFAULT_REMINDER_BODY,
    DEFAULT_REMINDER_TITLE,
};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use user::User;
