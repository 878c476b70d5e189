use smart_health_domain::{DEFAULT_REMINDER_BODY, DEFAULT_REMINDER_TITLE};
use smart_health_utils::create_random_secret;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Display name used in the `From` header
    pub from_name: String,
}

#[derive(Debug, Clone)]
pub struct FcmConfig {
    pub project_id: String,
    /// OAuth client authorized for the `firebase.messaging` scope
    pub credentials: GoogleConfig,
}

/// OAuth client and refresh token of a google account
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Secret key that has to be provided to use the admin endpoints
    pub admin_api_key: String,
    /// Port for the application to run on
    pub port: usize,
    /// An `Appointment` gets its reminder sent when it starts within this
    /// many millis from the current tick
    pub appointment_reminder_lookahead: i64,
    /// Length in minutes of meetings created for appointments
    pub meeting_duration_minutes: i64,
    /// Link put in appointment emails when no meeting could be created
    pub fallback_meeting_link: String,
    pub default_reminder_title: String,
    pub default_reminder_body: String,
    pub push_android_channel_id: String,
    pub fcm: Option<FcmConfig>,
    pub smtp: Option<SmtpConfig>,
    pub google: Option<GoogleConfig>,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parses the environment variable `name`, falling back to `default` when it
/// is missing or malformed.
fn env_parse<T: FromStr + std::fmt::Display + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(val) => match val.parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    name, val, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    pub fn new() -> Self {
        let admin_api_key = match env_opt("ADMIN_API_KEY") {
            Some(key) => key,
            None => {
                info!("Did not find ADMIN_API_KEY environment variable. Going to create one.");
                let key = create_random_secret(16);
                info!("Secret key for the admin endpoints was generated and set to: {}", key);
                key
            }
        };

        let fcm = match (
            env_opt("FCM_PROJECT_ID"),
            env_opt("FCM_CLIENT_ID"),
            env_opt("FCM_CLIENT_SECRET"),
            env_opt("FCM_REFRESH_TOKEN"),
        ) {
            (Some(project_id), Some(client_id), Some(client_secret), Some(refresh_token)) => {
                Some(FcmConfig {
                    project_id,
                    credentials: GoogleConfig {
                        client_id,
                        client_secret,
                        refresh_token,
                    },
                })
            }
            _ => {
                warn!("FCM_PROJECT_ID or the FCM OAuth credentials are missing. Push notifications are disabled.");
                None
            }
        };

        let smtp = match (env_opt("SMTP_USER"), env_opt("SMTP_PASSWORD")) {
            (Some(user), Some(password)) => Some(SmtpConfig {
                host: env_or("SMTP_HOST", "smtp.gmail.com"),
                port: env_parse("SMTP_PORT", 587),
                user,
                password,
                from_name: env_or("EMAIL_FROM_NAME", "Smart Health"),
            }),
            _ => {
                warn!("SMTP_USER or SMTP_PASSWORD is missing. Appointment emails are disabled.");
                None
            }
        };

        let google = match (
            env_opt("GOOGLE_CLIENT_ID"),
            env_opt("GOOGLE_CLIENT_SECRET"),
            env_opt("GOOGLE_REFRESH_TOKEN"),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => Some(GoogleConfig {
                client_id,
                client_secret,
                refresh_token,
            }),
            _ => {
                info!("Google credentials are missing. Appointments will use the fallback meeting link.");
                None
            }
        };

        let lookahead_secs: i64 = env_parse("APPOINTMENT_REMINDER_LOOKAHEAD_SECS", 60);
        let meeting_duration_minutes: i64 = env_parse("MEETING_DURATION_MINUTES", 60);

        Self {
            admin_api_key,
            port: env_parse("PORT", 5000),
            appointment_reminder_lookahead: lookahead_secs.saturating_mul(1000),
            meeting_duration_minutes,
            fallback_meeting_link: env_or("FALLBACK_MEETING_LINK", "https://meet.google.com/new"),
            default_reminder_title: env_or("DEFAULT_REMINDER_TITLE", DEFAULT_REMINDER_TITLE),
            default_reminder_body: env_or("DEFAULT_REMINDER_BODY", DEFAULT_REMINDER_BODY),
            push_android_channel_id: env_or("PUSH_ANDROID_CHANNEL_ID", "reminder_channel"),
            fcm,
            smtp,
            google,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
