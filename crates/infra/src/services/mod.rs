pub mod email;
mod google_auth;
pub mod google_calendar;
pub mod push;

use std::sync::Arc;
use thiserror::Error;

use crate::Config;
use email::{IEmailGateway, InMemoryEmailGateway, SmtpEmailGateway, UnconfiguredEmailGateway};
use google_calendar::{GoogleMeetProvider, IMeetingProvider};
use push::{FcmPushGateway, IPushGateway, InMemoryPushGateway, UnconfiguredPushGateway};

/// Failure reported by a dispatch channel
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Dispatch failed with code `{code}`: {message}")]
pub struct DispatchError {
    /// Error code given by the channel, or a local code when the channel
    /// could not be reached
    pub code: String,
    pub message: String,
}

impl DispatchError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// External collaborators used to notify users
#[derive(Clone)]
pub struct Services {
    pub push: Arc<dyn IPushGateway>,
    pub email: Arc<dyn IEmailGateway>,
    /// Absent when no meeting provider is configured
    pub meetings: Option<Arc<dyn IMeetingProvider>>,
}

impl Services {
    pub fn create(config: &Config) -> Self {
        let push: Arc<dyn IPushGateway> = match &config.fcm {
            Some(fcm) => Arc::new(FcmPushGateway::new(fcm.clone())),
            None => Arc::new(UnconfiguredPushGateway {}),
        };
        let email: Arc<dyn IEmailGateway> = match &config.smtp {
            Some(smtp) => match SmtpEmailGateway::new(smtp.clone()) {
                Ok(gateway) => Arc::new(gateway),
                Err(e) => {
                    tracing::error!("Invalid SMTP configuration, emails are disabled: {:?}", e);
                    Arc::new(UnconfiguredEmailGateway {})
                }
            },
            None => Arc::new(UnconfiguredEmailGateway {}),
        };
        let meetings = config.google.clone().map(|google| {
            Arc::new(GoogleMeetProvider::new(google, config.meeting_duration_minutes))
                as Arc<dyn IMeetingProvider>
        });

        Self {
            push,
            email,
            meetings,
        }
    }

    pub fn create_inmemory() -> Self {
        Self {
            push: Arc::new(InMemoryPushGateway::new()),
            email: Arc::new(InMemoryEmailGateway::new()),
            meetings: None,
        }
    }
}
