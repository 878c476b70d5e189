use super::{IPushGateway, PushNotification};
use crate::{
    config::FcmConfig,
    services::{google_auth::GoogleTokenProvider, DispatchError},
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;

// https://firebase.google.com/docs/reference/fcm/rest/v1/projects.messages/send
const FCM_API_BASE_URL: &str = "https://fcm.googleapis.com/v1/projects";

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct FcmAndroidNotification<'a> {
    channel_id: &'a str,
}

#[derive(Debug, Serialize)]
struct FcmAndroidConfig<'a> {
    priority: &'a str,
    notification: FcmAndroidNotification<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
    data: &'a HashMap<String, String>,
    android: FcmAndroidConfig<'a>,
}

#[derive(Debug, Serialize)]
struct FcmSendRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Deserialize)]
struct FcmErrorBody {
    status: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FcmErrorResponse {
    error: FcmErrorBody,
}

impl<'a> From<&'a PushNotification> for FcmSendRequest<'a> {
    fn from(n: &'a PushNotification) -> Self {
        Self {
            message: FcmMessage {
                token: &n.token,
                notification: FcmNotification {
                    title: &n.title,
                    body: &n.body,
                },
                data: &n.data,
                android: FcmAndroidConfig {
                    priority: "high",
                    notification: FcmAndroidNotification {
                        channel_id: &n.android_channel_id,
                    },
                },
            },
        }
    }
}

/// Sends push notifications through Firebase Cloud Messaging
pub struct FcmPushGateway {
    client: Client,
    project_id: String,
    tokens: GoogleTokenProvider,
}

impl FcmPushGateway {
    pub fn new(config: FcmConfig) -> Self {
        Self {
            client: Client::new(),
            project_id: config.project_id,
            tokens: GoogleTokenProvider::new(config.credentials),
        }
    }
}

#[async_trait::async_trait]
impl IPushGateway for FcmPushGateway {
    async fn send_push(&self, notification: &PushNotification) -> Result<(), DispatchError> {
        let access_token = self.tokens.get_access_token().await?;
        let body = FcmSendRequest::from(notification);
        let res = self
            .client
            .post(&format!(
                "{}/{}/messages:send",
                FCM_API_BASE_URL, self.project_id
            ))
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("[Network Error] FCM send error. Error message: {:?}", e);
                DispatchError::new("network", e.to_string())
            })?;

        let status = res.status();
        if status.is_success() {
            return Ok(());
        }

        let (code, message) = match res.json::<FcmErrorResponse>().await {
            Ok(err) => (
                err.error.status.unwrap_or_else(|| status.as_u16().to_string()),
                err.error.message.unwrap_or_default(),
            ),
            Err(_) => (status.as_u16().to_string(), "Unexpected response".into()),
        };
        error!(
            "[Unexpected Response] FCM send error. Code: {}, message: {}",
            code, message
        );
        Err(DispatchError::new(code, message))
    }
}
