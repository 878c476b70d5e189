mod fcm;
mod inmemory;

use super::DispatchError;
pub use fcm::FcmPushGateway;
pub use inmemory::InMemoryPushGateway;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PushNotification {
    /// Device token
    pub token: String,
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
    /// Android notification channel the notification is shown in
    pub android_channel_id: String,
}

#[async_trait::async_trait]
pub trait IPushGateway: Send + Sync {
    async fn send_push(&self, notification: &PushNotification) -> Result<(), DispatchError>;
}

/// Used when no push credentials are configured, every send fails
pub struct UnconfiguredPushGateway {}

#[async_trait::async_trait]
impl IPushGateway for UnconfiguredPushGateway {
    async fn send_push(&self, _notification: &PushNotification) -> Result<(), DispatchError> {
        Err(DispatchError::new(
            "push-not-configured",
            "No push notification credentials are configured",
        ))
    }
}
