use super::{IPushGateway, PushNotification};
use crate::services::DispatchError;
use std::collections::HashSet;
use std::sync::Mutex;

/// Records every notification instead of sending it. Tokens registered
/// with `fail_for_token` are rejected.
pub struct InMemoryPushGateway {
    sent: Mutex<Vec<PushNotification>>,
    failing_tokens: Mutex<HashSet<String>>,
}

impl InMemoryPushGateway {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(vec![]),
            failing_tokens: Mutex::new(HashSet::new()),
        }
    }

    pub fn sent(&self) -> Vec<PushNotification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_for_token(&self, token: &str) {
        self.failing_tokens.lock().unwrap().insert(token.to_string());
    }
}

impl Default for InMemoryPushGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IPushGateway for InMemoryPushGateway {
    async fn send_push(&self, notification: &PushNotification) -> Result<(), DispatchError> {
        if self
            .failing_tokens
            .lock()
            .unwrap()
            .contains(&notification.token)
        {
            return Err(DispatchError::new(
                "messaging/registration-token-not-registered",
                format!("Token {} is not registered", notification.token),
            ));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
