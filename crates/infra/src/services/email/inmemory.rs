use super::{EmailMessage, IEmailGateway};
use crate::services::DispatchError;
use std::collections::HashSet;
use std::sync::Mutex;

/// Records every email instead of sending it. Addresses registered
/// with `fail_for_address` are rejected.
pub struct InMemoryEmailGateway {
    sent: Mutex<Vec<EmailMessage>>,
    failing_addresses: Mutex<HashSet<String>>,
}

impl InMemoryEmailGateway {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(vec![]),
            failing_addresses: Mutex::new(HashSet::new()),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_for_address(&self, address: &str) {
        self.failing_addresses
            .lock()
            .unwrap()
            .insert(address.to_string());
    }
}

impl Default for InMemoryEmailGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IEmailGateway for InMemoryEmailGateway {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), DispatchError> {
        if self.failing_addresses.lock().unwrap().contains(&email.to) {
            return Err(DispatchError::new(
                "550",
                format!("Mailbox {} unavailable", email.to),
            ));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}
