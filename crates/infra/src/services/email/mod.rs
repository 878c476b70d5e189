mod inmemory;
mod smtp;

use super::DispatchError;
pub use inmemory::InMemoryEmailGateway;
pub use smtp::SmtpEmailGateway;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait::async_trait]
pub trait IEmailGateway: Send + Sync {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), DispatchError>;
}

/// Used when no SMTP credentials are configured, every send fails
pub struct UnconfiguredEmailGateway {}

#[async_trait::async_trait]
impl IEmailGateway for UnconfiguredEmailGateway {
    async fn send_email(&self, _email: &EmailMessage) -> Result<(), DispatchError> {
        Err(DispatchError::new(
            "email-not-configured",
            "No SMTP credentials are configured",
        ))
    }
}
