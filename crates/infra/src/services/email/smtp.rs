use super::{EmailMessage, IEmailGateway};
use crate::{config::SmtpConfig, services::DispatchError};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::error;

/// Sends emails through an SMTP relay using STARTTLS
pub struct SmtpEmailGateway {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailGateway {
    pub fn new(config: SmtpConfig) -> anyhow::Result<Self> {
        let from: Mailbox = format!("\"{}\" <{}>", config.from_name, config.user).parse()?;
        let creds = Credentials::new(config.user, config.password);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self { mailer, from })
    }
}

#[async_trait::async_trait]
impl IEmailGateway for SmtpEmailGateway {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), DispatchError> {
        let to: Mailbox = email.to.parse().map_err(|e| {
            DispatchError::new("invalid-address", format!("Invalid to: {}", e))
        })?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(email.html_body.clone())
            .map_err(|e| DispatchError::new("invalid-message", e.to_string()))?;

        self.mailer.send(message).await.map_err(|e| {
            error!("SMTP send error to {}. Error message: {:?}", email.to, e);
            let code = e
                .status()
                .map(|code| code.to_string())
                .unwrap_or_else(|| "smtp".into());
            DispatchError::new(code, e.to_string())
        })?;

        Ok(())
    }
}
