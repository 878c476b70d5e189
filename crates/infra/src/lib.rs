mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, FcmConfig, GoogleConfig, SmtpConfig};
pub use repos::*;
pub use services::email::{
    EmailMessage, IEmailGateway, InMemoryEmailGateway, SmtpEmailGateway, UnconfiguredEmailGateway,
};
pub use services::google_calendar::{
    CreatedMeeting, GoogleMeetProvider, IMeetingProvider, MeetingRequest,
};
pub use services::push::{
    FcmPushGateway, IPushGateway, InMemoryPushGateway, PushNotification, UnconfiguredPushGateway,
};
pub use services::{DispatchError, Services};
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys};
use tracing::warn;

#[derive(Clone)]
pub struct HealthContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub services: Services,
}

struct ContextParams {
    pub postgres_connection_string: Option<String>,
}

impl HealthContext {
    async fn create(params: ContextParams) -> anyhow::Result<Self> {
        let config = Config::new();
        let repos = match params.postgres_connection_string {
            Some(connection_string) => Repos::create_postgres(&connection_string).await?,
            None => {
                warn!("DATABASE_URL is not set. Falling back to in-memory storage.");
                Repos::create_inmemory()
            }
        };
        let services = Services::create(&config);
        Ok(Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            services,
        })
    }

    /// Context with in-memory storage and recording gateways, used in tests
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            services: Services::create_inmemory(),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<HealthContext> {
    HealthContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string(),
    })
    .await
}

fn get_psql_connection_string() -> Option<String> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .ok()
        .filter(|s| !s.trim().is_empty())
}
