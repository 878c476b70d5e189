mod base;
mod status;
mod user;

pub(crate) use base::BaseClient;
pub use reqwest::StatusCode;
pub use base::{APIError, APIErrorVariant, APIResponse};
pub use smart_health_api_structs::dtos::UserDTO as User;
pub use smart_health_domain::ID;
use status::StatusClient;
use std::sync::Arc;
use user::UserClient;

/// Smart Health Scheduler SDK
///
/// Typed client for the admin and status endpoints of the scheduler server.
#[derive(Clone)]
pub struct HealthSDK {
    pub status: StatusClient,
    pub user: UserClient,
}

impl HealthSDK {
    /// `address` is the base url including the `/api/v1` prefix
    pub fn new<T: Into<String>>(address: String, admin_key: T) -> Self {
        let mut base = BaseClient::new(address);
        base.set_admin_key(admin_key.into());
        let base = Arc::new(base);
        let status = StatusClient::new(base.clone());
        let user = UserClient::new(base);

        Self { status, user }
    }
}
