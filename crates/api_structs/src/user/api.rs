use crate::dtos::UserDTO;
use serde::{Deserialize, Serialize};
use smart_health_domain::User;

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub message: String,
    pub user: UserDTO,
}

impl UserResponse {
    pub fn new(message: String, user: User) -> Self {
        Self {
            message,
            user: UserDTO::new(user),
        }
    }
}

pub mod disable_user {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        #[serde(default)]
        pub user_email: Option<String>,
    }

    pub type APIResponse = UserResponse;
}

pub mod enable_user {
    use super::*;

    pub use super::disable_user::RequestBody;

    pub type APIResponse = UserResponse;
}
