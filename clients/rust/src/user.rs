use crate::{APIResponse, BaseClient};
use reqwest::StatusCode;
use smart_health_api_structs::*;
use std::sync::Arc;

#[derive(Clone)]
pub struct UserClient {
    base: Arc<BaseClient>,
}

impl UserClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn disable(&self, user_email: String) -> APIResponse<disable_user::APIResponse> {
        let body = disable_user::RequestBody {
            user_email: Some(user_email),
        };
        self.base
            .post(body, "user/disable".into(), StatusCode::OK)
            .await
    }

    pub async fn enable(&self, user_email: String) -> APIResponse<enable_user::APIResponse> {
        let body = enable_user::RequestBody {
            user_email: Some(user_email),
        };
        self.base
            .post(body, "user/enable".into(), StatusCode::OK)
            .await
    }
}
