use crate::shared::usecase::{execute, UseCase};
use crate::{error::HealthError, shared::auth::protect_admin_route};
use actix_web::{web, HttpRequest, HttpResponse};
use smart_health_api_structs::disable_user::{APIResponse, RequestBody};
use smart_health_domain::User;
use smart_health_infra::HealthContext;

async fn set_user_disabled(
    http_req: HttpRequest,
    body: RequestBody,
    ctx: &HealthContext,
    disabled: bool,
) -> Result<HttpResponse, HealthError> {
    protect_admin_route(&http_req, ctx)?;

    let user_email = match body.user_email {
        Some(email) if !email.trim().is_empty() => email,
        _ => {
            return Err(HealthError::BadClientData(
                "User email is required".into(),
            ))
        }
    };

    let usecase = SetUserDisabledUseCase {
        user_email,
        disabled,
    };
    execute(usecase, ctx)
        .await
        .map(|user| {
            let action = if disabled { "disabled" } else { "enabled" };
            let message = format!("User {} has been {} successfully", user.email, action);
            HttpResponse::Ok().json(APIResponse::new(message, user))
        })
        .map_err(HealthError::from)
}

pub async fn disable_user_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<HealthContext>,
) -> Result<HttpResponse, HealthError> {
    set_user_disabled(http_req, body.into_inner(), &ctx, true).await
}

pub async fn enable_user_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<HealthContext>,
) -> Result<HttpResponse, HealthError> {
    set_user_disabled(http_req, body.into_inner(), &ctx, false).await
}

#[derive(Debug)]
pub struct SetUserDisabledUseCase {
    pub user_email: String,
    pub disabled: bool,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
    UserNotFound(String),
}

impl From<UseCaseError> for HealthError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
            UseCaseError::UserNotFound(email) => {
                Self::NotFound(format!("A user with email {} was not found", email))
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SetUserDisabledUseCase {
    type Response = User;

    type Errors = UseCaseError;

    const NAME: &'static str = "SetUserDisabled";

    async fn execute(&mut self, ctx: &HealthContext) -> Result<Self::Response, Self::Errors> {
        let mut user = match ctx.repos.users.find_by_email(&self.user_email).await {
            Some(user) => user,
            None => return Err(UseCaseError::UserNotFound(self.user_email.clone())),
        };

        user.disabled = self.disabled;
        ctx.repos
            .users
            .save(&user)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn toggles_disabled_flag() {
        let ctx = HealthContext::create_inmemory();
        let user = User::new("Ada", "ada@example.com");
        ctx.repos.users.insert(&user).await.unwrap();

        let usecase = SetUserDisabledUseCase {
            user_email: "ada@example.com".into(),
            disabled: true,
        };
        let res = execute(usecase, &ctx).await.unwrap();
        assert!(res.disabled);
        assert!(ctx.repos.users.find(&user.id).await.unwrap().disabled);

        let usecase = SetUserDisabledUseCase {
            user_email: "ada@example.com".into(),
            disabled: false,
        };
        execute(usecase, &ctx).await.unwrap();
        assert!(!ctx.repos.users.find(&user.id).await.unwrap().disabled);
    }

    #[actix_web::test]
    async fn rejects_unknown_user() {
        let ctx = HealthContext::create_inmemory();
        let usecase = SetUserDisabledUseCase {
            user_email: "nobody@example.com".into(),
            disabled: true,
        };
        let res = execute(usecase, &ctx).await;
        assert!(matches!(res, Err(UseCaseError::UserNotFound(_))));
    }
}
