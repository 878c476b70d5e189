use crate::error::HealthError;
use actix_web::HttpRequest;
use smart_health_infra::HealthContext;

pub const ADMIN_KEY_HEADER: &str = "smart-health-admin-key";

/// Only lets through requests carrying the configured admin api key
pub fn protect_admin_route(req: &HttpRequest, ctx: &HealthContext) -> Result<(), HealthError> {
    let api_key = match req.headers().get(ADMIN_KEY_HEADER) {
        Some(api_key) => match api_key.to_str() {
            Ok(api_key) => api_key,
            Err(_) => {
                return Err(HealthError::Unauthorized(
                    "Malformed admin key provided".to_string(),
                ))
            }
        },
        None => {
            return Err(HealthError::Unauthorized(format!(
                "Unable to find admin key in {} header",
                ADMIN_KEY_HEADER
            )))
        }
    };

    if api_key != ctx.config.admin_api_key {
        return Err(HealthError::Unauthorized(format!(
            "Invalid admin key provided in {} header",
            ADMIN_KEY_HEADER
        )));
    }

    Ok(())
}
