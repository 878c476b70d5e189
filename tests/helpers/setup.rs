use smart_health_api::Application;
use smart_health_infra::{Config, HealthContext};
use smart_health_sdk::HealthSDK;

pub struct TestApp {
    pub config: Config,
    pub ctx: HealthContext,
}

// Launch the application as a background task
pub async fn spawn_app() -> (TestApp, HealthSDK, String) {
    let mut ctx = HealthContext::create_inmemory();
    ctx.config.port = 0; // Random port

    let config = ctx.config.clone();
    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}/api/v1", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let sdk = HealthSDK::new(address.clone(), config.admin_api_key.clone());
    let app = TestApp { config, ctx };
    (app, sdk, address)
}
