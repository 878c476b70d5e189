mod helpers;

use helpers::setup::spawn_app;
use smart_health_domain::User;
use smart_health_sdk::{APIErrorVariant, HealthSDK, StatusCode};

#[actix_web::test]
async fn test_status_ok() {
    let (_, sdk, _) = spawn_app().await;
    assert!(sdk.status.check_health().await.is_ok());
}

#[actix_web::test]
async fn test_disable_and_enable_user() {
    let (app, sdk, _) = spawn_app().await;
    let user = User::new("Ada", "ada@example.com");
    app.ctx.repos.users.insert(&user).await.unwrap();

    let res = sdk
        .user
        .disable("ada@example.com".into())
        .await
        .expect("Expected to disable user");
    assert!(res.user.disabled);
    assert_eq!(res.user.id, user.id);
    assert!(app.ctx.repos.users.find(&user.id).await.unwrap().disabled);

    let res = sdk
        .user
        .enable("ada@example.com".into())
        .await
        .expect("Expected to enable user");
    assert!(!res.user.disabled);
    assert!(!app.ctx.repos.users.find(&user.id).await.unwrap().disabled);
}

#[actix_web::test]
async fn test_disable_unknown_user() {
    let (_, sdk, _) = spawn_app().await;
    let err = sdk
        .user
        .disable("nobody@example.com".into())
        .await
        .expect_err("Expected unknown user to be rejected");
    assert_eq!(
        err.variant,
        APIErrorVariant::UnexpectedStatusCode(StatusCode::NOT_FOUND)
    );
}

#[actix_web::test]
async fn test_disable_user_requires_admin_key() {
    let (app, _, address) = spawn_app().await;
    let user = User::new("Ada", "ada@example.com");
    app.ctx.repos.users.insert(&user).await.unwrap();

    let sdk = HealthSDK::new(address, "wrong-key");
    let err = sdk
        .user
        .disable("ada@example.com".into())
        .await
        .expect_err("Expected a bad admin key to be rejected");
    assert_eq!(
        err.variant,
        APIErrorVariant::UnexpectedStatusCode(StatusCode::UNAUTHORIZED)
    );
    assert!(!app.ctx.repos.users.find(&user.id).await.unwrap().disabled);
}

#[actix_web::test]
async fn test_disable_user_requires_email() {
    let (_, sdk, _) = spawn_app().await;
    let err = sdk
        .user
        .disable("  ".into())
        .await
        .expect_err("Expected a blank email to be rejected");
    assert_eq!(
        err.variant,
        APIErrorVariant::UnexpectedStatusCode(StatusCode::BAD_REQUEST)
    );
}
