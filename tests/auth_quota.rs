mod common;

use axum::http::StatusCode;
use common::{DEVELOPER_KEY, MODERATOR_KEY, PREMIUM_KEY, read_json, request, test_app,
             test_app_with_limit};
use tower::ServiceExt;

#[tokio::test]
async fn missing_api_key_is_rejected() {
    let app = test_app().await;

    let response = app.clone().oneshot(request("GET", "/brands")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["message"], "API key missing.");
}

#[tokio::test]
async fn unknown_api_key_is_rejected() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(request("GET", "/brands?api_key=no-such-key"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["message"], "API key not found!");
}

#[tokio::test]
async fn health_does_not_require_a_key() {
    let app = test_app().await;

    let response = app.clone().oneshot(request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn developer_quota_exhausts_and_keeps_rejecting() {
    let app = test_app_with_limit(3).await;
    let uri = format!("/cigarDomainValues?api_key={DEVELOPER_KEY}");

    for _ in 0..3 {
        let response = app.clone().oneshot(request("GET", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(request("GET", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = read_json(response).await;
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("daily request limit")
    );

    // Requests past the limit keep counting and keep failing.
    let response = app.clone().oneshot(request("GET", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn premium_tier_is_not_metered() {
    let app = test_app_with_limit(1).await;
    let uri = format!("/cigarDomainValues?api_key={PREMIUM_KEY}");

    for _ in 0..5 {
        let response = app.clone().oneshot(request("GET", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn moderation_surface_requires_moderator_tier() {
    let app = test_app().await;

    for key in [DEVELOPER_KEY, PREMIUM_KEY] {
        let response = app
            .clone()
            .oneshot(request(
                "GET",
                &format!("/moderate/brandsCreateRequests?api_key={key}"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = read_json(response).await;
        assert_eq!(body["message"], "You are not authorized!");
    }

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/moderate/brandsCreateRequests?api_key={MODERATOR_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_moderation_queue_is_not_found() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/moderate/usersCreateRequests?api_key={MODERATOR_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
