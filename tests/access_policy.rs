//! Access policy behaviour through the full middleware stack.

use std::sync::Arc;

use access_gate::config::FirewallKind;
use access_gate::security::chain::security_filter_chain;
use access_gate::security::Principal;
use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::{middleware, routing::get as get_route, Router};
use jsonwebtoken::get_current_timestamp;
use serde_json::json;
use tower::ServiceExt;

use access_gate::security::token::JwtTokenProvider;

mod common;
use common::{body_json, get, get_with_token, location, spawn_app, spawn_app_with, test_config};

#[tokio::test]
async fn test_public_offer_without_token() {
    let app = spawn_app();

    let response = app.send(get("/offers/123")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], 123);

    let response = app.send(get("/offers")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.send(get("/offerImages/123.png")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_path_without_token_redirects_to_login() {
    let app = spawn_app();

    let response = app.send(get("/account/profile")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_protected_path_with_invalid_token_redirects_to_login() {
    let app = spawn_app();

    let response = app.send(get_with_token("/account/profile", "not.a.jwt")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_protected_path_with_expired_token_redirects_to_login() {
    let app = spawn_app();
    let provider = JwtTokenProvider::new(&test_config().jwt);
    let expired = provider
        .create_token_at(
            &Principal::new("alice", vec![]),
            get_current_timestamp() - 7200,
        )
        .unwrap();

    let response = app.send(get_with_token("/account/profile", &expired)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_protected_path_with_valid_token_reaches_handler() {
    let app = spawn_app();
    let token = app.token_for("alice", &["ROLE_CLIENT"]);

    let response = app.send(get_with_token("/account/profile", &token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["authorities"], json!(["ROLE_CLIENT"]));
}

#[tokio::test]
async fn test_unrouted_paths_are_protected_too() {
    let app = spawn_app();

    let response = app.send(get("/does/not/exist")).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let token = app.token_for("alice", &[]);
    let response = app.send(get_with_token("/does/not/exist", &token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_page_is_reachable_without_token() {
    let app = spawn_app();
    let response = app.send(get("/login")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_swagger_ui_is_served_with_or_without_token() {
    let app = spawn_app();

    let response = app.send(get("/swagger-ui.html")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["swagger"], "2.0");

    let response = app.send(get_with_token("/swagger-ui.html", "garbage")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.send(get("/v2/api-docs")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_firewall_rejects_unnormalized_path() {
    let app = spawn_app();

    let response = app.send(get("/offers/../account/profile")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(location(&response), None);
}

#[tokio::test]
async fn test_strict_firewall_rejects_semicolon_but_not_on_ignored_paths() {
    let mut config = test_config();
    config.security.firewall = FirewallKind::Strict;
    let app = spawn_app_with(config);

    let response = app.send(get("/offers/1;jsessionid=abc")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Bypassed paths never see the firewall; the router simply has no such route.
    let response = app.send(get("/webjars/lib;v=1.js")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ignored_paths_never_populate_the_security_context() {
    let app = spawn_app();
    let token = app.token_for("alice", &[]);

    // Reports whether the token filter ran for this request.
    async fn has_principal(req: Request) -> String {
        req.extensions().get::<Principal>().is_some().to_string()
    }

    let router = Router::new()
        .route("/public", get_route(has_principal))
        .route("/offers", get_route(has_principal))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&app.services.web),
            security_filter_chain,
        ));

    let read = |response: axum::response::Response| async move {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    };

    let response = router
        .clone()
        .oneshot(get_with_token("/public", &token))
        .await
        .unwrap();
    assert_eq!(read(response).await, "false");

    let response = router
        .oneshot(get_with_token("/offers", &token))
        .await
        .unwrap();
    assert_eq!(read(response).await, "true");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = spawn_app();

    let response = app.send(get("/offers")).await;
    assert!(response.headers().contains_key("x-request-id"));

    let request = axum::http::Request::builder()
        .uri("/account/profile")
        .header("x-request-id", "trace-me")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.headers()["x-request-id"], "trace-me");
}

#[tokio::test]
async fn test_cors_preflight_is_answered_without_credentials() {
    let app = spawn_app();

    let request = axum::http::Request::builder()
        .method("OPTIONS")
        .uri("/account/profile")
        .header(header::ORIGIN, "https://shop.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(location(&response), None);
}
