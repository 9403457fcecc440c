//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use access_gate::config::GatewayConfig;
use access_gate::http::HttpServer;
use access_gate::security::password::{PasswordEncoder, MIN_COST};
use access_gate::security::token::TokenProvider;
use access_gate::security::users::{InMemoryUserStore, UserDetails, UserDetailsService};
use access_gate::security::{Principal, SecurityServices};
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Defaults with a fixed secret.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.jwt.secret = TEST_SECRET.to_string();
    config
}

pub struct TestApp {
    pub router: Router,
    pub services: SecurityServices,
    pub users: Arc<InMemoryUserStore>,
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(test_config())
}

pub fn spawn_app_with(config: GatewayConfig) -> TestApp {
    let users = Arc::new(InMemoryUserStore::new());
    // Minimum bcrypt cost keeps the suite fast.
    let services =
        SecurityServices::with_password_cost(&config, users.clone(), MIN_COST).unwrap();
    let router = HttpServer::new(config, services.clone()).router();
    TestApp {
        router,
        services,
        users,
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> Response {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub fn token_for(&self, username: &str, authorities: &[&str]) -> String {
        let principal = Principal::new(
            username,
            authorities.iter().map(|a| a.to_string()).collect(),
        );
        self.services.token_provider.create_token(&principal).unwrap()
    }

    pub fn seed_user(&self, username: &str, password: &str, authorities: &[&str]) {
        self.users
            .create_user(UserDetails {
                username: username.to_string(),
                password_hash: self.services.password_encoder.encode(password).unwrap(),
                authorities: authorities.iter().map(|a| a.to_string()).collect(),
            })
            .unwrap();
    }
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

pub fn get_with_token(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(path: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
