//! Application endpoints behind the security layer.
//!
//! These are the collaborators the access policy names: login and
//! registration, the public offers listing, an account page that needs a
//! principal, an admin page that needs an authority, the login page denied
//! requests land on, and the API documentation served on ignored paths.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::observability::metrics;
use crate::security::manager::{AuthError, AuthenticationManager};
use crate::security::password::{PasswordEncoder, PasswordError};
use crate::security::token::{TokenError, TokenProvider};
use crate::security::users::{UserDetails, UserDetailsService, UserStoreError};
use crate::security::{Authenticated, Principal};

/// Authority given to self-registered accounts.
pub const ROLE_CLIENT: &str = "ROLE_CLIENT";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// Services the handlers depend on.
#[derive(Debug, Clone)]
pub struct AppState {
    pub authentication_manager: AuthenticationManager,
    pub token_provider: Arc<dyn TokenProvider>,
    pub password_encoder: Arc<dyn PasswordEncoder>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid username/password supplied")]
    Authentication(#[from] AuthError),

    #[error("{0}")]
    Conflict(#[from] UserStoreError),

    #[error("{0}")]
    BadRequest(String),

    #[error("offer {0} not found")]
    NotFound(u64),

    #[error("internal error")]
    Password(#[from] PasswordError),

    #[error("internal error")]
    Token(#[from] TokenError),

    #[error("internal error")]
    Join(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Password(e) => {
                tracing::error!(error = %e, "Password hashing failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Token(e) => {
                tracing::error!(error = %e, "Token signing failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Join(e) => {
                tracing::error!(error = %e, "Blocking task failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Offer {
    pub id: u64,
    pub title: String,
    pub image: String,
}

fn catalog() -> Vec<Offer> {
    [(1, "City bike"), (2, "Camping tent"), (123, "Espresso machine")]
        .into_iter()
        .map(|(id, title)| Offer {
            id,
            title: title.to_string(),
            image: format!("/offerImages/{id}.png"),
        })
        .collect()
}

pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
    // bcrypt is slow by construction; keep it off the async workers.
    let manager = state.authentication_manager.clone();
    let result = tokio::task::spawn_blocking(move || {
        manager.authenticate(&credentials.username, &credentials.password)
    })
    .await?;
    metrics::record_authentication(result.is_ok());

    let principal = result?;
    let token = state.token_provider.create_token(&principal)?;
    Ok(Json(TokenResponse { token }))
}

pub async fn register(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<Principal>), ApiError> {
    if credentials.username.trim().is_empty() || credentials.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".to_string(),
        ));
    }

    let encoder = state.password_encoder.clone();
    let password = credentials.password;
    let password_hash = tokio::task::spawn_blocking(move || encoder.encode(&password)).await??;

    let user = UserDetails {
        username: credentials.username.trim().to_string(),
        password_hash,
        authorities: vec![ROLE_CLIENT.to_string()],
    };
    let principal = Principal::new(user.username.clone(), user.authorities.clone());
    state.authentication_manager.users().create_user(user)?;

    tracing::info!(username = %principal.username, "Account registered");
    Ok((StatusCode::CREATED, Json(principal)))
}

pub async fn list_offers() -> Json<Vec<Offer>> {
    Json(catalog())
}

pub async fn get_offer(Path(id): Path<u64>) -> Result<Json<Offer>, ApiError> {
    catalog()
        .into_iter()
        .find(|offer| offer.id == id)
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

pub async fn offer_image(Path(path): Path<String>) -> impl IntoResponse {
    ([("content-type", "text/plain")], format!("image placeholder for {path}"))
}

pub async fn profile(auth: Authenticated) -> Json<Principal> {
    Json(auth.principal)
}

/// Registration only grants `ROLE_CLIENT`; administrators come from
/// `security.users` in the configuration.
pub async fn list_users(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<Json<Vec<String>>, Response> {
    auth.require_authority(ROLE_ADMIN)
        .map_err(IntoResponse::into_response)?;
    Ok(Json(state.authentication_manager.users().list_usernames()))
}

pub async fn login_page() -> &'static str {
    "Sign in with POST /authentication/login and send the returned token as 'Authorization: Bearer <token>'."
}

pub async fn api_docs() -> Json<serde_json::Value> {
    Json(json!({
        "swagger": "2.0",
        "info": { "title": "access-gate", "version": env!("CARGO_PKG_VERSION") },
        "paths": {
            "/authentication/login": { "post": { "summary": "Exchange credentials for a bearer token" } },
            "/authentication/register": { "post": { "summary": "Create an account" } },
            "/offers": { "get": { "summary": "List public offers" } },
            "/offers/{id}": { "get": { "summary": "Fetch one offer" } },
            "/account/profile": { "get": { "summary": "Current principal", "security": ["bearer"] } },
            "/admin/users": { "get": { "summary": "List accounts", "security": ["bearer"] } }
        }
    }))
}

pub async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

pub async fn public_root() -> &'static str {
    "access-gate"
}
