//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate path patterns in both rule sets
//! - Validate value ranges (token lifetime, timeouts)
//! - Refuse to sign tokens with a missing or sample secret
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::{GatewayConfig, SeedUser, PLACEHOLDER_SECRET};
use crate::security::pattern::PathPattern;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{list}[{index}]: {reason}")]
    InvalidPattern {
        list: &'static str,
        index: usize,
        reason: String,
    },

    #[error("security.access_denied_page must be an absolute path, got {0:?}")]
    InvalidDeniedPage(String),

    #[error("jwt.secret must be set")]
    EmptySecret,

    #[error("jwt.secret is the sample placeholder; generate a private secret")]
    PlaceholderSecret,

    #[error("security.users[{0}]: username must not be empty")]
    EmptyUsername(usize),

    #[error("security.users[{index}]: password_hash for {username:?} is not a bcrypt hash")]
    PasswordHash { index: usize, username: String },

    #[error("security.users: {0:?} is listed more than once")]
    DuplicateUser(String),

    #[error("jwt.validity_secs must be greater than zero")]
    ZeroValidity,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("security.cors.allowed_methods contains unknown method {0:?}")]
    CorsMethod(String),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_patterns("security.permit_all", &config.security.permit_all, &mut errors);
    check_patterns("security.ignoring", &config.security.ignoring, &mut errors);

    if !config.security.access_denied_page.starts_with('/') {
        errors.push(ValidationError::InvalidDeniedPage(
            config.security.access_denied_page.clone(),
        ));
    }

    check_users(&config.security.users, &mut errors);

    if let Err(e) = check_secret(&config.jwt.secret) {
        errors.push(e);
    }
    if config.jwt.validity_secs == 0 {
        errors.push(ValidationError::ZeroValidity);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config
        .listener
        .bind_address
        .parse::<std::net::SocketAddr>()
        .is_err()
    {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    for method in &config.security.cors.allowed_methods {
        if method.parse::<axum::http::Method>().is_err() {
            errors.push(ValidationError::CorsMethod(method.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Reject secrets that anyone could know.
pub fn check_secret(secret: &str) -> Result<(), ValidationError> {
    if secret.trim().is_empty() {
        Err(ValidationError::EmptySecret)
    } else if secret == PLACEHOLDER_SECRET {
        Err(ValidationError::PlaceholderSecret)
    } else {
        Ok(())
    }
}

fn check_users(users: &[SeedUser], errors: &mut Vec<ValidationError>) {
    let mut seen = std::collections::HashSet::new();
    for (index, user) in users.iter().enumerate() {
        if user.username.trim().is_empty() {
            errors.push(ValidationError::EmptyUsername(index));
            continue;
        }
        if user.password_hash.parse::<bcrypt::HashParts>().is_err() {
            errors.push(ValidationError::PasswordHash {
                index,
                username: user.username.clone(),
            });
        }
        if !seen.insert(user.username.as_str()) {
            errors.push(ValidationError::DuplicateUser(user.username.clone()));
        }
    }
}

fn check_patterns(list: &'static str, patterns: &[String], errors: &mut Vec<ValidationError>) {
    for (index, raw) in patterns.iter().enumerate() {
        if let Err(e) = PathPattern::parse(raw) {
            errors.push(ValidationError::InvalidPattern {
                list,
                index,
                reason: e.to_string(),
            });
        }
    }
}
