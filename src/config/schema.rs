//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the access gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Access policy, firewall, password and CORS settings.
    pub security: SecurityConfig,

    /// Bearer token settings.
    pub jwt: JwtConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Which request-normalization firewall guards the filter chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FirewallKind {
    /// Rejects un-normalized paths and encoded slashes.
    #[default]
    Default,
    /// Additionally rejects semicolons, encoded dots/percents, backslashes,
    /// control characters and unknown methods.
    Strict,
}

/// Security configuration.
///
/// `permit_all` and `ignoring` are deliberately separate lists: a permitted
/// path still passes through the firewall and token filter, an ignored path
/// skips the whole filter chain.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Ordered patterns that are reachable without a principal.
    /// Anything not listed requires authentication.
    pub permit_all: Vec<String>,

    /// Patterns excluded from the filter chain entirely.
    pub ignoring: Vec<String>,

    /// Where denied requests are redirected.
    pub access_denied_page: String,

    /// Request-normalization firewall.
    pub firewall: FirewallKind,

    /// CORS policy.
    pub cors: CorsConfig,

    /// Accounts created at startup, e.g. the first administrator.
    pub users: Vec<SeedUser>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            permit_all: [
                "/authentication/login",
                "/authentication/register",
                "/h2-console/**/**",
                "/swagger-resources/**",
                "/swagger-ui.html",
                "/offers/**",
                "/offerImages/**",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            ignoring: [
                "/v2/api-docs",
                "/swagger-resources/**",
                "/swagger-ui.html",
                "/configuration/**",
                "/webjars/**",
                "/public",
                "/h2-console/**/**",
                "/v2/api-docs/**",
                "/swagger.json",
                "/swagger-ui.html",
                "/swagger-resources/**",
                "/webjars/**",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            access_denied_page: "/login".to_string(),
            firewall: FirewallKind::Default,
            cors: CorsConfig::default(),
            users: Vec::new(),
        }
    }
}

/// An account provisioned from configuration.
///
/// `password_hash` is a bcrypt hash, as printed by `access-gate encode-password`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SeedUser {
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub authorities: Vec<String>,
}

/// CORS configuration.
///
/// An empty `allowed_origins` list allows any origin.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: Vec::new(),
            allowed_methods: ["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"]
                .into_iter()
                .map(String::from)
                .collect(),
            allowed_headers: ["authorization", "content-type"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_age_secs: 1800,
        }
    }
}

/// Secret shipped in sample configs; validation refuses to sign with it.
pub const PLACEHOLDER_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Bearer token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtConfig {
    /// HMAC secret used to sign and verify tokens. Has no usable default.
    pub secret: String,

    /// Token lifetime in seconds.
    pub validity_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            validity_secs: 3600,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_published_policy() {
        let config = GatewayConfig::default();
        assert_eq!(config.security.access_denied_page, "/login");
        assert_eq!(config.security.firewall, FirewallKind::Default);
        assert!(config.security.users.is_empty());
        assert!(config.jwt.secret.is_empty());
        assert_eq!(config.security.permit_all[0], "/authentication/login");
        assert!(config.security.ignoring.contains(&"/swagger.json".to_string()));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [security]
            firewall = "strict"

            [[security.users]]
            username = "admin"
            password_hash = "$2b$12$abcdefghijklmnopqrstuu5bOaZ1Q0fOVA6gYdQ0Yb7ZL6vZ0KQ6y"
            authorities = ["ROLE_ADMIN"]

            [jwt]
            secret = "s3cr3t"
            "#,
        )
        .unwrap();

        assert_eq!(config.security.firewall, FirewallKind::Strict);
        assert_eq!(config.security.users.len(), 1);
        assert_eq!(config.security.users[0].authorities, vec!["ROLE_ADMIN"]);
        assert_eq!(config.jwt.secret, "s3cr3t");
        assert_eq!(config.jwt.validity_secs, 3600);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
