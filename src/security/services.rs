//! Startup wiring for the security layer.
//!
//! Builds every security service once and hands them out as plain values:
//! the compiled `WebSecurity`, the password encoder, the token provider and
//! the authentication manager. Accounts listed under `security.users` are
//! created in the supplied user store.

use std::sync::Arc;

use thiserror::Error;
use tower_http::cors::CorsLayer;

use crate::config::validation::{check_secret, ValidationError};
use crate::config::GatewayConfig;
use crate::security::cors::cors_layer;
use crate::security::manager::AuthenticationManager;
use crate::security::password::{BCryptPasswordEncoder, PasswordEncoder, DEFAULT_COST};
use crate::security::pattern::PatternError;
use crate::security::token::{JwtTokenProvider, TokenProvider};
use crate::security::users::{UserDetails, UserDetailsService, UserStoreError};
use crate::security::web_security::WebSecurity;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid path pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("bcrypt cost {0} is out of range")]
    PasswordCost(u32),

    #[error("unusable token secret: {0}")]
    Secret(ValidationError),

    #[error("cannot seed user: {0}")]
    SeedUser(#[from] UserStoreError),
}

#[derive(Debug, Clone)]
pub struct SecurityServices {
    pub web: Arc<WebSecurity>,
    pub password_encoder: Arc<dyn PasswordEncoder>,
    pub token_provider: Arc<dyn TokenProvider>,
    pub authentication_manager: AuthenticationManager,
    pub cors: Option<CorsLayer>,
}

impl SecurityServices {
    /// Build the services with the fixed bcrypt cost of 12.
    pub fn from_config(
        config: &GatewayConfig,
        users: Arc<dyn UserDetailsService>,
    ) -> Result<Self, SetupError> {
        Self::with_password_cost(config, users, DEFAULT_COST)
    }

    /// Same as `from_config`, with an explicit bcrypt cost for newly encoded
    /// passwords. Not reachable from configuration.
    pub fn with_password_cost(
        config: &GatewayConfig,
        users: Arc<dyn UserDetailsService>,
        cost: u32,
    ) -> Result<Self, SetupError> {
        check_secret(&config.jwt.secret).map_err(SetupError::Secret)?;
        let password_encoder: Arc<dyn PasswordEncoder> = Arc::new(
            BCryptPasswordEncoder::new(cost).map_err(|_| SetupError::PasswordCost(cost))?,
        );
        let token_provider: Arc<dyn TokenProvider> = Arc::new(JwtTokenProvider::new(&config.jwt));

        let web = Arc::new(WebSecurity::from_config(
            &config.security,
            token_provider.clone(),
        )?);

        for seed in &config.security.users {
            users.create_user(UserDetails {
                username: seed.username.clone(),
                password_hash: seed.password_hash.clone(),
                authorities: seed.authorities.clone(),
            })?;
            tracing::info!(
                username = %seed.username,
                authorities = ?seed.authorities,
                "Seeded user from configuration"
            );
        }
        let authentication_manager = AuthenticationManager::new(users, password_encoder.clone());

        Ok(Self {
            web,
            password_encoder,
            token_provider,
            authentication_manager,
            cors: cors_layer(&config.security.cors),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_config;
    use crate::config::{SeedUser, PLACEHOLDER_SECRET};
    use crate::security::password::MIN_COST;
    use crate::security::users::InMemoryUserStore;

    fn config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.jwt.secret = "services-secret".into();
        config
    }

    fn store() -> Arc<InMemoryUserStore> {
        Arc::new(InMemoryUserStore::new())
    }

    #[test]
    fn test_out_of_range_cost_is_an_error() {
        for cost in [0, 3, 32, 40] {
            assert!(matches!(
                SecurityServices::with_password_cost(&config(), store(), cost),
                Err(SetupError::PasswordCost(c)) if c == cost
            ));
        }
    }

    #[test]
    fn test_refuses_missing_or_placeholder_secret() {
        let mut config = config();
        config.jwt.secret.clear();
        assert!(matches!(
            SecurityServices::from_config(&config, store()),
            Err(SetupError::Secret(ValidationError::EmptySecret))
        ));

        config.jwt.secret = PLACEHOLDER_SECRET.into();
        assert!(matches!(
            SecurityServices::from_config(&config, store()),
            Err(SetupError::Secret(ValidationError::PlaceholderSecret))
        ));
    }

    #[test]
    fn test_encoder_cost_ignores_configuration() {
        let config = parse_config(
            r#"
            [security]
            password_cost = 4
            [jwt]
            secret = "services-secret"
            "#,
        )
        .unwrap();
        let services = SecurityServices::from_config(&config, store()).unwrap();
        let hash = services.password_encoder.encode("pw").unwrap();
        assert!(hash.starts_with("$2b$12$"), "{hash}");
    }

    #[test]
    fn test_seeds_configured_users() {
        let hash = bcrypt::hash("root-pw", MIN_COST).unwrap();
        let mut config = config();
        config.security.users.push(SeedUser {
            username: "root".into(),
            password_hash: hash,
            authorities: vec!["ROLE_ADMIN".into()],
        });

        let services = SecurityServices::from_config(&config, store()).unwrap();
        let principal = services
            .authentication_manager
            .authenticate("root", "root-pw")
            .unwrap();
        assert!(principal.has_authority("ROLE_ADMIN"));
    }

    #[test]
    fn test_seeding_an_existing_user_fails() {
        let users = store();
        users
            .create_user(UserDetails {
                username: "root".into(),
                password_hash: "x".into(),
                authorities: vec![],
            })
            .unwrap();

        let mut config = config();
        config.security.users.push(SeedUser {
            username: "root".into(),
            password_hash: bcrypt::hash("pw", MIN_COST).unwrap(),
            authorities: vec![],
        });
        assert!(matches!(
            SecurityServices::from_config(&config, users),
            Err(SetupError::SeedUser(UserStoreError::UsernameTaken(_)))
        ));
    }
}
