//! Credential checks for login.
//!
//! The manager is built once by `SecurityServices::from_config` and handed
//! to whatever needs it (login handler, admin tooling). There is no global
//! instance.

use std::sync::Arc;

use thiserror::Error;

use crate::security::context::Principal;
use crate::security::password::PasswordEncoder;
use crate::security::users::UserDetailsService;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Unknown user and wrong password are deliberately indistinguishable.
    #[error("bad credentials")]
    BadCredentials,
}

/// Checks username/password pairs against the user store.
#[derive(Debug, Clone)]
pub struct AuthenticationManager {
    users: Arc<dyn UserDetailsService>,
    encoder: Arc<dyn PasswordEncoder>,
}

impl AuthenticationManager {
    pub fn new(users: Arc<dyn UserDetailsService>, encoder: Arc<dyn PasswordEncoder>) -> Self {
        Self { users, encoder }
    }

    /// Authenticate and return the principal on success.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        let Some(user) = self.users.load_user(username) else {
            tracing::debug!(username, "Authentication failed: unknown user");
            return Err(AuthError::BadCredentials);
        };

        if !self.encoder.matches(password, &user.password_hash) {
            tracing::debug!(username, "Authentication failed: password mismatch");
            return Err(AuthError::BadCredentials);
        }

        tracing::info!(username, "Authentication succeeded");
        Ok(Principal::new(user.username, user.authorities))
    }

    pub fn users(&self) -> &Arc<dyn UserDetailsService> {
        &self.users
    }

    pub fn encoder(&self) -> &Arc<dyn PasswordEncoder> {
        &self.encoder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::password::{BCryptPasswordEncoder, MIN_COST};
    use crate::security::users::{InMemoryUserStore, UserDetails};

    fn manager() -> AuthenticationManager {
        let encoder = Arc::new(BCryptPasswordEncoder::new(MIN_COST).unwrap());
        let users = Arc::new(InMemoryUserStore::new());
        users
            .create_user(UserDetails {
                username: "alice".into(),
                password_hash: encoder.encode("wonderland").unwrap(),
                authorities: vec!["ROLE_CLIENT".into()],
            })
            .unwrap();
        AuthenticationManager::new(users, encoder)
    }

    #[test]
    fn test_valid_credentials() {
        let principal = manager().authenticate("alice", "wonderland").unwrap();
        assert_eq!(principal, Principal::new("alice", vec!["ROLE_CLIENT".into()]));
    }

    #[test]
    fn test_wrong_password_and_unknown_user_look_the_same() {
        let m = manager();
        assert_eq!(m.authenticate("alice", "nope"), Err(AuthError::BadCredentials));
        assert_eq!(m.authenticate("mallory", "wonderland"), Err(AuthError::BadCredentials));
    }
}
