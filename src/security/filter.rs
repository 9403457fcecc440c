//! Bearer token filter.
//!
//! Resolves the token from the request, validates it through the configured
//! `TokenProvider`, and yields the principal for the security context.
//! Holds nothing but a shared reference to the provider, so one instance
//! serves every concurrent request.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::security::context::Principal;
use crate::security::error::SecurityError;
use crate::security::token::TokenProvider;

#[derive(Debug, Clone)]
pub struct TokenFilter {
    provider: Arc<dyn TokenProvider>,
}

impl TokenFilter {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self { provider }
    }

    /// `Ok(None)` when no bearer token was presented, `Err` when one was
    /// presented but did not validate.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Option<Principal>, SecurityError> {
        match self.provider.resolve_token(headers) {
            None => Ok(None),
            Some(token) => self.provider.validate(token).map(Some),
        }
    }

    pub fn provider(&self) -> &Arc<dyn TokenProvider> {
        &self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::security::token::JwtTokenProvider;
    use axum::http::{header, HeaderValue};

    fn filter() -> (TokenFilter, Arc<JwtTokenProvider>) {
        let provider = Arc::new(JwtTokenProvider::new(&JwtConfig {
            secret: "unit-test-secret".into(),
            ..JwtConfig::default()
        }));
        (TokenFilter::new(provider.clone()), provider)
    }

    #[test]
    fn test_no_header_is_anonymous() {
        let (filter, _) = filter();
        assert_eq!(filter.authenticate(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn test_valid_token_yields_principal() {
        let (filter, provider) = filter();
        let principal = Principal::new("bob", vec![]);
        let token = provider.create_token(&principal).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        assert_eq!(filter.authenticate(&headers), Ok(Some(principal)));
    }

    #[test]
    fn test_invalid_token_is_error() {
        let (filter, _) = filter();
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer garbage"));
        assert!(matches!(
            filter.authenticate(&headers),
            Err(SecurityError::InvalidToken(_))
        ));
    }
}
