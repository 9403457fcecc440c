//! The compiled access policy.
//!
//! # Responsibilities
//! - Hold the ignored-path list, the firewall, the token filter and the
//!   ordered path rules as one immutable value
//! - Decide, per request, whether to bypass, permit or deny
//!
//! # Design Decisions
//! - Built once at startup from `SecurityConfig`; shared via Arc
//! - Evaluation order is fixed: ignoring → firewall → token → path rules
//! - Stateless: no session is read or written, every request stands alone
//! - A bad token on a public path is treated as anonymous, not rejected

use std::sync::Arc;

use axum::http::{HeaderMap, Method, Uri};

use crate::config::SecurityConfig;
use crate::security::context::Principal;
use crate::security::error::{AccessDeniedPage, SecurityError};
use crate::security::filter::TokenFilter;
use crate::security::firewall::{self, HttpFirewall};
use crate::security::pattern::{PatternError, PatternSet};
use crate::security::policy::{AccessPolicy, Requirement};
use crate::security::token::TokenProvider;

/// Outcome of running a request through the security layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Matched an ignored pattern: no firewall, no token filter, no rules.
    Bypass,
    /// Allowed through; `principal` is set when a valid token was presented.
    Permit {
        requirement: Requirement,
        principal: Option<Principal>,
    },
    /// Rejected.
    Deny(SecurityError),
}

impl Decision {
    /// Short label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Decision::Bypass => "bypass",
            Decision::Permit { principal: None, .. } => "permit_anonymous",
            Decision::Permit { principal: Some(_), .. } => "permit_authenticated",
            Decision::Deny(e) => e.kind(),
        }
    }
}

/// Immutable security configuration for the request pipeline.
#[derive(Debug)]
pub struct WebSecurity {
    ignoring: PatternSet,
    firewall: Box<dyn HttpFirewall>,
    token_filter: TokenFilter,
    policy: AccessPolicy,
    denied_page: AccessDeniedPage,
}

impl WebSecurity {
    pub fn new(
        ignoring: PatternSet,
        firewall: Box<dyn HttpFirewall>,
        token_filter: TokenFilter,
        policy: AccessPolicy,
        denied_page: AccessDeniedPage,
    ) -> Self {
        Self {
            ignoring,
            firewall,
            token_filter,
            policy,
            denied_page,
        }
    }

    /// Compile the configured rule sets around `tokens`.
    pub fn from_config(
        config: &SecurityConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, PatternError> {
        // The denied page must stay reachable, or every denial redirects in a loop.
        let mut public = vec![config.access_denied_page.as_str()];
        public.extend(config.permit_all.iter().map(String::as_str));

        let web = Self::new(
            PatternSet::compile(&config.ignoring)?,
            firewall::from_kind(config.firewall),
            TokenFilter::new(tokens),
            AccessPolicy::permit_all(&public)?,
            AccessDeniedPage(Arc::from(config.access_denied_page.as_str())),
        );

        tracing::info!(
            ignored_patterns = web.ignoring.len(),
            path_rules = web.policy.rules().len(),
            firewall = ?config.firewall,
            access_denied_page = %config.access_denied_page,
            "Web security configured"
        );
        Ok(web)
    }

    /// Run the full decision for one request.
    pub fn decide(&self, method: &Method, uri: &Uri, headers: &HeaderMap) -> Decision {
        let path = uri.path();

        if self.ignoring.matches(path) {
            return Decision::Bypass;
        }

        if let Err(e) = self.firewall.inspect(method, uri) {
            return Decision::Deny(e);
        }

        let authentication = self.token_filter.authenticate(headers);
        let requirement = self.policy.evaluate(path);

        match (requirement, authentication) {
            (Requirement::Public, Ok(principal)) => Decision::Permit {
                requirement,
                principal,
            },
            (Requirement::Public, Err(_)) => Decision::Permit {
                requirement,
                principal: None,
            },
            (Requirement::Authenticated, Ok(Some(principal))) => Decision::Permit {
                requirement,
                principal: Some(principal),
            },
            (Requirement::Authenticated, Ok(None)) => {
                Decision::Deny(SecurityError::MissingCredential)
            }
            (Requirement::Authenticated, Err(e)) => Decision::Deny(e),
        }
    }

    pub fn denied_page(&self) -> &AccessDeniedPage {
        &self.denied_page
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn ignoring(&self) -> &PatternSet {
        &self.ignoring
    }
}
