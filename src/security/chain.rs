//! Security filter chain middleware.
//! Applies the `WebSecurity` decision to every request.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::request::request_id;
use crate::observability::metrics;
use crate::security::error::Denial;
use crate::security::web_security::{Decision, WebSecurity};

pub async fn security_filter_chain(
    State(web): State<Arc<WebSecurity>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let decision = web.decide(req.method(), req.uri(), req.headers());
    let outcome = decision.outcome();
    metrics::record_decision(outcome);

    match decision {
        Decision::Bypass => {
            tracing::trace!(
                request_id = %request_id(&req),
                path = %req.uri().path(),
                outcome,
                "Ignored path, skipping filter chain"
            );
            next.run(req).await
        }
        Decision::Permit {
            requirement,
            principal,
        } => {
            tracing::debug!(
                request_id = %request_id(&req),
                path = %req.uri().path(),
                %requirement,
                outcome,
                username = principal.as_ref().map(|p| p.username.as_str()),
                "Access granted"
            );

            let extensions = req.extensions_mut();
            extensions.insert(web.denied_page().clone());
            if let Some(principal) = principal {
                extensions.insert(principal);
            }
            next.run(req).await
        }
        Decision::Deny(error) => {
            tracing::info!(
                request_id = %request_id(&req),
                method = %req.method(),
                path = %req.uri().path(),
                outcome,
                "Access denied"
            );
            Denial::new(error, web.denied_page().clone()).into_response()
        }
    }
}
