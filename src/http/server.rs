//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, CORS, security chain)
//! - Bind server to listener and serve until shutdown

use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::http::handlers::{self, AppState};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::security::chain::security_filter_chain;
use crate::security::SecurityServices;

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and services.
    pub fn new(config: GatewayConfig, services: SecurityServices) -> Self {
        let router = Self::build_router(&config, services);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers run outermost-first: request ID, trace, timeout, CORS, then
    /// the security filter chain. CORS sits outside the chain so preflight
    /// requests are answered without credentials.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, services: SecurityServices) -> Router {
        let state = AppState {
            authentication_manager: services.authentication_manager.clone(),
            token_provider: services.token_provider.clone(),
            password_encoder: services.password_encoder.clone(),
        };

        let router = Router::new()
            .route("/authentication/login", post(handlers::login))
            .route("/authentication/register", post(handlers::register))
            .route("/offers", get(handlers::list_offers))
            .route("/offers/{id}", get(handlers::get_offer))
            .route("/offerImages/{*path}", get(handlers::offer_image))
            .route("/account/profile", get(handlers::profile))
            .route("/admin/users", get(handlers::list_users))
            .route("/login", get(handlers::login_page))
            .route("/public", get(handlers::public_root))
            .route("/swagger-ui.html", get(handlers::api_docs))
            .route("/swagger.json", get(handlers::api_docs))
            .route("/v2/api-docs", get(handlers::api_docs))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                services.web.clone(),
                security_filter_chain,
            ));

        let router = match services.cors {
            Some(cors) => router.layer(cors),
            None => router,
        };

        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
