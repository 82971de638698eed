//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, limits, timeout, headers, metrics)
//! - Serve on a listener until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::http::recipes::{self, BASE_PATH};
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::http::response::{json_error_body, method_not_allowed, route_not_found};
use crate::http::status::get_health;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;
use crate::security::{headers, limits};
use crate::store::RecipeStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecipeStore>,
}

/// HTTP server for the recipes API.
pub struct HttpServer {
    router: Router,
    backend: &'static str,
}

impl HttpServer {
    /// Create a new HTTP server over `store`.
    pub fn new(config: ServiceConfig, store: Arc<dyn RecipeStore>) -> Self {
        let backend = store.backend();
        let state = AppState { store };
        let router = Self::build_router(&config, state);
        Self { router, backend }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .merge(recipes::routes())
            .route("/health", get(get_health))
            .route_layer(middleware::from_fn(metrics::track_metrics))
            .fallback(route_not_found)
            .method_not_allowed_fallback(method_not_allowed)
            .with_state(state)
            .layer(limits::extractor_limit(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(limits::body_limit_layer(config.security.max_body_size))
            .layer(middleware::map_response(json_error_body));

        if config.security.enable_headers {
            router = router
                .layer(headers::content_type_options())
                .layer(headers::frame_options());
        }

        router
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_span::<Body>))
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until Ctrl+C, SIGTERM, or a message on `shutdown`.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            base_path = BASE_PATH,
            backend = self.backend,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
