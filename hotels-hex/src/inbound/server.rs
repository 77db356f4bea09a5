//! HTTP Server configuration and startup.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use hotels_types::{HotelRepository, PaymentGateway};

use super::auth::auth_middleware;
use super::handlers::{self, AppState};
use super::rate_limit::{RateLimit, RateLimiterState, rate_limit_middleware};
use crate::openapi::ApiDoc;

/// HTTP Server for the Hotels API.
pub struct HttpServer<R: HotelRepository, P: PaymentGateway> {
    state: Arc<AppState<R, P>>,
    rate_limiter: Arc<RateLimiterState>,
    cors_origin: Option<HeaderValue>,
}

impl<R: HotelRepository, P: PaymentGateway> HttpServer<R, P> {
    /// Creates a new HTTP server with the default rate limit (100 req/min).
    pub fn new(state: AppState<R, P>) -> Self {
        Self {
            state: Arc::new(state),
            rate_limiter: Arc::new(RateLimiterState::default()),
            cors_origin: None,
        }
    }

    /// Sets the per-client request budget per minute.
    pub fn with_rate_limit(mut self, requests_per_minute: u32) -> Self {
        self.rate_limiter = Arc::new(RateLimiterState::new(
            requests_per_minute,
            Duration::from_secs(60),
        ));
        self
    }

    /// Allows credentialed cross-origin requests from the given frontend origin.
    pub fn with_cors_origin(mut self, origin: &str) -> anyhow::Result<Self> {
        let origin = HeaderValue::from_str(origin.trim_end_matches('/'))
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", origin, e))?;
        self.cors_origin = Some(origin);
        Ok(self)
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let protected = Router::new()
            .route("/api/auth/validate-token", get(handlers::validate_token))
            .route(
                "/api/hotels/{hotel_id}/bookings/payment-intent",
                post(handlers::create_payment_intent::<R, P>),
            )
            .route(
                "/api/hotels/{hotel_id}/bookings",
                post(handlers::create_booking::<R, P>),
            )
            .route(
                "/api/my-hotels",
                get(handlers::list_my_hotels::<R, P>).post(handlers::create_my_hotel::<R, P>),
            )
            .route("/api/my-bookings", get(handlers::my_bookings::<R, P>))
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware::<R, P>,
            ));

        let router = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/users/register", post(handlers::register::<R, P>))
            .route("/api/auth/login", post(handlers::login::<R, P>))
            .route("/api/auth/logout", post(handlers::logout))
            .route("/api/hotels/search", get(handlers::search_hotels::<R, P>))
            .route("/api/hotels", get(handlers::list_hotels::<R, P>))
            .route("/api/hotels/{hotel_id}", get(handlers::get_hotel::<R, P>))
            .merge(protected)
            .with_state(self.state.clone())
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                RateLimit {
                    limiter: self.rate_limiter.clone(),
                    tokens: self.state.tokens.clone(),
                },
                rate_limit_middleware,
            ))
            .layer(TraceLayer::new_for_http());

        match &self.cors_origin {
            Some(origin) => router.layer(
                CorsLayer::new()
                    .allow_origin(origin.clone())
                    .allow_credentials(true)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
            ),
            None => router,
        }
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        let limiter = self.rate_limiter.clone();
        let pruner = tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_secs(60));
            loop {
                tick.tick().await;
                limiter.prune();
                tracing::debug!(clients = limiter.tracked_clients(), "Pruned rate limiter");
            }
        });

        // Peer addresses key the rate limiter for anonymous clients
        let app = self
            .router()
            .into_make_service_with_connect_info::<SocketAddr>();
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        pruner.abort();
        served?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
