//! # Hotels Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize tracing and metrics export
//! - Initialize the repository and payment adapters
//! - Create the hotel service
//! - Start the HTTP server

mod config;

use opentelemetry::global;
use opentelemetry_sdk::{
    metrics::{PeriodicReader, SdkMeterProvider},
    propagation::TraceContextPropagator,
    trace as sdktrace,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hotels_hex::{
    HotelService,
    inbound::{HttpServer, TokenKeys, handlers::AppState},
};
use hotels_repo::build_repo;
use hotels_stripe::StripeGateway;

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create OTLP span exporter: {}", e))?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("hotels-service"), provider))
}

/// Exports the HTTP metrics recorded by the router layer.
fn init_meter() -> anyhow::Result<SdkMeterProvider> {
    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create OTLP metric exporter: {}", e))?;

    let provider = SdkMeterProvider::builder()
        .with_reader(PeriodicReader::builder(exporter).build())
        .build();

    global::set_meter_provider(provider.clone());
    Ok(provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize OpenTelemetry tracing and metrics
    let (otel_tracer, otel_provider) = init_tracer()?;
    let meter_provider = init_meter()?;
    let telemetry = tracing_opentelemetry::layer().with_tracer(otel_tracer);

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hotels_app=debug,hotels_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting hotels server on port {}", config.port);

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;
    tracing::info!("Using {} database", repo.backend());

    let payments =
        StripeGateway::new(config.stripe_api_key.clone()).with_base_url(&config.stripe_api_base);

    // Create the hotel service
    let service = HotelService::new(repo, payments).with_currency(config.currency);
    tracing::info!("Charging bookings in {}", config.currency);

    let state = AppState::new(service, TokenKeys::new(config.jwt_secret.as_bytes()))
        .with_secure_cookies(config.cookie_secure);

    // Create and run the HTTP server
    let mut server = HttpServer::new(state).with_rate_limit(config.rate_limit_per_minute);
    if let Some(origin) = &config.frontend_url {
        tracing::info!("Allowing cross-origin requests from {}", origin);
        server = server.with_cors_origin(origin)?;
    }

    let addr = format!("0.0.0.0:{}", config.port);
    server.run(&addr).await?;

    // Ensure traces and metrics are flushed before exit
    let _ = otel_provider.shutdown();
    let _ = meter_provider.shutdown();
    Ok(())
}
