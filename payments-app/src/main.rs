//! # Payments Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the store, gateway and event publisher adapters
//! - Create the payment service
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payments_hex::{PaymentService, ServiceConfig, inbound::HttpServer};
use payments_repo::{LogPublisher, RabbitHttpPublisher, build_repo};
use payments_types::{Currency, EventPublisher};
use payu_gateway::{PayuConfig, PayuGateway};

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("payments-service"), provider))
}

/// Picks the broker publisher when one is configured, declaring the events
/// queue up front. Falls back to logging events.
async fn build_publisher(config: &config::Config) -> anyhow::Result<Arc<dyn EventPublisher>> {
    let Some(rabbit) = config.rabbitmq.clone() else {
        tracing::warn!("RABBITMQ_API_URL not set, events will only be logged");
        return Ok(Arc::new(LogPublisher));
    };

    tracing::info!(api_url = %rabbit.api_url, vhost = %rabbit.vhost, "Using RabbitMQ event publisher");
    let publisher = RabbitHttpPublisher::new(rabbit)?;
    if let Err(e) = publisher.declare_queue(&config.events_queue).await {
        // Retried on first publish.
        tracing::warn!(queue = %config.events_queue, "Could not declare events queue: {}", e);
    }
    Ok(Arc::new(publisher))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize OpenTelemetry tracing
    let (otel_tracer, otel_provider) = init_tracer()?;
    let telemetry = tracing_opentelemetry::layer().with_tracer(otel_tracer);

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,payments_app=debug,payments_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting payments server on port {}", config.port);

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;
    tracing::info!(backend = repo.backend(), "Payment store ready");

    // Gateway credentials are checked again on every charge
    let payu = PayuConfig::from_env();
    if let Err(e) = payu.validate() {
        tracing::error!("PayU gateway is not configured, charges will fail: {}", e);
    }
    tracing::info!(api_url = %payu.api_url, test_mode = payu.test_mode, "PayU gateway");
    let gateway = PayuGateway::new(payu)?;

    let publisher = build_publisher(&config).await?;

    // Create the payment service
    let service = PaymentService::new(repo, gateway, publisher).with_config(ServiceConfig {
        default_currency: Currency::new(&config.default_currency)?,
        delete_grace: config.delete_grace()?,
        events_topic: config.events_queue.clone(),
        publish_timeout: config.publish_timeout(),
        ..ServiceConfig::default()
    });

    // Create and run the HTTP server
    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    let _ = otel_provider.shutdown();
    Ok(())
}
