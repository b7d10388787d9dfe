//! Client example demonstrating the payment lifecycle against a running server.
//!
//! The gateway is replaced by a local double that approves every charge, so
//! no PayU credentials are needed.
//!
//! Run with: cargo run -p payments-app --example client_example

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use payments_client::PaymentsClient;
use payments_hex::{PaymentService, inbound::HttpServer};
use payments_repo::{LogPublisher, build_repo};
use payments_types::{
    ChargeRequest, CreatePaymentRequest, GatewayError, GatewayOutcome, PaymentGateway,
    PaymentStatus, ProcessPaymentRequest,
};
use rust_decimal::Decimal;
use tokio::net::TcpListener;

struct ApprovingGateway;

#[async_trait]
impl PaymentGateway for ApprovingGateway {
    async fn submit(&self, charge: &ChargeRequest) -> Result<GatewayOutcome, GatewayError> {
        Ok(GatewayOutcome {
            status: PaymentStatus::Approved,
            response_code: "APPROVED".to_string(),
            response_message: format!("Approved {}", charge.reference),
            transaction_id: format!("demo-{}", charge.reference),
            order_id: None,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;

    println!("🚀 Starting server on {addr}...");

    let repo = build_repo("memory://").await?;
    let service = PaymentService::new(repo, ApprovingGateway, Arc::new(LogPublisher));
    let router = HttpServer::new(service).router();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router.into_make_service()).await {
            eprintln!("server stopped: {e}");
        }
    });

    let client = PaymentsClient::new(format!("http://{addr}"));

    let health = client.health().await?;
    println!("✅ Server health: {health}");

    let payment = client
        .create_payment(&CreatePaymentRequest {
            user_id: "u1".to_string(),
            order_id: "o1".to_string(),
            amount: Decimal::from(1000),
            currency: None,
            payment_method: None,
            description: "Order o1".to_string(),
            buyer_email: "buyer@example.com".to_string(),
        })
        .await?;
    println!(
        "✅ Created payment {} ({} {}, {})",
        payment.reference, payment.amount, payment.currency, payment.status
    );

    let card = ProcessPaymentRequest {
        card_number: "4111111111111111".to_string(),
        card_holder: "APPROVED".to_string(),
        expiry_date: "12/30".to_string(),
        cvv: "123".to_string(),
    };
    let processed = client
        .process_payment(payment.reference.as_str(), &card)
        .await?;
    println!(
        "✅ Processed: {} (tx={})",
        processed.status, processed.transaction_id
    );

    // A second attempt returns the stored record without charging again
    let again = client
        .process_payment(payment.reference.as_str(), &card)
        .await?;
    println!("✅ Processed again: {} (unchanged)", again.status);

    let payments = client.list_user_payments("u1").await?;
    println!("\n📋 Payments of u1:");
    for p in payments {
        println!("   - {} {} {}: {}", p.reference, p.amount, p.currency, p.status);
    }

    match client.delete_payment(payment.reference.as_str()).await {
        Ok(deleted) => println!("🗑  Deleted {}", deleted.reference),
        Err(e) => println!("⏳ Delete refused: {e}"),
    }

    println!("\n🎉 Example completed successfully!");

    Ok(())
}
