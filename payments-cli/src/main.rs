//! Payments CLI
//!
//! Command-line interface for the Payments API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use payments_client::PaymentsClient;
use payments_types::{CreatePaymentRequest, ProcessPaymentRequest};

#[derive(Parser)]
#[command(name = "payments")]
#[command(author, version, about = "Payments API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Payments API
    #[arg(
        long,
        env = "PAYMENTS_API_URL",
        default_value = "http://localhost:7000"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Payment operations
    Payment {
        #[command(subcommand)]
        action: PaymentCommands,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Record a new pending payment
    Create {
        #[arg(long)]
        user: String,
        #[arg(long)]
        order: String,
        /// Decimal amount, e.g. 1000 or 12.50
        #[arg(long)]
        amount: Decimal,
        /// Currency code; the server default applies when omitted
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        description: String,
        #[arg(long)]
        email: String,
    },
    /// Charge the card for a pending payment
    Process {
        /// Payment reference
        reference: String,
        #[arg(long)]
        card_number: String,
        #[arg(long)]
        card_holder: String,
        /// MM/YY, MM/YYYY or YYYY/MM
        #[arg(long)]
        expiry: String,
        #[arg(long)]
        cvv: String,
    },
    /// Get payment details
    Get {
        /// Payment reference
        reference: String,
    },
    /// List a user's payments
    List {
        /// User ID
        user: String,
    },
    /// Delete a settled payment
    Delete {
        /// Payment reference
        reference: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client = PaymentsClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Payment { action } => match action {
            PaymentCommands::Create {
                user,
                order,
                amount,
                currency,
                method,
                description,
                email,
            } => {
                let req = CreatePaymentRequest {
                    user_id: user,
                    order_id: order,
                    amount,
                    currency,
                    payment_method: method,
                    description,
                    buyer_email: email,
                };
                let payment = client.create_payment(&req).await?;
                println!("{}", serde_json::to_string_pretty(&payment)?);
            }
            PaymentCommands::Process {
                reference,
                card_number,
                card_holder,
                expiry,
                cvv,
            } => {
                let card = ProcessPaymentRequest {
                    card_number,
                    card_holder,
                    expiry_date: expiry,
                    cvv,
                };
                let payment = client.process_payment(&reference, &card).await?;
                println!("{}", serde_json::to_string_pretty(&payment)?);
            }
            PaymentCommands::Get { reference } => {
                let payment = client.get_payment(&reference).await?;
                println!("{}", serde_json::to_string_pretty(&payment)?);
            }
            PaymentCommands::List { user } => {
                let payments = client.list_user_payments(&user).await?;
                println!("{}", serde_json::to_string_pretty(&payments)?);
            }
            PaymentCommands::Delete { reference } => {
                let deleted = client.delete_payment(&reference).await?;
                println!("✓ Payment {} {}", deleted.reference, deleted.status);
            }
        },
    }

    Ok(())
}
