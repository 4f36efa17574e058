use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use skillhub_client::api::{ApiClient, ApiService};
use skillhub_client::cart::CartStore;
use skillhub_client::config;
use skillhub_client::notify::Notices;
use skillhub_client::orders::{OrderTracker, OrdersOutcome, StatusStyle};
use skillhub_client::session::Session;
use skillhub_client::sync::CartSyncEngine;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
    /// Login email, taken together with --password. Without both, the
    /// SKILLHUB_TOKEN environment variable supplies the session token.
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[arg(long, default_value = "user")]
    role: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the server-side cart
    Cart,
    /// Show order history
    Orders {
        /// Fetch every order (admin)
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;

    let session = Session::in_memory();
    if let Ok(token) = std::env::var("SKILLHUB_TOKEN") {
        session.set_token(&token);
    }

    let api = ApiClient::from_config(&cfg, session.clone());

    if let (Some(email), Some(password)) = (&args.email, &args.password) {
        let profile = api.login(email, password, &args.role).await?;
        info!(username = %profile.username, role = %profile.role, "logged in");
        session.begin(&profile);
    }

    if !session.is_authenticated() {
        bail!("no session token: pass --email/--password or set SKILLHUB_TOKEN");
    }

    let service: Arc<dyn ApiService> = Arc::new(api);
    let notices = Notices::to_log();

    match args.command {
        Command::Cart => {
            let cart = CartStore::new();
            let engine = CartSyncEngine::new(service, cart.clone(), session, notices);
            engine.pull_cart().await?;

            let items = cart.items();
            if items.is_empty() {
                println!("Cart is empty");
            } else {
                for item in &items {
                    let price = item
                        .price
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "N/A".into());
                    println!("{} - {} x {}", item.title, price, item.quantity);
                }
                println!("Total: {}", cart.total());
            }
        }
        Command::Orders { all } => {
            let tracker = OrderTracker::new(service, session, notices);
            let outcome = if all {
                tracker.load_all_orders().await
            } else {
                tracker.load_orders(None).await
            };
            match outcome {
                OrdersOutcome::Loaded { orders } => {
                    for order in &orders {
                        let marker = match StatusStyle::classify(&order.status) {
                            StatusStyle::Success => "+",
                            StatusStyle::Warning => "~",
                            StatusStyle::Muted => "-",
                        };
                        let total = order
                            .total
                            .map(|t| t.to_string())
                            .unwrap_or_else(|| "N/A".into());
                        println!(
                            "{} Order #{} [{}] {} total {}",
                            marker, order.id, order.status, order.created_at, total
                        );
                    }
                }
                OrdersOutcome::Empty => println!("No orders found."),
                OrdersOutcome::Failed { reason } => return Err(reason.into()),
                OrdersOutcome::AuthExpired => bail!("session expired; log in again"),
            }
        }
    }

    Ok(())
}
