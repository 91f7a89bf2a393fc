//! predict — predictd CLI client
//!
//! Send prediction requests to a running predictd and check its health.

use clap::{Parser, Subcommand};
use predictd::client::PredictionClient;
use predictd::types::PredictionRequest;

/// predictd CLI client
#[derive(Parser)]
#[command(name = "predict")]
#[command(version = predictd::PKG_VERSION)]
#[command(about = "predictd prediction service client")]
struct Args {
    /// Server address
    #[arg(
        short,
        long,
        env = "PREDICTD_URL",
        default_value = "http://127.0.0.1:8000"
    )]
    address: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check service health
    Health,

    /// Request a prediction
    Predict {
        /// Request identifier
        #[arg(long, default_value = "cli")]
        id: String,
        /// Numeric feature
        #[arg(long, allow_negative_numbers = true)]
        f1: f64,
        /// Category label (c0, c1 or c2)
        #[arg(long)]
        f2: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let client = PredictionClient::new(&args.address)?;

    match args.command {
        Command::Health => {
            let health = client.health().await?;
            let status = if health.healthy { "healthy" } else { "unhealthy" };
            println!("predictd {}", health.version);
            println!("status: {status}");
            println!("model: {}", health.model);
            println!("monitoring: {:?}", health.monitoring);
        }

        Command::Predict { id, f1, f2 } => {
            let result = client.predict(&PredictionRequest::new(id, f1, f2)).await?;
            println!("y_pred: {}", result.y_pred);
        }
    }

    Ok(())
}
