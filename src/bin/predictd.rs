//! predictd — prediction service daemon.
//!
//! Loads the model artifact once, attempts monitoring configuration, and
//! serves the prediction API over HTTP until interrupted.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use predictd::server::config::{Config, Secrets};
use predictd::server::{AppState, serve};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "predictd=info";

/// predictd — regression model prediction service.
#[derive(Parser)]
#[command(name = "predictd")]
#[command(version = predictd::PKG_VERSION)]
#[command(about = "Regression model prediction service")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind to, overriding `server.address`.
    #[arg(short, long, env = "PREDICTD_ADDRESS")]
    address: Option<String>,

    /// Model artifact URL or path, overriding `model.source`.
    #[arg(short, long, env = "PREDICTD_MODEL")]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(address) = args.address {
        config.server.address = address;
    }
    if let Some(model) = args.model {
        config.model.source = Some(model);
    }
    let secrets = Secrets::load()?;

    let addr: SocketAddr = config.server.address.parse().map_err(|e| {
        predictd::PredictdError::Configuration(format!("Invalid address: {e}"))
    })?;

    info!(version = predictd::version_string(), %addr, "predictd starting");

    // No serving without a model: startup failures end the process here.
    let state = match AppState::bootstrap(&config, &secrets, |key| std::env::var(key).ok()).await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "startup failed");
            return Err(e.into());
        }
    };

    let listener = TcpListener::bind(addr).await?;
    serve(listener, state, shutdown_signal()).await?;

    info!("predictd shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("received shutdown signal");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_filter_only_names_this_crate() {
        let filter = tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap();
        assert_eq!(filter.to_string(), "predictd=info");
    }
}
